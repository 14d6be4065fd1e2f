use crate::core::gfx::backends::Backend;
use crate::core::gfx::{BlendMode, RenderList};
use crate::core::space::{Viewport, ortho_for_window, viewport_for_window};
use cgmath::Matrix4;
use glow::{HasContext, UniformLocation};
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{Display, DisplayApiPreference},
    prelude::*,
    surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use log::{info, warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use std::{error::Error, ffi::CStr, mem, num::NonZeroU32, sync::Arc};
use winit::window::Window;

pub struct State {
    gl: glow::Context,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    program: glow::Program,
    mvp_location: UniformLocation,
    color_location: UniformLocation,
    projection: Matrix4<f32>,
    window_size: (u32, u32),
    viewport: Viewport,
    // One unit quad shared by every object.
    shared_vao: glow::VertexArray,
    shared_vbo: glow::Buffer,
    shared_ibo: glow::Buffer,
    index_count: i32,
}

pub fn init(window: Arc<Window>, vsync_enabled: bool) -> Result<State, Box<dyn Error>> {
    info!("Initializing OpenGL backend...");

    let (gl_surface, gl_context, gl) = create_opengl_context(&window, vsync_enabled)?;
    let (program, mvp_location, color_location) = create_graphics_program(&gl)?;

    let (shared_vao, shared_vbo, shared_ibo, index_count) = unsafe {
        const UNIT_QUAD_VERTICES: [[f32; 2]; 4] = [[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];
        const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

        let vertex_bytes: Vec<u8> = UNIT_QUAD_VERTICES
            .iter()
            .flatten()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        let index_bytes: Vec<u8> = QUAD_INDICES.iter().flat_map(|i| i.to_ne_bytes()).collect();

        let vao = gl.create_vertex_array()?;
        let vbo = gl.create_buffer()?;
        let ibo = gl.create_buffer()?;

        gl.bind_vertex_array(Some(vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &vertex_bytes, glow::STATIC_DRAW);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, &index_bytes, glow::STATIC_DRAW);

        let stride = (2 * mem::size_of::<f32>()) as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
        gl.bind_vertex_array(None);

        (vao, vbo, ibo, QUAD_INDICES.len() as i32)
    };

    let size = window.inner_size();
    let state = State {
        gl,
        gl_surface,
        gl_context,
        program,
        mvp_location,
        color_location,
        projection: ortho_for_window(),
        window_size: (size.width, size.height),
        viewport: viewport_for_window(size.width, size.height),
        shared_vao,
        shared_vbo,
        shared_ibo,
        index_count,
    };

    info!("OpenGL backend initialized successfully.");
    Ok(state)
}

#[inline(always)]
fn apply_blend(gl: &glow::Context, want: BlendMode, last: &mut Option<BlendMode>) {
    if *last == Some(want) {
        return;
    }
    unsafe {
        gl.blend_equation(glow::FUNC_ADD);
        match want {
            BlendMode::Alpha => gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA),
            BlendMode::Add => gl.blend_func(glow::SRC_ALPHA, glow::ONE),
        }
    }
    *last = Some(want);
}

impl Backend for State {
    fn draw(&mut self, render_list: &RenderList) -> Result<u32, Box<dyn Error>> {
        let (width, height) = self.window_size;
        if width == 0 || height == 0 {
            return Ok(0);
        }
        let vp = self.viewport;
        let mut drawn = 0u32;

        unsafe {
            // Letterbox bars first, then the logical area.
            self.gl.disable(glow::SCISSOR_TEST);
            self.gl.viewport(0, 0, width as i32, height as i32);
            self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT);

            self.gl.enable(glow::SCISSOR_TEST);
            self.gl.scissor(vp.x, vp.y, vp.width, vp.height);
            self.gl.viewport(vp.x, vp.y, vp.width, vp.height);
            let c = render_list.clear_color;
            self.gl.clear_color(c[0], c[1], c[2], c[3]);
            self.gl.clear(glow::COLOR_BUFFER_BIT);

            self.gl.use_program(Some(self.program));
            self.gl.enable(glow::BLEND);
            self.gl.bind_vertex_array(Some(self.shared_vao));

            let mut last_blend: Option<BlendMode> = None;
            let mut last_color: Option<[f32; 4]> = None;

            for object in &render_list.objects {
                apply_blend(&self.gl, object.blend, &mut last_blend);

                let mvp = self.projection * object.transform;
                let mvp_array: &[f32; 16] = mvp.as_ref();
                self.gl.uniform_matrix_4_f32_slice(Some(&self.mvp_location), false, mvp_array);

                if last_color != Some(object.color) {
                    self.gl.uniform_4_f32_slice(Some(&self.color_location), &object.color);
                    last_color = Some(object.color);
                }

                self.gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_SHORT, 0);
                drawn += 1;
            }

            self.gl.bind_vertex_array(None);
            self.gl.use_program(None);
        }

        self.gl_surface.swap_buffers(&self.gl_context)?;
        Ok(drawn)
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (Some(width_nz), Some(height_nz)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            warn!("Ignoring resize to zero dimensions.");
            return;
        };
        self.gl_surface.resize(&self.gl_context, width_nz, height_nz);
        self.window_size = (width, height);
        self.viewport = viewport_for_window(width, height);
    }

    fn cleanup(&mut self) {
        info!("Cleaning up OpenGL resources...");
        unsafe {
            self.gl.delete_program(self.program);
            self.gl.delete_vertex_array(self.shared_vao);
            self.gl.delete_buffer(self.shared_vbo);
            self.gl.delete_buffer(self.shared_ibo);
        }
        info!("OpenGL resources cleaned up.");
    }
}

#[cfg(target_os = "windows")]
fn display_preference(window_handle: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Wgl(Some(window_handle))
}

#[cfg(target_os = "macos")]
fn display_preference(_window_handle: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(all(unix, not(target_os = "macos")))]
fn display_preference(_window_handle: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

fn create_opengl_context(
    window: &Window,
    vsync_enabled: bool,
) -> Result<(Surface<WindowSurface>, PossiblyCurrentContext, glow::Context), Box<dyn Error>> {
    let display_handle = window.display_handle()?.as_raw();
    let raw_window_handle = window.window_handle()?.as_raw();

    let display = unsafe { Display::new(display_handle, display_preference(raw_window_handle))? };
    info!("Using GL display: {}", display.version_string());

    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .compatible_with_native_window(raw_window_handle)
        .build();
    let config = unsafe { display.find_configs(template)?.next() }
        .ok_or("Failed to find a suitable GL config")?;

    let (width, height): (u32, u32) = window.inner_size().into();
    let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(width.max(1)).ok_or("invalid window width")?,
        NonZeroU32::new(height.max(1)).ok_or("invalid window height")?,
    );
    let surface = unsafe { display.create_window_surface(&config, &surface_attributes)? };

    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(Some(raw_window_handle));
    let context = unsafe { display.create_context(&config, &context_attributes)? }.make_current(&surface)?;

    let interval = if vsync_enabled {
        SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        SwapInterval::DontWait
    };
    match surface.set_swap_interval(&context, interval) {
        Ok(()) => info!("VSync {}.", if vsync_enabled { "on" } else { "off" }),
        Err(e) => warn!("Failed to set swap interval: {}. VSync state may not be as requested.", e),
    }

    let gl = unsafe { glow::Context::from_loader_function_cstr(|s: &CStr| display.get_proc_address(s)) };
    Ok((surface, context, gl))
}

fn create_graphics_program(gl: &glow::Context) -> Result<(glow::Program, UniformLocation, UniformLocation), String> {
    unsafe {
        let program = gl.create_program()?;
        let shader_sources = [
            (glow::VERTEX_SHADER, include_str!("../shaders/quad.vert")),
            (glow::FRAGMENT_SHADER, include_str!("../shaders/quad.frag")),
        ];

        let mut shaders = Vec::with_capacity(shader_sources.len());
        for (shader_type, shader_source) in shader_sources.iter() {
            let shader = gl.create_shader(*shader_type)?;
            gl.shader_source(shader, shader_source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                return Err(gl.get_shader_info_log(shader));
            }
            gl.attach_shader(program, shader);
            shaders.push(shader);
        }

        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            return Err(gl.get_program_info_log(program));
        }
        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }

        let mvp_location = gl.get_uniform_location(program, "u_model_view_proj").ok_or("u_model_view_proj")?;
        let color_location = gl.get_uniform_location(program, "u_color").ok_or("u_color")?;
        Ok((program, mvp_location, color_location))
    }
}
