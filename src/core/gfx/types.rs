use cgmath::{Matrix4, Vector3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Alpha,
    Add,
}

/// One solid-colour quad. `transform` maps the unit quad into logical space.
#[derive(Clone, Debug)]
pub struct RenderObject {
    pub transform: Matrix4<f32>,
    pub color: [f32; 4],
    pub blend: BlendMode,
}

impl RenderObject {
    /// Axis-aligned rectangle from its top-left corner and size.
    pub fn rect(x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> Self {
        let transform = Matrix4::from_translation(Vector3::new(x + 0.5 * w, y + 0.5 * h, 0.0))
            * Matrix4::from_nonuniform_scale(w, h, 1.0);
        Self { transform, color, blend: BlendMode::Alpha }
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

#[derive(Clone, Debug)]
pub struct RenderList {
    pub clear_color: [f32; 4],
    pub objects: Vec<RenderObject>,
}

impl RenderList {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self { clear_color, objects: Vec::with_capacity(256) }
    }

    #[inline(always)]
    pub fn push(&mut self, object: RenderObject) {
        self.objects.push(object);
    }
}
