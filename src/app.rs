use crate::config::{self, Config, WINDOW_TITLE};
use crate::core::gamepad::{self, GamepadState, PadEvent};
use crate::core::gfx::{create_backend, Backend, RenderList};
use crate::game::beatmap;
use crate::screens::{evaluation, gameplay, menu, record, Screen as CurrentScreen, ScreenAction};
use crate::ui::color;
use crate::utils::fps::{FpsCounter, FramePacer};
use gilrs::{GamepadId, Gilrs};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use log::{error, info, warn};
use std::{error::Error, sync::Arc, time::Instant};

pub struct App {
    window: Option<Arc<Window>>,
    backend: Option<Box<dyn Backend>>,
    config: Config,
    current_screen: CurrentScreen,
    menu_state: menu::State,
    gameplay_state: Option<gameplay::State>,
    record_state: Option<record::State>,
    evaluation_state: Option<evaluation::State>,
    gilrs: Option<Gilrs>,
    active_pad: Option<GamepadId>,
    pad_state: GamepadState,
    fps_counter: FpsCounter,
    pacer: FramePacer,
    last_fps: f32,
}

impl App {
    fn new(config: Config) -> Self {
        let now = Instant::now();
        let layout_hint = format!("LANES: {} OR ARROWS", config.key_layout.lane_labels().concat());
        let gilrs = gamepad::try_init();
        if gilrs.is_none() {
            warn!("Gamepad support unavailable.");
        }
        Self {
            window: None,
            backend: None,
            current_screen: CurrentScreen::Menu,
            menu_state: menu::init(layout_hint),
            gameplay_state: None,
            record_state: None,
            evaluation_state: None,
            gilrs,
            active_pad: None,
            pad_state: GamepadState::default(),
            fps_counter: FpsCounter::new(now),
            pacer: FramePacer::new(config.rules.fps, now),
            last_fps: 0.0,
            config,
        }
    }

    /// Loads the beatmap fresh from disk so a just-recorded map is picked up.
    fn enter_gameplay(&mut self, now: Instant) -> bool {
        let path = self.config.beatmap_path.clone();
        match beatmap::load(&path) {
            Ok(map) => {
                self.gameplay_state = Some(gameplay::init(Arc::new(map), &self.config, now));
                true
            }
            Err(e) => {
                error!("Cannot start play mode: {}", e);
                self.menu_state.notice = Some(match e {
                    beatmap::BeatmapError::NotFound(_) => format!("Beatmap not found: {}", path.display()),
                    beatmap::BeatmapError::Empty { .. } => format!("No valid notes in {}", path.display()),
                    beatmap::BeatmapError::Io { .. } => format!("Cannot read {}", path.display()),
                });
                false
            }
        }
    }

    fn leave_screen(&mut self, now: Instant) {
        match self.current_screen {
            CurrentScreen::Record => {
                if let Some(mut rs) = self.record_state.take() {
                    record::finish(&mut rs, now);
                    self.menu_state.notice = record::take_notice(&mut rs);
                }
            }
            CurrentScreen::Gameplay | CurrentScreen::Evaluation | CurrentScreen::Menu => {}
        }
    }

    fn handle_action(&mut self, action: ScreenAction, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        match action {
            ScreenAction::Navigate(target) => {
                let from = self.current_screen;
                info!("Navigating {:?} -> {:?}", from, target);
                self.leave_screen(now);

                match target {
                    CurrentScreen::Menu => {
                        self.gameplay_state = None;
                        self.evaluation_state = None;
                        if from != CurrentScreen::Record {
                            self.menu_state.notice = None;
                        }
                    }
                    CurrentScreen::Gameplay => {
                        if !self.enter_gameplay(now) {
                            self.current_screen = CurrentScreen::Menu;
                            return;
                        }
                        self.evaluation_state = None;
                    }
                    CurrentScreen::Record => {
                        self.menu_state.notice = None;
                        self.record_state = Some(record::init(&self.config, now));
                    }
                    CurrentScreen::Evaluation => {
                        let Some(gs) = self.gameplay_state.take() else {
                            warn!("No finished run to evaluate.");
                            self.current_screen = CurrentScreen::Menu;
                            return;
                        };
                        self.evaluation_state = Some(evaluation::init(gameplay::summary(&gs)));
                    }
                }
                self.current_screen = target;
            }
            ScreenAction::Exit => {
                info!("Exit action received. Shutting down.");
                event_loop.exit();
            }
            ScreenAction::None => {}
        }
    }

    fn dispatch_pad_event(&mut self, event: PadEvent, now: Instant) -> ScreenAction {
        match self.current_screen {
            CurrentScreen::Menu => menu::handle_pad_event(&mut self.menu_state, event),
            CurrentScreen::Gameplay => match &mut self.gameplay_state {
                Some(gs) => gameplay::handle_pad_event(gs, event, now),
                None => ScreenAction::None,
            },
            CurrentScreen::Record => match &mut self.record_state {
                Some(rs) => record::handle_pad_event(rs, event, now),
                None => ScreenAction::None,
            },
            CurrentScreen::Evaluation => match &mut self.evaluation_state {
                Some(es) => evaluation::handle_pad_event(es, event),
                None => ScreenAction::None,
            },
        }
    }

    fn poll_gamepad(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gilrs) = self.gilrs.as_mut() else { return; };
        let events = gamepad::poll_and_collect(gilrs, &mut self.active_pad, &mut self.pad_state);
        if events.is_empty() {
            return;
        }
        let now = Instant::now();
        for event in events {
            let action = self.dispatch_pad_event(event, now);
            if action != ScreenAction::None {
                self.handle_action(action, event_loop);
            }
        }
    }

    fn update_screen(&mut self, now: Instant) -> ScreenAction {
        match self.current_screen {
            CurrentScreen::Gameplay => match &mut self.gameplay_state {
                Some(gs) => gameplay::update(gs, now),
                None => ScreenAction::None,
            },
            CurrentScreen::Record => match &mut self.record_state {
                Some(rs) => record::update(rs, now),
                None => ScreenAction::None,
            },
            CurrentScreen::Menu | CurrentScreen::Evaluation => ScreenAction::None,
        }
    }

    fn build_screen(&self) -> RenderList {
        let mut list = RenderList::new(color::BLACK);
        match self.current_screen {
            CurrentScreen::Menu => menu::build(&self.menu_state, &mut list),
            CurrentScreen::Gameplay => {
                if let Some(gs) = &self.gameplay_state {
                    gameplay::build(gs, &mut list);
                }
            }
            CurrentScreen::Record => {
                if let Some(rs) = &self.record_state {
                    record::build(rs, &mut list);
                }
            }
            CurrentScreen::Evaluation => {
                if let Some(es) = &self.evaluation_state {
                    evaluation::build(es, &mut list);
                }
            }
        }
        list
    }

    #[inline(always)]
    fn update_fps_title(&mut self, window: &Window, now: Instant) {
        let Some(fps) = self.fps_counter.tick(now) else { return; };
        self.last_fps = fps;
        let detail = match (&self.current_screen, &self.gameplay_state) {
            (CurrentScreen::Gameplay, Some(gs)) => {
                let session = gameplay::session(gs);
                let p = session.progression();
                let secs = session.clock().now_ms() as f32 / 1000.0;
                format!(" | {:.1} s | Score {} | Combo {} | HP {}", secs, p.score, p.combo, p.hp)
            }
            _ => String::new(),
        };
        window.set_title(&format!("{} - {:?}{} | {:.0} FPS", WINDOW_TITLE, self.current_screen, detail, self.last_fps));
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_resizable(true)
            .with_inner_size(PhysicalSize::new(self.config.window_width, self.config.window_height));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let backend = create_backend(window.clone(), self.config.vsync)?;

        self.window = Some(window);
        self.backend = Some(backend);
        info!("Starting event loop...");
        Ok(())
    }

    fn redraw(&mut self, window: &Window, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let action = self.update_screen(now);
        if action != ScreenAction::None {
            self.handle_action(action, event_loop);
        }

        let list = self.build_screen();
        self.update_fps_title(window, now);
        if let Some(backend) = &mut self.backend {
            if let Err(e) = backend.draw(&list) {
                error!("Failed to draw frame: {}", e);
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_graphics(event_loop) {
                error!("Failed to initialize graphics: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref().cloned() else { return; };
        if window_id != window.id() { return; }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested. Shutting down.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(backend) = &mut self.backend {
                    backend.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let now = Instant::now();
                if key_event.state == ElementState::Pressed
                    && key_event.physical_key == PhysicalKey::Code(KeyCode::F11)
                {
                    let fullscreen = window.fullscreen().is_none();
                    window.set_fullscreen(fullscreen.then_some(winit::window::Fullscreen::Borderless(None)));
                    return;
                }

                let action = match self.current_screen {
                    CurrentScreen::Menu => menu::handle_key_press(&mut self.menu_state, &key_event),
                    CurrentScreen::Gameplay => match &mut self.gameplay_state {
                        Some(gs) => gameplay::handle_key_press(gs, &key_event, now),
                        None => ScreenAction::None,
                    },
                    CurrentScreen::Record => match &mut self.record_state {
                        Some(rs) => record::handle_key_press(rs, &key_event, now),
                        None => ScreenAction::None,
                    },
                    CurrentScreen::Evaluation => match &mut self.evaluation_state {
                        Some(es) => evaluation::handle_key_press(es, &key_event),
                        None => ScreenAction::None,
                    },
                };
                self.handle_action(action, event_loop);
            }
            WindowEvent::RedrawRequested => self.redraw(&window, event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_gamepad(event_loop);
        let now = Instant::now();
        if self.pacer.due(now) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.next_deadline()));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if let Some(rs) = self.record_state.as_mut() {
            if record::is_recording(rs) {
                info!("Saving in-progress recording before exit.");
                record::finish(rs, now);
            }
        }
        crate::core::audio::stop_music();
        if let Some(backend) = &mut self.backend {
            backend.cleanup();
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::get();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
