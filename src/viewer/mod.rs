//! Windowed presentation shell.
//!
//! Opens a winit window, renders the scene with wgpu and draws the egui
//! overlay on top. All state lives in the [`Session`]; the viewer only
//! translates input into session calls and draws what the session holds.

mod input;
mod overlay;
mod renderer;
mod ui_layer;

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::config::WishtreeConfig;
use crate::error::ViewerError;
use crate::interaction::PointerTarget;
use crate::picking::pick_photo;
use crate::session::Session;
use crate::time::FrameClock;

use input::{Input, InputEvent};
use overlay::{OverlayState, UiAction};
use renderer::Renderer;
use ui_layer::UiLayer;

/// Idle camera drift while nobody is dragging, in radians per second.
const AUTO_ORBIT_SPEED: f32 = 0.06;
const ORBIT_SENSITIVITY: f32 = 0.005;

/// Open the window and run until it is closed.
pub fn run(config: WishtreeConfig) -> Result<(), ViewerError> {
    let session = Session::with_gemini(&config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(session);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    session: Session,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    ui_layer: Option<UiLayer>,
    overlay: OverlayState,
    actions: Vec<UiAction>,
    input: Input,
    camera: Camera,
    clock: FrameClock,
    error: Option<ViewerError>,
}

impl App {
    fn new(session: Session) -> Self {
        Self {
            session,
            window: None,
            renderer: None,
            ui_layer: None,
            overlay: OverlayState::default(),
            actions: Vec::new(),
            input: Input::new(),
            camera: Camera::new(),
            clock: FrameClock::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title("Merry Christmas - Holiday Wishing Tree")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;
        let ui_layer = UiLayer::new(renderer.device(), renderer.format(), &window);

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        self.camera.aspect = renderer.aspect();

        self.session.load_builtin_textures();
        tracing::info!("viewer started ({}x{})", size.width, size.height);

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.ui_layer = Some(ui_layer);
        Ok(())
    }

    fn handle_input(&mut self, event: InputEvent, ui_consumed: bool) {
        match event {
            InputEvent::Press(ndc) => {
                let over_ui = self.ui_layer.as_ref().is_some_and(|ui| ui.pointer_over_ui());
                let target = if over_ui {
                    PointerTarget::Overlay
                } else {
                    let ray = self.camera.ray_from_ndc(ndc);
                    match pick_photo(self.session.scene().photos(), &ray) {
                        Some(id) => PointerTarget::Photo(id),
                        None => PointerTarget::Scene,
                    }
                };
                self.session.pointer_down(target);
            }
            // The controller remembers where the press began
            InputEvent::Release => self.session.pointer_up(),
            InputEvent::Drag(delta) if !ui_consumed => {
                self.camera
                    .orbit(-delta.x * ORBIT_SENSITIVITY, delta.y * ORBIT_SENSITIVITY);
            }
            InputEvent::Scroll(lines) if !ui_consumed => self.camera.zoom(lines),
            InputEvent::Escape => self.session.dismiss(),
            _ => {}
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Upload => {
                let picked = rfd::FileDialog::new()
                    .set_title("Upload Photos")
                    .add_filter("Images", &["png", "jpg", "jpeg"])
                    .pick_files();
                if let Some(paths) = picked {
                    let report = self.session.upload(paths);
                    tracing::info!(
                        "upload: {} added, {} skipped",
                        report.added.len(),
                        report.skipped.len()
                    );
                }
            }
            UiAction::ClearUploads => {
                self.session.clear_uploads();
            }
            UiAction::SetMessage(text) => {
                self.session.set_message(text);
            }
            UiAction::Generate => {
                self.session.request_memory();
            }
            UiAction::Dismiss => self.session.dismiss(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        self.session.frame(dt);
        if !self.input.is_orbiting() {
            self.camera.orbit(dt * AUTO_ORBIT_SPEED, 0.0);
        }

        let (Some(window), Some(renderer), Some(ui_layer)) =
            (&self.window, &mut self.renderer, &mut self.ui_layer)
        else {
            return;
        };

        let session = &self.session;
        let overlay_state = &mut self.overlay;
        let actions = &mut self.actions;
        let ui = ui_layer.run(window, |ctx| overlay::draw(ctx, session, overlay_state, actions));

        renderer.sync_textures(self.session.textures());
        match renderer.render(&self.camera, self.session.scene(), self.clock.elapsed(), ui_layer, &ui) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = window.inner_size();
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => tracing::warn!("render error: {e:?}"),
        }
        window.request_redraw();

        for action in std::mem::take(&mut self.actions) {
            self.apply(action);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("failed to start viewer: {e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ui_consumed = match (&self.window, &mut self.ui_layer) {
            (Some(window), Some(ui_layer)) => ui_layer.on_window_event(window, &event),
            _ => false,
        };

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(*physical_size);
                    self.camera.aspect = renderer.aspect();
                }
                self.input
                    .set_window_size(physical_size.width, physical_size.height);
            }
            WindowEvent::Occluded(hidden) => {
                // Hidden windows freeze the tree instead of jumping on return
                self.clock.set_paused(*hidden);
                tracing::debug!("window occluded: {hidden}");
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                return;
            }
            _ => {}
        }

        if let Some(input_event) = self.input.handle_event(&event) {
            self.handle_input(input_event, ui_consumed);
        }
    }
}
