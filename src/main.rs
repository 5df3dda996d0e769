use camview::config::DEFAULT_MODEL_PATH;
use camview::loader::{self, ProgressLog};
use camview::media;
use camview::render::{GpuContext, SceneRenderer, TouchPhase};
use camview::{LoadError, Model, Viewer, ViewerConfig};
use clap::Parser;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

#[derive(Parser, Debug)]
#[command(name = "camview", about = "Spin a glTF model in front of the camera feed")]
struct Args {
    /// Path to the binary glTF model
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: String,

    /// Radians the model turns per frame
    #[arg(long, default_value_t = 0.01)]
    rotation_step: f32,

    /// Ambient light intensity
    #[arg(long, default_value_t = 0.5)]
    ambient: f32,

    /// Orbit inertia in (0, 1); disabled when omitted
    #[arg(long)]
    damping: Option<f32>,
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        ViewerConfig::default()
            .with_model_path(args.model)
            .with_rotation_step(args.rotation_step)
            .with_ambient_intensity(args.ambient)
            .with_orbit_damping(args.damping)
    }
}

enum ViewerEvent {
    ModelLoaded(Result<Model, LoadError>),
}

struct App {
    window: Option<Arc<Window>>,
    context: Option<GpuContext>,
    renderer: Option<SceneRenderer>,
    viewer: Viewer,
    /// Taken on first resume so the model is requested exactly once.
    pending_load: Option<EventLoopProxy<ViewerEvent>>,
}

impl App {
    fn new(config: ViewerConfig, proxy: EventLoopProxy<ViewerEvent>) -> Self {
        Self {
            window: None,
            context: None,
            renderer: None,
            viewer: Viewer::new(config, 1280, 720),
            pending_load: Some(proxy),
        }
    }

    fn start_model_load(&mut self) {
        let Some(proxy) = self.pending_load.take() else {
            return;
        };
        let path = self.viewer.config().model_path.clone();

        std::thread::spawn(move || {
            let mut progress = ProgressLog::default();
            let result = loader::load_model(&path, |p| {
                progress.report(p);
            });
            if proxy.send_event(ViewerEvent::ModelLoaded(result)).is_err() {
                log::warn!("Event loop closed before the model finished loading");
            }
        });
    }

    fn render(&mut self) {
        let (Some(context), Some(renderer)) = (self.context.as_mut(), self.renderer.as_mut()) else {
            return;
        };

        match renderer.render_frame(context, &self.viewer) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
            }
        }
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("camview")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let context = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(context) => context,
            Err(e) => {
                log::error!("Failed to initialise GPU: {e:#}");
                event_loop.exit();
                return;
            }
        };
        let size = context.size();
        self.viewer.resize(size.width, size.height);
        self.renderer = Some(SceneRenderer::new(&context, self.viewer.scene()));
        self.context = Some(context);

        self.viewer.on_camera_result(media::request_camera());
        self.start_model_load();

        window.request_redraw();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::ModelLoaded(result) => self.viewer.on_model_result(result),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(context) = &mut self.context {
                    context.resize(size);
                }
                self.viewer.resize(size.width, size.height);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                let controller = self.viewer.controller_mut();
                match button {
                    MouseButton::Left => controller.on_mouse_button(0, pressed),
                    MouseButton::Right => controller.on_mouse_button(1, pressed),
                    MouseButton::Middle => controller.on_mouse_button(2, pressed),
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.viewer
                    .controller_mut()
                    .on_mouse_move(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.viewer.controller_mut().on_mouse_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.viewer.controller_mut().on_scroll(scroll);
            }
            WindowEvent::Touch(touch) => {
                let phase = match touch.phase {
                    winit::event::TouchPhase::Started => TouchPhase::Started,
                    winit::event::TouchPhase::Moved => TouchPhase::Moved,
                    winit::event::TouchPhase::Ended | winit::event::TouchPhase::Cancelled => {
                        TouchPhase::Ended
                    }
                };
                self.viewer.controller_mut().on_touch(
                    touch.id,
                    phase,
                    touch.location.x as f32,
                    touch.location.y as f32,
                );
            }
            WindowEvent::RedrawRequested => {
                self.viewer.advance_frame();
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let event_loop = EventLoop::<ViewerEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(args.into(), event_loop.create_proxy());
    event_loop.run_app(&mut app)?;
    Ok(())
}
