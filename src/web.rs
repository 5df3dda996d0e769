//! WASM entry point - camera background, spinning model, orbit controls

use crate::error::{LoadError, MediaError};
use crate::loader::{self, ProgressLog};
use crate::media::{self, FrameSource};
use crate::render::{GpuContext, SceneRenderer, TouchPhase};
use crate::scene::Model;
use crate::{Viewer, ViewerConfig};
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::platform::web::EventLoopExtWebSys;
use winit::platform::web::WindowAttributesExtWebSys;
use winit::window::{Window, WindowId};

/// Completed async work, delivered back onto the event loop.
enum ViewerEvent {
    GpuReady(anyhow::Result<GpuContext>),
    CameraOpened(Result<Box<dyn FrameSource>, MediaError>),
    ModelLoaded(Result<Model, LoadError>),
}

struct App {
    window: Option<Arc<Window>>,
    context: Option<GpuContext>,
    renderer: Option<SceneRenderer>,
    viewer: Viewer,
    proxy: EventLoopProxy<ViewerEvent>,
    init_pending: bool,
}

impl App {
    fn new(config: ViewerConfig, proxy: EventLoopProxy<ViewerEvent>) -> Self {
        Self {
            window: None,
            context: None,
            renderer: None,
            viewer: Viewer::new(config, 1280, 720),
            proxy,
            init_pending: false,
        }
    }

    fn send(proxy: &EventLoopProxy<ViewerEvent>, event: ViewerEvent) {
        if proxy.send_event(event).is_err() {
            log::warn!("Event loop closed before async work completed");
        }
    }

    /// Starts GPU setup, the camera request and the model fetch side by side.
    fn spawn_startup_tasks(&self, window: Arc<Window>) {
        let proxy = self.proxy.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let context = GpuContext::new(window).await;
            Self::send(&proxy, ViewerEvent::GpuReady(context));
        });

        let proxy = self.proxy.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let camera = media::request_camera().await;
            Self::send(&proxy, ViewerEvent::CameraOpened(camera));
        });

        let proxy = self.proxy.clone();
        let url = self.viewer.config().model_path.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let mut progress = ProgressLog::default();
            let model = loader::load_model(&url, |p| {
                progress.report(p);
            })
            .await;
            Self::send(&proxy, ViewerEvent::ModelLoaded(model));
        });
    }

    fn render(&mut self) {
        let (Some(context), Some(renderer)) = (self.context.as_mut(), self.renderer.as_mut()) else {
            return;
        };

        match renderer.render_frame(context, &self.viewer) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => context.reconfigure(),
            Err(e) => log::error!("Surface error: {:?}", e),
        }
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.init_pending {
            return;
        }
        self.init_pending = true;

        let Some(canvas) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("canvas"))
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("Could not find canvas element with id 'canvas'");
            return;
        };

        // No inner size: winit then follows the canvas's CSS size, which the
        // page stretches to the viewport.
        let window_attrs = Window::default_attributes().with_canvas(Some(canvas));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                return;
            }
        };
        self.window = Some(window.clone());
        let size = window.inner_size();
        self.viewer.resize(size.width, size.height);

        self.spawn_startup_tasks(window);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::GpuReady(Ok(mut context)) => {
                // The surface was sized before the adapter and device awaits;
                // catch up with any resize that landed meanwhile.
                if let Some(window) = &self.window {
                    context.resize(window.inner_size());
                }
                let size = context.size();
                self.viewer.resize(size.width, size.height);
                self.renderer = Some(SceneRenderer::new(&context, self.viewer.scene()));
                self.context = Some(context);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            ViewerEvent::GpuReady(Err(e)) => {
                log::error!("Failed to initialise GPU: {e:#}");
            }
            ViewerEvent::CameraOpened(result) => self.viewer.on_camera_result(result),
            ViewerEvent::ModelLoaded(result) => self.viewer.on_model_result(result),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

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

            WindowEvent::CursorLeft { .. } => self.viewer.controller_mut().on_mouse_left(),

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

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialised: {e}").into());
    }

    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let app = App::new(ViewerConfig::default(), event_loop.create_proxy());

    event_loop.spawn_app(app);
    Ok(())
}
