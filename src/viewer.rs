//! The viewer context: scene, viewpoint, viewport and camera feed, owned by
//! the platform shell and advanced once per frame.
//!
//! All mutation happens on the event-loop thread. Camera and model results
//! arrive as completed futures (native: a worker thread through the event
//! loop proxy; web: `spawn_local`) and are applied here in one step.

use crate::config::ViewerConfig;
use crate::error::{LoadError, MediaError, ViewerError};
use crate::media::FrameSource;
use crate::render::{Camera, CameraController, OrbitController};
use crate::scene::{Model, Scene, VideoState};
use glam::Vec3;

/// Render loop phase. Moves to `ActiveModel` once, when the model is
/// inserted, and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    IdleModel,
    ActiveModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

pub struct Viewer {
    config: ViewerConfig,
    scene: Scene,
    camera: Camera,
    controller: CameraController,
    viewport: Viewport,
    frame_source: Option<Box<dyn FrameSource>>,
    frames: u64,
    error_count: usize,
}

impl Viewer {
    pub fn new(config: ViewerConfig, width: u32, height: u32) -> Self {
        let viewport = Viewport {
            width: width.max(1),
            height: height.max(1),
        };
        let scene = Scene::from_config(&config);
        let mut camera = Camera::new(
            config.camera_position,
            config.fov_degrees,
            viewport.aspect_ratio(),
        );

        let mut orbit = OrbitController::from_position(Vec3::ZERO, config.camera_position);
        orbit.damping = config.orbit_damping;
        let mut controller = CameraController::with_orbit(orbit);
        controller.update(&mut camera);

        Self {
            config,
            scene,
            camera,
            controller,
            viewport,
            frame_source: None,
            frames: 0,
            error_count: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame_source(&self) -> Option<&dyn FrameSource> {
        self.frame_source.as_deref()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Number of camera and model failures reported so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn state(&self) -> LoopState {
        if self.scene.has_model() {
            LoopState::ActiveModel
        } else {
            LoopState::IdleModel
        }
    }

    /// Applies the outcome of the camera request.
    pub fn on_camera_result(&mut self, result: Result<Box<dyn FrameSource>, MediaError>) {
        match result {
            Ok(source) => {
                self.frame_source = Some(source);
                self.scene.background.video = VideoState::Live;
            }
            Err(err) => {
                log::error!("Error accessing camera: {err}");
                self.error_count += 1;
                self.scene.background.video = VideoState::Unavailable;
            }
        }
    }

    /// Applies the outcome of the model load.
    pub fn on_model_result(&mut self, result: Result<Model, LoadError>) {
        match result {
            Ok(model) => {
                if let Err(err) = self.insert_model(model) {
                    log::warn!("Ignoring loaded model: {err}");
                }
            }
            Err(err) => {
                log::error!("An error happened while loading the model: {err}");
                self.error_count += 1;
            }
        }
    }

    /// Adds the model to the scene, logs its bounds and aims the viewpoint at
    /// its centre.
    pub fn insert_model(&mut self, mut model: Model) -> Result<(), ViewerError> {
        model.set_spin_step(self.config.rotation_step);
        let model = self.scene.insert_model(model)?;
        let bounds = model.bounds();

        log::info!("Model size: {:?}", bounds.size());
        match bounds.center() {
            Some(center) => {
                log::info!("Model center: {:?}", center);
                self.controller.look_at(center);
                self.controller.orbit.update_camera(&mut self.camera);
            }
            None => log::warn!("Model has no geometry; keeping the current view"),
        }
        Ok(())
    }

    /// One render-loop step: spin the model if present, then apply input.
    pub fn advance_frame(&mut self) {
        if let Some(model) = self.scene.model_mut() {
            model.advance_spin();
        }
        self.controller.update(&mut self.camera);
        self.frames += 1;
    }

    /// Tracks a new output size. Returns `false` for zero or unchanged sizes.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let viewport = Viewport { width, height };
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect_ratio());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mesh::Vertex;
    use crate::scene::ModelPrimitive;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeCamera {
        copies: Rc<Cell<u32>>,
    }

    impl FrameSource for FakeCamera {
        fn frame_size(&self) -> Option<(u32, u32)> {
            Some((640, 480))
        }

        fn copy_to_texture(&self, _queue: &wgpu::Queue, _texture: &wgpu::Texture) {
            self.copies.set(self.copies.get() + 1);
        }
    }

    fn model_centered_at(center: Vec3) -> Model {
        let v = |offset: Vec3| Vertex::new(center + offset, Vec3::Z);
        Model::new(vec![ModelPrimitive {
            vertices: vec![
                v(Vec3::new(-1.0, -1.0, -1.0)),
                v(Vec3::new(1.0, -1.0, 1.0)),
                v(Vec3::new(1.0, 1.0, 1.0)),
            ],
            indices: vec![0, 1, 2],
            color: [1.0; 4],
            texture: None,
        }])
    }

    fn viewer() -> Viewer {
        Viewer::new(ViewerConfig::default(), 1024, 768)
    }

    #[test]
    fn test_starts_idle_with_default_view() {
        let viewer = viewer();
        assert_eq!(viewer.state(), LoopState::IdleModel);
        assert!((viewer.camera().position - Vec3::new(0.0, 50.0, 50.0)).length() < 1e-3);
        assert_eq!(viewer.camera().target, Vec3::ZERO);
        assert!((viewer.camera().aspect - 1024.0 / 768.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_is_frame_count_times_step() {
        let mut viewer = viewer();
        viewer.insert_model(model_centered_at(Vec3::ZERO)).unwrap();

        let step = viewer.config().rotation_step as f64;
        let mut previous = -1.0;
        for n in 0..500u64 {
            let angle = viewer.scene().model().unwrap().rotation_angle();
            assert!((angle - n as f64 * step).abs() < 1e-9);
            assert!(angle > previous);
            previous = angle;
            viewer.advance_frame();
        }
    }

    #[test]
    fn test_idle_frames_do_not_spin() {
        let mut viewer = viewer();
        for _ in 0..10 {
            viewer.advance_frame();
        }
        viewer.insert_model(model_centered_at(Vec3::ZERO)).unwrap();
        assert_eq!(viewer.scene().model().unwrap().spin_frames(), 0);
        viewer.advance_frame();
        assert_eq!(viewer.scene().model().unwrap().spin_frames(), 1);
        assert_eq!(viewer.frame_count(), 11);
    }

    #[test]
    fn test_load_success_activates_once_and_recenters() {
        let mut viewer = viewer();
        let position = viewer.camera().position;
        viewer.on_model_result(Ok(model_centered_at(Vec3::new(2.0, 1.0, 0.0))));

        assert_eq!(viewer.state(), LoopState::ActiveModel);
        assert_eq!(viewer.camera().target, Vec3::new(2.0, 1.0, 0.0));
        assert!((viewer.camera().position - position).length() < 1e-3);

        viewer.advance_frame();
        assert_eq!(viewer.camera().target, Vec3::new(2.0, 1.0, 0.0));

        assert_eq!(
            viewer.insert_model(model_centered_at(Vec3::ZERO)),
            Err(ViewerError::ModelAlreadyLoaded)
        );
        assert_eq!(
            viewer.scene().model().unwrap().bounds().center(),
            Some(Vec3::new(2.0, 1.0, 0.0))
        );
        assert_eq!(viewer.state(), LoopState::ActiveModel);
    }

    #[test]
    fn test_load_failure_stays_idle() {
        let mut viewer = viewer();
        viewer.on_model_result(Err(LoadError::Http {
            status: 404,
            status_text: "Not Found".into(),
        }));
        assert_eq!(viewer.error_count(), 1);
        for _ in 0..100 {
            viewer.advance_frame();
            assert_eq!(viewer.state(), LoopState::IdleModel);
        }
        assert!(viewer.scene().model().is_none());
    }

    #[test]
    fn test_cyclic_asset_is_a_load_failure() {
        let mut viewer = viewer();
        let result = crate::loader::parse_glb(&crate::loader::glb::tests::cyclic_glb());
        assert!(matches!(result, Err(LoadError::InvalidHierarchy(_))));

        viewer.on_model_result(result);
        assert_eq!(viewer.error_count(), 1);
        viewer.advance_frame();
        assert_eq!(viewer.state(), LoopState::IdleModel);
    }

    #[test]
    fn test_camera_denied_does_not_block_model() {
        let mut viewer = viewer();
        viewer.on_camera_result(Err(MediaError::PermissionDenied));

        assert_eq!(viewer.error_count(), 1);
        assert_eq!(viewer.scene().background.video, VideoState::Unavailable);
        assert!(viewer.frame_source().is_none());

        viewer.advance_frame();
        viewer.on_model_result(Ok(model_centered_at(Vec3::ZERO)));
        viewer.advance_frame();
        assert_eq!(viewer.state(), LoopState::ActiveModel);
        assert_eq!(viewer.error_count(), 1);
    }

    #[test]
    fn test_camera_success_textures_background() {
        let mut viewer = viewer();
        let copies = Rc::new(Cell::new(0));
        viewer.on_camera_result(Ok(Box::new(FakeCamera {
            copies: copies.clone(),
        })));

        assert!(viewer.scene().background.is_textured());
        assert_eq!(viewer.frame_source().unwrap().frame_size(), Some((640, 480)));
        assert_eq!(viewer.error_count(), 0);
        assert_eq!(copies.get(), 0);
    }

    #[test]
    fn test_resize_updates_aspect_and_is_idempotent() {
        let mut viewer = viewer();
        assert!(viewer.resize(800, 600));
        assert_eq!(
            viewer.viewport(),
            Viewport {
                width: 800,
                height: 600
            }
        );
        assert!((viewer.camera().aspect - 800.0 / 600.0).abs() < 1e-6);

        assert!(!viewer.resize(800, 600));
        assert_eq!(viewer.viewport().width, 800);
        assert!((viewer.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let mut viewer = viewer();
        assert!(!viewer.resize(0, 600));
        assert_eq!(viewer.viewport().width, 1024);
    }

    #[test]
    fn test_empty_model_keeps_view() {
        let mut viewer = viewer();
        viewer.insert_model(Model::new(Vec::new())).unwrap();
        assert_eq!(viewer.state(), LoopState::ActiveModel);
        assert_eq!(viewer.camera().target, Vec3::ZERO);
    }
}
