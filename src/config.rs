use glam::Vec3;

pub const DEFAULT_MODEL_PATH: &str = "./assets/Brama.glb";

/// Tunables for the viewer. Both shells start from `Default`; the native
/// binary overrides a subset from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub model_path: String,
    /// Radians added to the model's Y rotation every frame.
    pub rotation_step: f32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: Vec3,
    pub camera_position: Vec3,
    pub fov_degrees: f32,
    /// Uniform scale applied to the 16x9 background plane.
    pub background_scale: f32,
    /// Orbit inertia factor in `(0, 1)`. `None` applies input immediately.
    pub orbit_damping: Option<f32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.to_string(),
            rotation_step: 0.01,
            ambient_intensity: 0.5,
            directional_intensity: 1.0,
            directional_position: Vec3::new(50.0, 50.0, 50.0),
            camera_position: Vec3::new(0.0, 50.0, 50.0),
            fov_degrees: 75.0,
            background_scale: 4.0,
            orbit_damping: None,
        }
    }
}

impl ViewerConfig {
    pub fn with_model_path(mut self, path: impl Into<String>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_rotation_step(mut self, step: f32) -> Self {
        self.rotation_step = step;
        self
    }

    pub fn with_ambient_intensity(mut self, intensity: f32) -> Self {
        self.ambient_intensity = intensity;
        self
    }

    pub fn with_orbit_damping(mut self, damping: Option<f32>) -> Self {
        self.orbit_damping = damping.map(|d| d.clamp(0.0, 0.99));
        self
    }
}
