//! Scene graph: the background video plane, two lights and at most one model.
//!
//! The scene is complete and renderable as soon as it is built; the video
//! texture and the model both arrive later and are simply not drawn until
//! then.

mod background;
mod light;
mod model;

pub use background::{BackgroundPlane, VideoState};
pub use light::{AmbientLight, DirectionalLight};
pub use model::{Model, ModelPrimitive, TextureImage};

use crate::config::ViewerConfig;
use crate::error::ViewerError;

#[derive(Debug, Clone)]
pub struct Scene {
    pub background: BackgroundPlane,
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    model: Option<Model>,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::builder()
            .background(BackgroundPlane::new(config.background_scale, -10.0))
            .ambient(AmbientLight::white(config.ambient_intensity))
            .directional(DirectionalLight::white(
                config.directional_intensity,
                config.directional_position,
            ))
            .build()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Adds the model. The scene holds at most one; a second insert is
    /// rejected and the existing model is kept.
    pub fn insert_model(&mut self, model: Model) -> Result<&mut Model, ViewerError> {
        if self.model.is_some() {
            return Err(ViewerError::ModelAlreadyLoaded);
        }
        Ok(self.model.insert(model))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    background: Option<BackgroundPlane>,
    ambient: Option<AmbientLight>,
    directional: Option<DirectionalLight>,
}

impl SceneBuilder {
    pub fn background(mut self, background: BackgroundPlane) -> Self {
        self.background = Some(background);
        self
    }

    pub fn ambient(mut self, light: AmbientLight) -> Self {
        self.ambient = Some(light);
        self
    }

    pub fn directional(mut self, light: DirectionalLight) -> Self {
        self.directional = Some(light);
        self
    }

    pub fn build(self) -> Scene {
        let defaults = ViewerConfig::default();
        Scene {
            background: self.background.unwrap_or_default(),
            ambient: self
                .ambient
                .unwrap_or_else(|| AmbientLight::white(defaults.ambient_intensity)),
            directional: self.directional.unwrap_or_else(|| {
                DirectionalLight::white(
                    defaults.directional_intensity,
                    defaults.directional_position,
                )
            }),
            model: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_scene_from_default_config() {
        let scene = Scene::from_config(&ViewerConfig::default());
        assert_eq!(scene.ambient.intensity, 0.5);
        assert_eq!(scene.directional.intensity, 1.0);
        assert_eq!(scene.directional.position, Vec3::new(50.0, 50.0, 50.0));
        assert_eq!(scene.background.world_size(), (64.0, 36.0));
        assert!(!scene.has_model());
    }

    #[test]
    fn test_builder_overrides() {
        let scene = Scene::builder()
            .ambient(AmbientLight::new(Vec3::new(1.0, 0.0, 0.0), 0.2))
            .build();
        assert_eq!(scene.ambient.radiance(), Vec3::new(0.2, 0.0, 0.0));
        assert_eq!(scene.background, BackgroundPlane::default());
    }

    #[test]
    fn test_model_inserted_at_most_once() {
        let mut scene = Scene::builder().build();
        assert!(scene.insert_model(Model::new(Vec::new())).is_ok());
        assert_eq!(
            scene.insert_model(Model::new(Vec::new())).err(),
            Some(ViewerError::ModelAlreadyLoaded)
        );
        assert!(scene.has_model());
    }
}
