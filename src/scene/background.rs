use crate::math::Transform;
use glam::Vec3;

/// Whether the background currently shows live camera frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoState {
    /// Camera request still in flight.
    #[default]
    Pending,
    Live,
    /// Camera request failed; the plane stays untextured for the session.
    Unavailable,
}

/// World-space plane behind the model that carries the camera feed.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPlane {
    pub width: f32,
    pub height: f32,
    pub transform: Transform,
    pub video: VideoState,
}

impl Default for BackgroundPlane {
    fn default() -> Self {
        Self::new(4.0, -10.0)
    }
}

impl BackgroundPlane {
    /// A 16:9 plane scaled by `scale`, centred on the z axis at depth `z`.
    pub fn new(scale: f32, z: f32) -> Self {
        Self {
            width: 16.0,
            height: 9.0,
            transform: Transform::from_position(Vec3::new(0.0, 0.0, z)).with_uniform_scale(scale),
            video: VideoState::Pending,
        }
    }

    pub fn is_textured(&self) -> bool {
        self.video == VideoState::Live
    }

    /// Extent in world units after scaling.
    pub fn world_size(&self) -> (f32, f32) {
        (
            self.width * self.transform.scale.x,
            self.height * self.transform.scale.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plane_is_four_times_16_by_9() {
        let plane = BackgroundPlane::default();
        assert_eq!(plane.world_size(), (64.0, 36.0));
        assert_eq!(plane.transform.position.z, -10.0);
        assert_eq!(plane.video, VideoState::Pending);
        assert!(!plane.is_textured());
    }
}
