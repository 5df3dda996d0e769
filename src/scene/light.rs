use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }

    pub fn white(intensity: f32) -> Self {
        Self::new(Vec3::ONE, intensity)
    }

    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// Parallel light shining from `position` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            position,
            target: Vec3::ZERO,
        }
    }

    pub fn white(intensity: f32, position: Vec3) -> Self {
        Self::new(Vec3::ONE, intensity, position)
    }

    /// Unit vector the light travels along. Falls back to straight down when
    /// position and target coincide.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Y)
    }

    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_points_at_origin() {
        let light = DirectionalLight::white(1.0, Vec3::new(50.0, 50.0, 50.0));
        let dir = light.direction();
        assert!((dir - Vec3::splat(-1.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_direction() {
        let light = DirectionalLight::white(1.0, Vec3::ZERO);
        assert_eq!(light.direction(), Vec3::NEG_Y);
    }

    #[test]
    fn test_ambient_radiance() {
        assert_eq!(AmbientLight::white(0.5).radiance(), Vec3::splat(0.5));
    }
}
