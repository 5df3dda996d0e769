use glam::{Mat3, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation_y(angle: f32) -> Self {
        Self {
            rotation: Quat::from_rotation_y(angle),
            ..Self::IDENTITY
        }
    }

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Inverse-transpose of the upper 3x3, for transforming normals.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.to_matrix()).inverse().transpose()
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (point * self.scale) + self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_y_quarter_turn() {
        let t = Transform::from_rotation_y(FRAC_PI_2);
        let p = t.transform_point(Vec3::X);
        assert!((p - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_matrix_matches_transform_point() {
        let t = Transform::new(Vec3::new(0.0, 0.0, -10.0), Quat::IDENTITY, Vec3::splat(4.0));
        let p = Vec3::new(8.0, 4.5, 0.0);
        let via_matrix = t.to_matrix().transform_point3(p);
        assert!((via_matrix - t.transform_point(p)).length() < 1e-5);
        assert_eq!(via_matrix, Vec3::new(32.0, 18.0, -10.0));
    }
}
