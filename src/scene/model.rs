use crate::math::{Aabb, Transform};
use crate::render::mesh::Vertex;
use std::f64::consts::TAU;
use std::sync::Arc;

/// Decoded base-colour image, tightly packed RGBA8 rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels.get(i..i + 4).and_then(|p| p.try_into().ok())
    }
}

/// One drawable triangle list. The final colour is `color` times the vertex
/// colour times the sampled `texture` (white when absent).
#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub color: [f32; 4],
    /// Shared between primitives that use the same image.
    pub texture: Option<Arc<TextureImage>>,
}

impl ModelPrimitive {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A loaded asset with node transforms baked into its vertices.
///
/// The only per-frame state is the spin about +Y, kept as a frame count so
/// that the angle is always exactly `frames * step`.
#[derive(Debug, Clone)]
pub struct Model {
    primitives: Vec<ModelPrimitive>,
    bounds: Aabb,
    spin_step: f32,
    spin_frames: u64,
}

impl Model {
    pub fn new(primitives: Vec<ModelPrimitive>) -> Self {
        let bounds = Aabb::from_points(
            primitives
                .iter()
                .flat_map(|p| p.vertices.iter())
                .map(|v| v.position.into()),
        );
        Self {
            primitives,
            bounds,
            spin_step: 0.0,
            spin_frames: 0,
        }
    }

    pub fn primitives(&self) -> &[ModelPrimitive] {
        &self.primitives
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(|p| p.triangle_count()).sum()
    }

    pub(crate) fn set_spin_step(&mut self, step: f32) {
        self.spin_step = step;
    }

    pub(crate) fn advance_spin(&mut self) {
        self.spin_frames += 1;
    }

    pub fn spin_frames(&self) -> u64 {
        self.spin_frames
    }

    /// Accumulated rotation in radians. Never wraps.
    pub fn rotation_angle(&self) -> f64 {
        self.spin_frames as f64 * self.spin_step as f64
    }

    pub fn transform(&self) -> Transform {
        Transform::from_rotation_y(self.rotation_angle().rem_euclid(TAU) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn quad() -> ModelPrimitive {
        let v = |x: f32, y: f32| Vertex::new(Vec3::new(x, y, 0.0), Vec3::Z);
        ModelPrimitive {
            vertices: vec![v(1.0, 0.0), v(3.0, 0.0), v(3.0, 2.0), v(1.0, 2.0)],
            indices: vec![0, 1, 2, 0, 2, 3],
            color: [1.0; 4],
            texture: None,
        }
    }

    #[test]
    fn test_bounds_cover_all_vertices() {
        let model = Model::new(vec![quad()]);
        assert_eq!(model.bounds().center(), Some(Vec3::new(2.0, 1.0, 0.0)));
        assert_eq!(model.vertex_count(), 4);
        assert_eq!(model.triangle_count(), 2);
    }

    #[test]
    fn test_texture_pixel_lookup() {
        let image = TextureImage {
            width: 2,
            height: 1,
            pixels: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        assert_eq!(image.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_spin_is_frames_times_step() {
        let mut model = Model::new(vec![quad()]);
        model.set_spin_step(0.01);
        let mut previous = model.rotation_angle();
        for n in 1..=1000u64 {
            model.advance_spin();
            let angle = model.rotation_angle();
            assert!(angle > previous);
            assert!((angle - n as f64 * 0.01f32 as f64).abs() < 1e-12);
            previous = angle;
        }
    }

    #[test]
    fn test_transform_wraps_angle() {
        let mut model = Model::new(vec![quad()]);
        model.set_spin_step(std::f32::consts::FRAC_PI_2);
        for _ in 0..5 {
            model.advance_spin();
        }
        let expected = Transform::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let p = model.transform().transform_point(Vec3::X);
        assert!((p - expected.transform_point(Vec3::X)).length() < 1e-4);
    }
}
