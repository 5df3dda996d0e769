//! Math utilities module
//!
//! Provides convenient re-exports from glam plus the transform and bounding
//! box types used by the scene.

mod aabb;
mod transform;

pub use aabb::Aabb;
pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
