//! Math utilities module
//!
//! Re-exports from glam and the transform used to place models.

mod transform;

pub use transform::Transform;

pub use glam::{Mat4, Quat, Vec2, Vec3};
