mod aabb;
mod plane;
mod plane_box_classification;
mod triangle;

pub use aabb::AABB;
pub use plane::Plane;
pub use plane_box_classification::{FrustumStatus, PackedPlane, classify_corners};
pub use triangle::Triangle;

use simba::simd::WideF32x8;

pub type FloatType = f32;
pub type SimdFloatType = WideF32x8;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;

/// Eight points at once, one per SIMD lane.
pub type WorldPoint8 = nalgebra::Point3<SimdFloatType>;
pub type WorldVector8 = nalgebra::Vector3<SimdFloatType>;

pub const EPSILON: FloatType = 1e-6;

/// Coordinate axis of the world space.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub fn index(self) -> usize {
        self as usize
    }
}
