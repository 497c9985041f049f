use nalgebra::Vector4;

use super::{FloatType, WorldPoint, WorldVector};

/// Half-space `normal · p + offset >= 0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: WorldVector,
    pub offset: FloatType,
}

impl Plane {
    /// Creates a plane from a normal and offset, normalizing both so that
    /// signed distance is in world units.
    /// Panics if normal is zero.
    pub fn new(normal: WorldVector, offset: FloatType) -> Plane {
        let length = normal.norm();
        assert!(length > 0.0, "Plane normal must be non-zero");
        Plane {
            normal: normal / length,
            offset: offset / length,
        }
    }

    /// Creates a plane without normalizing.
    /// Inside/outside tests still work, distances are scaled by the normal length.
    pub fn new_unnormalized(normal: WorldVector, offset: FloatType) -> Plane {
        Plane { normal, offset }
    }

    /// Plane with given normal, passing through a point.
    pub fn through_point(normal: WorldVector, point: &WorldPoint) -> Plane {
        let normal = normal.normalize();
        Plane {
            normal,
            offset: -point.coords.dot(&normal),
        }
    }

    /// Plane from the `(a, b, c, d)` coefficients of `ax + by + cz + d = 0`.
    pub fn from_coefficients(v: &Vector4<FloatType>) -> Plane {
        Plane::new(v.xyz(), v.w)
    }

    pub fn signed_distance(&self, point: &WorldPoint) -> FloatType {
        self.normal.dot(&point.coords) + self.offset
    }

    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            offset: -self.offset,
        }
    }
}
