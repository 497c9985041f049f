use simba::simd::{SimdPartialOrd as _, SimdValue as _};

use crate::util::simba::fma_plane_distance;

use super::{Plane, SimdFloatType, WorldPoint8, WorldVector8};

/// Where a box lies relative to a set of half-spaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrustumStatus {
    /// All corners are inside all planes.
    In,
    /// Not fully inside, but no single plane has all corners outside.
    Intersecting,
    /// All corners are outside of at least one plane.
    Out,
}

/// A plane splatted across all lanes, ready to be tested against 8 box corners.
#[derive(Copy, Clone, Debug)]
pub struct PackedPlane {
    normal: WorldVector8,
    offset: SimdFloatType,
}

impl From<&Plane> for PackedPlane {
    fn from(plane: &Plane) -> Self {
        PackedPlane {
            normal: plane.normal.map(SimdFloatType::splat),
            offset: SimdFloatType::splat(plane.offset),
        }
    }
}

impl PackedPlane {
    /// Bit mask of the lanes whose point is strictly on the negative side of the plane.
    pub fn outside_mask(&self, points: &WorldPoint8) -> u32 {
        let distance = fma_plane_distance(&self.normal, self.offset, points);
        distance.simd_lt(SimdFloatType::splat(0.0)).0.move_mask() as u32
    }
}

/// Classifies a box given by its 8 packed corners against all planes.
/// Stops at the first plane that has every corner outside.
pub fn classify_corners(planes: &[PackedPlane], corners: &WorldPoint8) -> FrustumStatus {
    let mut status = FrustumStatus::In;
    for plane in planes {
        match plane.outside_mask(corners).count_ones() {
            0 => {}
            8 => return FrustumStatus::Out,
            _ => status = FrustumStatus::Intersecting,
        }
    }
    status
}
