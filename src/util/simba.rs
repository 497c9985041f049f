use simba::simd::WideF32x8;

use crate::geometry::{SimdFloatType, WorldPoint8, WorldVector8};

/// Signed distance of 8 points from a plane, `((offset + x*nx) + y*ny) + z*nz`,
/// evaluated as a chain of fused multiply-adds.
pub fn fma_plane_distance(
    normal: &WorldVector8,
    offset: SimdFloatType,
    point: &WorldPoint8,
) -> SimdFloatType {
    WideF32x8(
        point.z.0.mul_add(
            normal.z.0,
            point
                .y
                .0
                .mul_add(normal.y.0, point.x.0.mul_add(normal.x.0, offset.0)),
        ),
    )
}
