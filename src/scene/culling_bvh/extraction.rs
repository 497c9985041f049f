use assert2::debug_assert;
use index_vec::IndexVec;

use crate::geometry::{Triangle, WorldBox, WorldPoint};

use super::{SourceId, TriangleIdx};

/// Triangle reduced to what the builder needs.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedTriangle {
    pub bounds: WorldBox,
    /// Center of the bounding box (not the centroid), used for splitting.
    pub center: WorldPoint,
    /// Position of the triangle's first index in the index array.
    pub first_index: u32,
    pub source: SourceId,
}

/// Converts indexed triangles into bounded triangles, one for every index triple.
///
/// Indices must be in range for `vertices` and `source_ids` must have an entry for
/// every triangle; this is only checked in debug builds.
pub fn extract_triangles<I: Copy + Into<u32>>(
    vertices: &[WorldPoint],
    indices: &[I],
    source_ids: &[SourceId],
) -> IndexVec<TriangleIdx, BoundedTriangle> {
    debug_assert!(indices.len() % 3 == 0);
    debug_assert!(source_ids.len() >= indices.len() / 3);

    indices
        .chunks_exact(3)
        .zip(source_ids)
        .enumerate()
        .map(|(i, (triangle_indices, source))| {
            let triangle = Triangle::new(triangle_indices[0], triangle_indices[1], triangle_indices[2])
                .map(|index| {
                    let index: u32 = (*index).into();
                    debug_assert!((index as usize) < vertices.len());
                    vertices[index as usize]
                });
            let bounds = triangle.bounding_box();
            BoundedTriangle {
                center: bounds.center(),
                bounds,
                first_index: (i * 3) as u32,
                source: *source,
            }
        })
        .collect()
}
