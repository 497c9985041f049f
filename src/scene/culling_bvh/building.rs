use assert2::debug_assert;
use index_vec::{IndexSlice, IndexVec};

use crate::geometry::{WorldBox, WorldPoint};

use super::{
    BoundedTriangle, BuildNode, CullingBvh, NodeIdx, NodeLink, SourceId, TriangleIdx,
    extraction::extract_triangles, packing::finalize,
};

impl CullingBvh {
    /// Builds the tree from indexed triangles.
    ///
    /// Every index triple is one triangle, `source_ids` has one entry per triangle.
    /// The resulting tree has exactly one leaf per triangle.
    pub fn build<I: Copy + Into<u32>>(
        vertices: &[WorldPoint],
        indices: &[I],
        source_ids: &[SourceId],
    ) -> CullingBvh {
        let triangles = extract_triangles(vertices, indices, source_ids);
        let source_count = triangles
            .iter()
            .map(|t| t.source as usize + 1)
            .max()
            .unwrap_or(0);

        if triangles.is_empty() {
            return CullingBvh {
                nodes: IndexVec::new(),
                source_count,
            };
        }

        let mut builder = TreeBuilder {
            triangles: &triangles,
            nodes: IndexVec::with_capacity(2 * triangles.len() - 1),
        };

        let root = builder.push_node(triangles.as_raw_slice());
        debug_assert!(root == Self::root());

        let mut triangle_ids: Vec<TriangleIdx> = triangles.indices().collect();
        builder.split_node(root, &mut triangle_ids);

        let bvh = CullingBvh {
            nodes: finalize(builder.nodes),
            source_count,
        };

        log::debug!(
            "Built culling BVH: {} triangles, {} sources, {} nodes",
            triangles.len(),
            source_count,
            bvh.node_count()
        );

        bvh
    }
}

struct TreeBuilder<'a> {
    triangles: &'a IndexSlice<TriangleIdx, [BoundedTriangle]>,
    nodes: IndexVec<NodeIdx, BuildNode>,
}

impl TreeBuilder<'_> {
    /// Appends a node bounding the given triangles, returns its index.
    fn push_node<'t>(&mut self, triangles: impl IntoIterator<Item = &'t BoundedTriangle>) -> NodeIdx {
        self.nodes.push(BuildNode {
            bounds: WorldBox::from_boxes(triangles.into_iter().map(|t| &t.bounds)),
            link: None,
        })
    }

    /// Turns the node into a leaf, or splits its triangles into two new child nodes
    /// and recurses.
    ///
    /// Appending children may reallocate `self.nodes`, so nodes are only ever
    /// accessed through their indices.
    fn split_node(&mut self, node: NodeIdx, triangle_ids: &mut [TriangleIdx]) {
        debug_assert!(!triangle_ids.is_empty());

        if triangle_ids.len() == 1 {
            let triangle = &self.triangles[triangle_ids[0]];
            self.nodes[node].link = Some(NodeLink::Leaf {
                first_index: triangle.first_index,
                source: triangle.source,
            });
            return;
        }

        let split = partition_triangles(self.triangles, &self.nodes[node].bounds, triangle_ids);
        let (left_ids, right_ids) = triangle_ids.split_at_mut(split);

        let triangles = self.triangles;
        let left = self.push_node(left_ids.iter().map(|id| &triangles[*id]));
        let right = self.push_node(right_ids.iter().map(|id| &triangles[*id]));
        debug_assert!(NodeLink::children(left) == [left, right]);

        self.nodes[node].link = Some(NodeLink::Inner { left });

        self.split_node(left, left_ids);
        self.split_node(right, right_ids);
    }
}

/// Reorders triangle ids so that triangles with center below the midpoint of the
/// widest axis of `bounds` come first. Returns the number of triangles in the first
/// part, which is always between 1 and `triangle_ids.len() - 1`.
fn partition_triangles(
    triangles: &IndexSlice<TriangleIdx, [BoundedTriangle]>,
    bounds: &WorldBox,
    triangle_ids: &mut [TriangleIdx],
) -> usize {
    debug_assert!(triangle_ids.len() >= 2);

    let axis = bounds.widest_axis().index();
    let midpoint = bounds.center()[axis];

    let split = itertools::partition(triangle_ids.iter_mut(), |id| {
        triangles[*id].center[axis] < midpoint
    });

    if split == 0 || split == triangle_ids.len() {
        // All centers are on one side of the midpoint (the box is bigger than the
        // spread of the centers), fall back to splitting the ids in half.
        interleave_halves(triangle_ids)
    } else {
        split
    }
}

/// Splits the ids in two halves without any spatial criterion, swapping every other
/// pair of front and back elements. Returns the size of the first half.
fn interleave_halves(triangle_ids: &mut [TriangleIdx]) -> usize {
    let last = triangle_ids.len() - 1;
    let mut split = 0;
    while split < last - split {
        if split % 2 == 1 {
            triangle_ids.swap(split, last - split);
        }
        split += 1;
    }
    split
}
