//! Binary BVH over a static triangle set, answering which triangle sources are
//! visible in a frustum.
//!
//! Building works on [`BuildNode`]s holding plain min/max boxes. Once the tree shape
//! is final, every node is converted to a [`PackedNode`] that stores the 8 box corners
//! in SIMD lanes, and only packed nodes are ever queried.

mod building;
mod extraction;
mod frustum_query;
mod packing;
mod printing;

use index_vec::IndexVec;

use crate::geometry::{WorldBox, WorldPoint8};

pub use extraction::{BoundedTriangle, extract_triangles};
pub use frustum_query::QueryStack;
pub use printing::{Leaf, TreeStatistics};

/// Identifier of a group of triangles that are culled together (a mesh instance,
/// a mirror polygon, ...).
pub type SourceId = u32;

index_vec::define_index_type! {
    pub struct NodeIdx = u32;
}

index_vec::define_index_type! {
    pub struct TriangleIdx = u32;
}

#[derive(Clone, Debug)]
pub struct CullingBvh {
    /// Root is at index 0, right child of an inner node directly follows the left one.
    nodes: IndexVec<NodeIdx, PackedNode>,
    /// Length of the visibility array, one more than the largest source id.
    source_count: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum NodeLink {
    Inner { left: NodeIdx },
    Leaf { first_index: u32, source: SourceId },
}

/// Node while the tree is being built.
/// `link` is filled in when the builder gets to process the node.
#[derive(Clone, Debug)]
struct BuildNode {
    bounds: WorldBox,
    link: Option<NodeLink>,
}

/// Node of the finished tree, with corners of its box packed for plane tests.
#[derive(Clone, Debug)]
struct PackedNode {
    corners: WorldPoint8,
    link: NodeLink,
}

impl NodeLink {
    fn children(left: NodeIdx) -> [NodeIdx; 2] {
        [left, left + 1]
    }
}

impl CullingBvh {
    fn root() -> NodeIdx {
        NodeIdx::new(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of entries a visibility array for this tree needs.
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Box around all triangles, empty box if the tree is empty.
    pub fn bounding_box(&self) -> WorldBox {
        self.nodes
            .get(Self::root())
            .map_or_else(WorldBox::empty, PackedNode::bounds)
    }
}
