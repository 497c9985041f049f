use index_vec::IndexVec;

use crate::geometry::WorldBox;

use super::{BuildNode, NodeIdx, PackedNode};

/// Converts the finished tree into its query form.
/// Consumes the build nodes, so nothing can be appended after packing.
pub(super) fn finalize(nodes: IndexVec<NodeIdx, BuildNode>) -> IndexVec<NodeIdx, PackedNode> {
    nodes.into_iter().map(BuildNode::pack).collect()
}

impl BuildNode {
    fn pack(self) -> PackedNode {
        PackedNode {
            corners: self.bounds.corners(),
            link: self
                .link
                .expect("Builder must process every node it appends"),
        }
    }
}

impl PackedNode {
    pub(super) fn bounds(&self) -> WorldBox {
        WorldBox::from_corners(&self.corners)
    }
}
