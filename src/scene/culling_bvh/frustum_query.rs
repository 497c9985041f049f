use assert2::debug_assert;

use crate::{frustum::Frustum, geometry::FrustumStatus};

use super::{CullingBvh, NodeIdx, NodeLink};

/// Traversal stack of the visibility query, kept between queries to reuse the allocation.
#[derive(Clone, Debug, Default)]
pub struct QueryStack {
    stack: Vec<(NodeIdx, FrustumStatus)>,
}

impl CullingBvh {
    /// Sets `visible[source]` for every source that has at least one triangle
    /// whose bounding box is not fully outside the frustum.
    ///
    /// Entries are only ever set, never cleared, so the same array can accumulate
    /// results of several frusta. `visible` must have at least `source_count()` entries.
    pub fn find_visible_sources(
        &self,
        frustum: &Frustum,
        visible: &mut [bool],
        stack: &mut QueryStack,
    ) {
        debug_assert!(visible.len() >= self.source_count);
        debug_assert!(stack.stack.is_empty());

        let Some(root) = self.nodes.get(Self::root()) else {
            return;
        };

        let frustum = frustum.packed();
        let root_status = frustum.classify(&root.corners);
        if root_status == FrustumStatus::Out {
            return;
        }

        stack.stack.reserve(self.nodes.len());
        stack.stack.push((Self::root(), root_status));

        while let Some((index, status)) = stack.stack.pop() {
            match self.nodes[index].link {
                NodeLink::Leaf { source, .. } => visible[source as usize] = true,
                NodeLink::Inner { left } => {
                    for child in NodeLink::children(left) {
                        // Everything below a node that is fully inside is inside too
                        let child_status = if status == FrustumStatus::In {
                            FrustumStatus::In
                        } else {
                            frustum.classify(&self.nodes[child].corners)
                        };

                        if child_status != FrustumStatus::Out {
                            stack.stack.push((child, child_status));
                        }
                    }
                }
            }
        }
    }

    /// Convenience wrapper around `find_visible_sources` that allocates the output.
    pub fn visible_sources(&self, frustum: &Frustum) -> Vec<bool> {
        let mut visible = vec![false; self.source_count];
        self.find_visible_sources(frustum, &mut visible, &mut QueryStack::default());
        visible
    }
}
