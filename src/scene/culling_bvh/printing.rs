use std::fmt::Display;

use crate::{geometry::WorldBox, util::Stats};

use super::{CullingBvh, NodeIdx, NodeLink, SourceId};

/// Leaf of the tree, one per input triangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    /// Position of the triangle's first index in the index array the tree was built from.
    pub first_index: u32,
    pub source: SourceId,
    pub bounds: WorldBox,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeStatistics {
    pub node_count: usize,
    pub leaf_count: usize,
    /// Depth of leaves, root has depth 1
    pub depth: Stats,
}

impl Display for TreeStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes, {} leaves, leaf depth: {}",
            self.node_count, self.leaf_count, self.depth
        )
    }
}

impl CullingBvh {
    pub fn leaves(&self) -> impl Iterator<Item = Leaf> + '_ {
        self.nodes.iter().filter_map(|node| match node.link {
            NodeLink::Leaf {
                first_index,
                source,
            } => Some(Leaf {
                first_index,
                source,
                bounds: node.bounds(),
            }),
            NodeLink::Inner { .. } => None,
        })
    }

    pub fn statistics(&self) -> TreeStatistics {
        let mut depth = Stats::default();
        self.visit_depth_first(|_, link, node_depth| {
            if let NodeLink::Leaf { .. } = link {
                depth.add_sample(node_depth);
            }
            true
        });

        TreeStatistics {
            node_count: self.nodes.len(),
            leaf_count: depth.count,
            depth,
        }
    }

    /// Boxes a debug view shows for the given level of the tree:
    /// nodes at exactly `depth` (root is 0), plus leaves that end above it.
    pub fn boxes_at_depth(&self, depth: usize) -> Vec<WorldBox> {
        let mut boxes = Vec::new();
        self.visit_depth_first(|index, link, node_depth| {
            let reached = node_depth - 1 == depth || matches!(link, NodeLink::Leaf { .. });
            if reached {
                boxes.push(self.nodes[index].bounds());
            }
            !reached
        });
        boxes
    }

    pub fn print_tree(&self) {
        self.print_recursive(0, Self::root());
    }

    fn print_recursive(&self, indent: usize, index: NodeIdx) {
        let Some(node) = self.nodes.get(index) else {
            return;
        };
        let bounds = node.bounds();

        match node.link {
            NodeLink::Leaf {
                first_index,
                source,
            } => println!(
                "{}- L{}: {:?}-{:?} source {} first index {}",
                "  ".repeat(indent),
                index.index(),
                bounds.min,
                bounds.max,
                source,
                first_index,
            ),
            NodeLink::Inner { left } => {
                println!(
                    "{}- I{}: {:?}-{:?}",
                    "  ".repeat(indent),
                    index.index(),
                    bounds.min,
                    bounds.max,
                );
                for child in NodeLink::children(left) {
                    self.print_recursive(indent + 1, child);
                }
            }
        }
    }

    /// Calls `f(index, link, depth)` for nodes in depth first order, root has depth 1.
    /// Children of a node are only visited if `f` returns true for it.
    fn visit_depth_first(&self, mut f: impl FnMut(NodeIdx, NodeLink, usize) -> bool) {
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = vec![(Self::root(), 1)];
        while let Some((index, depth)) = stack.pop() {
            let link = self.nodes[index].link;
            if !f(index, link, depth) {
                continue;
            }
            if let NodeLink::Inner { left } = link {
                // Reversed, so that the left child is visited first
                for child in NodeLink::children(left).into_iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }
}
