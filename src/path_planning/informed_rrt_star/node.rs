//! Search tree node

use crate::common::Point2D;

/// Handle of a node inside a [`Tree`](super::Tree) arena.
///
/// Handles are only valid for the tree that issued them and are invalidated
/// by pruning; use the returned [`NodeRemap`](super::NodeRemap) to carry
/// them across a prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) position: Point2D,
    pub(crate) parent: Option<NodeId>,
    pub(crate) path_length_from_root: f64,
    pub(crate) informed: bool,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn root(position: Point2D) -> Self {
        Node {
            position,
            parent: None,
            path_length_from_root: 0.0,
            informed: false,
            children: Vec::new(),
        }
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Sum of edge lengths from the root to this node
    pub fn path_length_from_root(&self) -> f64 {
        self.path_length_from_root
    }

    /// Whether the node was sampled from the informed ellipse
    pub fn informed(&self) -> bool {
        self.informed
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
