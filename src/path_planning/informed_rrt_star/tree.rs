//! Incremental search tree for Informed RRT*
//!
//! Nodes live in an arena and refer to their parent by [`NodeId`]. The root
//! is always stored at index 0.

use std::collections::VecDeque;

use log::debug;
use ordered_float::OrderedFloat;

use super::informed_region::InformedRegion;
use super::node::{Node, NodeId};
use crate::common::{FieldBounds, Path2D, PlannerError, PlannerResult, Point2D};

/// Tolerance used when checking cost consistency
const COST_EPS: f64 = 1e-9;

/// Mapping from handles before a prune to handles after it
#[derive(Debug, Clone)]
pub struct NodeRemap {
    mapping: Vec<Option<NodeId>>,
}

impl NodeRemap {
    /// New handle of `old`, or `None` if it was pruned
    pub fn get(&self, old: NodeId) -> Option<NodeId> {
        self.mapping.get(old.0).copied().flatten()
    }

    pub fn removed(&self) -> usize {
        self.mapping.iter().filter(|m| m.is_none()).count()
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    max_branch_length: f64,
    neighborhood_radius: f64,
}

impl Tree {
    pub fn new(max_branch_length: f64, neighborhood_radius: f64) -> Self {
        Tree {
            nodes: Vec::new(),
            max_branch_length,
            neighborhood_radius: neighborhood_radius.min(max_branch_length),
        }
    }

    pub fn max_branch_length(&self) -> f64 {
        self.max_branch_length
    }

    pub fn neighborhood_radius(&self) -> f64 {
        self.neighborhood_radius
    }

    /// Discard every node and seed the tree with a new root.
    pub fn reset(&mut self, root: Point2D) -> NodeId {
        self.nodes.clear();
        self.nodes.push(Node::root(root));
        NodeId(0)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes sampled from the informed ellipse
    pub fn informed_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.informed).count()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// `(parent, child)` position pairs for every edge
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.nodes
            .iter()
            .filter_map(move |n| n.parent.map(|p| (self.nodes[p.0].position, n.position)))
    }

    /// Insert a node below `parent`.
    ///
    /// # Panics
    /// If `parent` does not belong to this tree.
    pub fn add_node(&mut self, position: Point2D, parent: NodeId, informed: bool) -> NodeId {
        let parent_node = &self.nodes[parent.0];
        let cost = parent_node.path_length_from_root + parent_node.position.distance(&position);
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            position,
            parent: Some(parent),
            path_length_from_root: cost,
            informed,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Node closest to `point`; the earliest inserted wins ties.
    pub fn nearest_node(&self, point: &Point2D) -> PlannerResult<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .min_by_key(|(_, n)| OrderedFloat(n.position.distance(point)))
            .map(|(i, _)| NodeId(i))
            .ok_or(PlannerError::EmptyTree)
    }

    /// All nodes within `radius` of `point`
    pub fn near_nodes(&self, point: &Point2D, radius: f64) -> Vec<NodeId> {
        let r_sq = radius * radius;
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| {
                let d_sq = (n.position.x - point.x).powi(2) + (n.position.y - point.y).powi(2);
                if d_sq <= r_sq {
                    Some(NodeId(i))
                } else {
                    None
                }
            })
            .collect()
    }

    /// RRT* rewiring around `new_node`; returns how many parents changed.
    pub fn optimize(&mut self, new_node: NodeId) -> usize {
        self.optimize_with(new_node, |_, _| true)
    }

    /// Like [`optimize`](Self::optimize) but only uses edges accepted by
    /// `edge_free`.
    ///
    /// First picks the cheapest parent for `new_node` among its neighbours,
    /// then reroutes every neighbour that becomes strictly cheaper through
    /// `new_node`. Costs never increase.
    pub fn optimize_with<E>(&mut self, new_node: NodeId, mut edge_free: E) -> usize
    where
        E: FnMut(&Point2D, &Point2D) -> bool,
    {
        let position = self.nodes[new_node.0].position;
        let near: Vec<NodeId> = self
            .near_nodes(&position, self.neighborhood_radius)
            .into_iter()
            .filter(|&id| id != new_node)
            .collect();
        let mut changed = 0;

        let mut best: Option<(NodeId, f64)> = None;
        for &candidate in &near {
            if Some(candidate) == self.nodes[new_node.0].parent || self.is_ancestor(new_node, candidate) {
                continue;
            }
            let node = &self.nodes[candidate.0];
            let cost = node.path_length_from_root + node.position.distance(&position);
            let to_beat = best.map_or(self.nodes[new_node.0].path_length_from_root, |(_, c)| c);
            if cost < to_beat && edge_free(&node.position, &position) {
                best = Some((candidate, cost));
            }
        }
        if let Some((parent, _)) = best {
            self.reparent(new_node, parent);
            changed += 1;
        }

        for &neighbor in &near {
            if self.is_ancestor(neighbor, new_node) {
                continue;
            }
            let new_cost = self.nodes[new_node.0].path_length_from_root
                + position.distance(&self.nodes[neighbor.0].position);
            if new_cost < self.nodes[neighbor.0].path_length_from_root
                && edge_free(&position, &self.nodes[neighbor.0].position)
            {
                self.reparent(neighbor, new_node);
                changed += 1;
            }
        }
        changed
    }

    /// Whether `ancestor` lies on the parent chain of `node` (excluding `node`).
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes[node.0].parent;
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|&c| c != child);
        }
        self.nodes[new_parent.0].children.push(child);
        self.nodes[child.0].parent = Some(new_parent);
        self.propagate_cost(child);
    }

    /// Recompute costs of `start` and its whole subtree from their parents.
    fn propagate_cost(&mut self, start: NodeId) {
        let mut queue = VecDeque::from(vec![start]);
        while let Some(id) = queue.pop_front() {
            if let Some(parent) = self.nodes[id.0].parent {
                let parent_node = &self.nodes[parent.0];
                let cost = parent_node.path_length_from_root
                    + parent_node.position.distance(&self.nodes[id.0].position);
                self.nodes[id.0].path_length_from_root = cost;
            }
            queue.extend(self.nodes[id.0].children.iter().copied());
        }
    }

    /// Handles from the root to `node`, inclusive.
    pub fn trace(&self, node: NodeId) -> Vec<NodeId> {
        let mut ids = vec![node];
        let mut current = self.nodes[node.0].parent;
        while let Some(id) = current {
            ids.push(id);
            current = self.nodes[id.0].parent;
        }
        ids.reverse();
        ids
    }

    /// Waypoints from the root to `node`, inclusive.
    pub fn trace_path(&self, node: NodeId) -> Path2D {
        Path2D::from_points(self.trace(node).into_iter().map(|id| self.nodes[id.0].position).collect())
    }

    /// Drop nodes that cannot improve the current best path.
    ///
    /// Nodes inside `region` are kept together with their ancestors, and so
    /// is the chain from the root to `protect`.
    pub fn prune_informed(&mut self, region: &InformedRegion, protect: Option<NodeId>) -> NodeRemap {
        let mut keep: Vec<bool> = self.nodes.iter().map(|n| region.contains(&n.position)).collect();
        if let Some(id) = protect {
            keep[id.0] = true;
        }
        for i in 0..self.nodes.len() {
            if !keep[i] {
                continue;
            }
            let mut current = self.nodes[i].parent;
            while let Some(id) = current {
                if keep[id.0] {
                    break;
                }
                keep[id.0] = true;
                current = self.nodes[id.0].parent;
            }
        }
        if let Some(root) = self.root() {
            keep[root.0] = true;
        }
        let remap = self.retain(&keep);
        debug!("informed prune removed {} nodes, {} remain", remap.removed(), self.nodes.len());
        remap
    }

    /// Drop every node now outside the field together with its subtree.
    ///
    /// With `edge_resolution` set, a node whose incoming edge crosses
    /// occupied space is dropped as well. Survivors are not re-attached.
    pub fn prune_blocked<F>(&mut self, field: &F, edge_resolution: Option<f64>) -> NodeRemap
    where
        F: FieldBounds + ?Sized,
    {
        let mut keep = vec![false; self.nodes.len()];
        if let Some(root) = self.root() {
            let mut queue = VecDeque::new();
            if field.in_field(&self.nodes[root.0].position) {
                keep[root.0] = true;
                queue.push_back(root);
            }
            while let Some(id) = queue.pop_front() {
                let from = self.nodes[id.0].position;
                for &child in &self.nodes[id.0].children {
                    let to = self.nodes[child.0].position;
                    if field.in_field(&to) && edge_in_field(field, &from, &to, edge_resolution) {
                        keep[child.0] = true;
                        queue.push_back(child);
                    }
                }
            }
        }
        let remap = self.retain(&keep);
        debug!("blocked prune removed {} nodes, {} remain", remap.removed(), self.nodes.len());
        remap
    }

    /// Compact the arena to the nodes flagged in `keep`.
    ///
    /// `keep` must be closed under the parent relation.
    fn retain(&mut self, keep: &[bool]) -> NodeRemap {
        let mut mapping = Vec::with_capacity(self.nodes.len());
        let mut next = 0;
        for &k in keep {
            if k {
                mapping.push(Some(NodeId(next)));
                next += 1;
            } else {
                mapping.push(None);
            }
        }
        let remap = NodeRemap { mapping };

        let old = std::mem::take(&mut self.nodes);
        self.nodes = old
            .into_iter()
            .zip(keep.iter())
            .filter(|(_, &k)| k)
            .map(|(mut node, _)| {
                node.parent = node.parent.and_then(|p| remap.get(p));
                node.children = node.children.iter().filter_map(|&c| remap.get(c)).collect();
                node
            })
            .collect();
        remap
    }

    /// Verify cost consistency, acyclicity, reachability and edge bounds.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (i, node) in self.nodes.iter().enumerate() {
            match node.parent {
                None => {
                    if i != 0 {
                        return Err(format!("node {} has no parent but is not the root", i));
                    }
                    if node.path_length_from_root != 0.0 {
                        return Err(format!("root cost is {}", node.path_length_from_root));
                    }
                }
                Some(p) => {
                    let parent = self
                        .nodes
                        .get(p.0)
                        .ok_or_else(|| format!("node {} has dangling parent {}", i, p.0))?;
                    let edge = parent.position.distance(&node.position);
                    let expected = parent.path_length_from_root + edge;
                    if (node.path_length_from_root - expected).abs() > COST_EPS {
                        return Err(format!(
                            "node {} cost {} != parent cost + edge {}",
                            i, node.path_length_from_root, expected
                        ));
                    }
                    if edge > self.max_branch_length + COST_EPS {
                        return Err(format!("edge into node {} has length {}", i, edge));
                    }
                    if !parent.children.contains(&NodeId(i)) {
                        return Err(format!("node {} missing from children of {}", i, p.0));
                    }
                }
            }
            let mut current = node.parent;
            let mut steps = 0;
            while let Some(id) = current {
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(format!("cycle above node {}", i));
                }
                current = self.nodes[id.0].parent;
            }
            if i != 0 && self.trace(NodeId(i))[0] != NodeId(0) {
                return Err(format!("node {} is not reachable from the root", i));
            }
        }
        Ok(())
    }
}

/// Sample the field along `from -> to` every `resolution`; endpoint-only
/// checks always pass here.
pub(crate) fn edge_in_field<F>(field: &F, from: &Point2D, to: &Point2D, resolution: Option<f64>) -> bool
where
    F: FieldBounds + ?Sized,
{
    let step = match resolution {
        Some(step) => step,
        None => return true,
    };
    let length = from.distance(to);
    let n = (length / step).ceil() as usize;
    (1..n).all(|i| field.in_field(&from.lerp(to, i as f64 / n as f64)))
}
