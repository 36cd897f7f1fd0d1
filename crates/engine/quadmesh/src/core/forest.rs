//! Forest - the arena that owns every quadtree node of one meshing session
//!
//! Nodes are appended to a flat registry and never removed. Parent and child
//! links are [`NodeId`]s into the registry, so the tree can be mutated freely
//! without shared ownership. Coarsening deactivates nodes instead of deleting
//! them, which keeps every id valid for the lifetime of the forest.

use super::geometry::Aabb2;
use super::node::{Node, NodeId, Quadrant};
use crate::error::{MeshError, Result};
use glam::DVec2;

/// Registry of all nodes plus the current set of roots
#[derive(Debug, Clone)]
pub struct Forest {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    /// Extent of the meshed domain (may be smaller than the root boxes)
    domain: Aabb2,
    /// Edge length of the initial grid cells
    finest_size: f64,
}

impl Forest {
    pub fn new(domain: Aabb2, finest_size: f64) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            domain,
            finest_size,
        }
    }

    /// Append a parentless node and return its fresh id
    pub fn push_node(&mut self, center: DVec2, size: f64, level: u32) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node::new(id, center, size, level));
        id
    }

    /// Link `child` under `parent`
    pub(crate) fn adopt(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    pub(crate) fn set_roots(&mut self, roots: Vec<NodeId>) {
        self.roots = roots;
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Every node ever created, in id order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn domain(&self) -> Aabb2 {
        self.domain
    }

    pub fn finest_size(&self) -> f64 {
        self.finest_size
    }

    #[inline]
    pub fn is_active_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_active_leaf()
    }

    /// Ids of all active leaves, in id order
    pub fn active_leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_active_leaf())
            .map(|n| n.id)
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_active_leaf()).count()
    }

    /// Finest level present anywhere in the registry
    pub fn max_level(&self) -> Option<u32> {
        self.nodes.iter().map(|n| n.level).max()
    }

    /// Subdivide an active leaf into four children at half its size.
    ///
    /// Children are created in [`Quadrant::ALL`] order, offset by a quarter of
    /// the parent size from its center, and inherit the parent's status.
    pub fn split(&mut self, id: NodeId) -> Result<[NodeId; 4]> {
        let parent = self.node(id);
        if !parent.is_active_leaf() {
            return Err(MeshError::NotALeaf(id));
        }
        let (center, size, level, status) =
            (parent.center, parent.size, parent.level, parent.status);

        let child_size = size * 0.5;
        let offset = size * 0.25;
        let children = Quadrant::ALL.map(|q| {
            let child = self.push_node(center + q.sign() * offset, child_size, level + 1);
            self.node_mut(child).status = status;
            self.adopt(id, child);
            child
        });
        Ok(children)
    }

    /// Find the node containing `point` by descending from the roots.
    ///
    /// Returns `None` when no root box contains the point. The result is an
    /// active leaf except when the point lies on an internal boundary that no
    /// child box contains under rounding; then the deepest node reached is
    /// returned.
    pub fn locate_leaf(&self, point: DVec2) -> Option<NodeId> {
        let mut current = match self.roots.as_slice() {
            [root] if self.node(*root).bounds().contains(point) => *root,
            [_] => return None,
            roots => *roots
                .iter()
                .find(|&&r| self.node(r).bounds().contains(point))?,
        };

        loop {
            let node = self.node(current);
            if node.is_leaf() {
                return Some(current);
            }
            match node
                .children
                .iter()
                .find(|&&c| self.node(c).bounds().contains(point))
            {
                Some(&child) => current = child,
                None => {
                    tracing::warn!(
                        "Point ({}, {}) matched no child of node {}",
                        point.x,
                        point.y,
                        current
                    );
                    return Some(current);
                }
            }
        }
    }
}
