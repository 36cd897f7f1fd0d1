//! Paving: conforming polygons for every active leaf
//!
//! Hanging nodes are found by dual probing. Two points are placed just across
//! each face, one on either side of its midpoint. If they land in different
//! leaves the neighbour is finer, and the hanging node is taken from the
//! corner of the first neighbour so both sides of the face use the very same
//! coordinate. The resulting mask selects a template from [`template`].
//!
//! Paving only reads the forest.

pub mod propagate;
pub mod template;

pub use propagate::{propagate_splits, PropagationReport, DEFAULT_MAX_PROPAGATION_SPLITS};
pub use template::{pave_cell, template, HangingNodes, Template, Vertex};

use crate::core::{Face, Forest, NodeId};
use crate::element::Element;

/// Probe offset from the face midpoint and from the face itself, relative to
/// the cell size
const PROBE_EPSILON: f64 = 1e-6;

/// Detect the hanging nodes on the four faces of `leaf`
pub fn detect_hanging_nodes(forest: &Forest, leaf: NodeId) -> HangingNodes {
    let node = forest.node(leaf);
    let domain = forest.domain();
    let eps = node.size * PROBE_EPSILON;

    let mut hanging = HangingNodes::default();
    for face in Face::ALL {
        let [first, second] = face.probe_points(node.center, node.size, eps);
        if !domain.contains(first) || !domain.contains(second) {
            continue;
        }
        let (Some(a), Some(b)) = (forest.locate_leaf(first), forest.locate_leaf(second)) else {
            continue;
        };
        if a != b {
            hanging.set(face, forest.node(a).corner(face.shared_corner()));
        }
    }
    hanging
}

/// Elements of a single leaf
pub fn pave_leaf(forest: &Forest, leaf: NodeId) -> Vec<Element> {
    let node = forest.node(leaf);
    let hanging = detect_hanging_nodes(forest, leaf);
    pave_cell(node.center, node.size, &hanging)
        .into_iter()
        .map(|vertices| Element {
            leaf,
            vertices,
            status: node.status,
            mask: hanging.mask,
        })
        .collect()
}

/// Elements of every active leaf, in leaf id order
pub fn pave(forest: &Forest) -> Vec<Element> {
    let leaves = forest.active_leaves();
    let mut elements = Vec::with_capacity(leaves.len());
    let mut histogram = [0usize; 16];
    for leaf in leaves {
        let leaf_elements = pave_leaf(forest, leaf);
        if let Some(first) = leaf_elements.first() {
            histogram[first.mask as usize] += 1;
        }
        elements.extend(leaf_elements);
    }

    tracing::debug!(
        "Paved {} elements; {} leaves without hanging nodes, {} using the triangle fan",
        elements.len(),
        histogram[0],
        histogram
            .iter()
            .enumerate()
            .filter(|(mask, _)| template(*mask as u8) == Template::Fan)
            .map(|(_, count)| count)
            .sum::<usize>()
    );
    elements
}
