//! Leaf classification against a level set
//!
//! Each active leaf samples the level set at its four corners. Sign changes
//! across the corners mark the cell as cut; otherwise the smallest corner
//! magnitude decides whether the cell lies within the buffer band. Interfaces
//! that curve within a single cell without changing corner signs are missed.

use crate::core::{Forest, Node, Status};
use crate::level_set::LevelSet;

/// Status of a cell from its corner values
pub fn classify_corners(values: [f64; 4], buffer_width: f64) -> Status {
    let inside = values.iter().filter(|&&v| v < 0.0).count();
    if inside != 0 && inside != values.len() {
        return Status::Cut;
    }

    let nearest = values.iter().fold(f64::INFINITY, |acc, v| acc.min(v.abs()));
    if nearest < buffer_width {
        Status::Buffer
    } else if inside > 0 {
        Status::Interior
    } else {
        Status::Exterior
    }
}

/// Status of a single node
pub fn classify_node<L: LevelSet + ?Sized>(node: &Node, level_set: &L, buffer_width: f64) -> Status {
    classify_corners(node.corners().map(|c| level_set.eval(c)), buffer_width)
}

/// Assign a status to every active leaf. Tree shape and activity are untouched.
pub fn classify<L: LevelSet + ?Sized>(forest: &mut Forest, level_set: &L, buffer_width: f64) {
    let mut counts = [0usize; 5];
    for id in forest.active_leaves() {
        let status = classify_node(forest.node(id), level_set, buffer_width);
        forest.node_mut(id).status = status;
        counts[status as usize] += 1;
    }
    tracing::debug!(
        "Classified leaves: {} interior, {} exterior, {} cut, {} buffer",
        counts[Status::Interior as usize],
        counts[Status::Exterior as usize],
        counts[Status::Cut as usize],
        counts[Status::Buffer as usize]
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_forest;
    use crate::grid::GridSpec;
    use crate::level_set::Circle;
    use glam::DVec2;

    #[test]
    fn test_classify_corners() {
        assert_eq!(classify_corners([-1.0, -1.0, -1.0, -1.0], 0.0), Status::Interior);
        assert_eq!(classify_corners([1.0, 2.0, 3.0, 4.0], 0.0), Status::Exterior);
        assert_eq!(classify_corners([-1.0, 2.0, 3.0, 4.0], 0.0), Status::Cut);
        assert_eq!(classify_corners([-1.0, 2.0, 3.0, 4.0], 100.0), Status::Cut);
        assert_eq!(classify_corners([0.5, 2.0, 3.0, 4.0], 1.0), Status::Buffer);
        assert_eq!(classify_corners([-0.5, -2.0, -3.0, -4.0], 1.0), Status::Buffer);
        assert_eq!(classify_corners([0.5, 2.0, 3.0, 4.0], 0.5), Status::Exterior);
    }

    #[test]
    fn test_zero_corner_is_outside() {
        assert_eq!(classify_corners([0.0, 1.0, 1.0, 1.0], 0.0), Status::Exterior);
        assert_eq!(classify_corners([0.0, -1.0, -1.0, -1.0], 0.0), Status::Cut);
    }

    #[test]
    fn test_classify_forest() {
        let mut forest = build_forest(&GridSpec::unit_square(8, 8)).unwrap();
        let circle = Circle::new(DVec2::splat(0.5), 0.3);
        classify(&mut forest, &circle, 0.0);

        for node in forest.nodes() {
            if node.is_leaf() {
                assert_ne!(node.status, Status::Undefined);
            } else {
                assert_eq!(node.status, Status::Undefined);
            }
        }
        let center = forest.locate_leaf(DVec2::new(0.49, 0.49)).unwrap();
        assert_eq!(forest.node(center).status, Status::Interior);
        let corner = forest.locate_leaf(DVec2::new(0.01, 0.01)).unwrap();
        assert_eq!(forest.node(corner).status, Status::Exterior);
        assert!(forest.nodes().iter().any(|n| n.status == Status::Cut));
    }
}
