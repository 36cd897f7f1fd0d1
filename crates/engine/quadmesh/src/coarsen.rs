//! Greedy bottom-up merging of homogeneous sibling quartets
//!
//! Levels are swept once from fine to coarse. A parent whose four children
//! are active leaves sharing an interior or exterior status absorbs them and
//! becomes a leaf itself, so it can be merged again one level up within the
//! same sweep. Merged parents never exceed `max_coarsening_factor` times the
//! finest cell size.

use crate::core::{Forest, NodeId, Status};
use crate::error::{MeshError, Result};

/// Relative slack when comparing cell sizes
const SIZE_TOLERANCE: f64 = 1e-9;

/// Summary of one coarsening pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoarsenReport {
    pub merges: usize,
    pub levels_visited: usize,
}

/// Number of levels a merged cell may rise above the finest level
pub fn depth_limit(max_coarsening_factor: u32) -> u32 {
    max_coarsening_factor.max(1).ilog2()
}

/// Merge homogeneous quartets, never forming cells larger than
/// `max_coarsening_factor` times the finest cell.
///
/// `max_coarsening_factor` is expected to be a power of two; other values
/// behave like the next lower power of two.
pub fn coarsen(forest: &mut Forest, max_coarsening_factor: u32) -> Result<CoarsenReport> {
    let max_level = forest.max_level().ok_or(MeshError::EmptyForest)?;
    let min_allowed_level = max_level.saturating_sub(depth_limit(max_coarsening_factor));

    let mut by_level: Vec<Vec<NodeId>> = vec![Vec::new(); max_level as usize + 1];
    for node in forest.nodes() {
        if !node.is_leaf() {
            by_level[node.level as usize].push(node.id);
        }
    }

    let mut report = CoarsenReport::default();
    for level in (min_allowed_level..max_level).rev() {
        report.levels_visited += 1;
        let mut merged_here = 0;
        for &parent in &by_level[level as usize] {
            if let Some(status) = mergeable_status(forest, parent) {
                merge_children(forest, parent, status);
                merged_here += 1;
            }
        }
        tracing::trace!("Level {}: merged {} quartets", level, merged_here);
        report.merges += merged_here;
    }

    tracing::debug!(
        "Coarsening (factor {}) merged {} quartets over {} levels, {} leaves remain",
        max_coarsening_factor,
        report.merges,
        report.levels_visited,
        forest.leaf_count()
    );
    Ok(report)
}

/// Shared status of `parent`'s children if they form a mergeable quartet
fn mergeable_status(forest: &Forest, parent: NodeId) -> Option<Status> {
    let node = forest.node(parent);
    if !node.is_active || node.children.len() != 4 {
        return None;
    }

    let first = forest.node(node.children[0]).status;
    if !first.is_mergeable() {
        return None;
    }
    node.children
        .iter()
        .map(|&c| forest.node(c))
        .all(|c| c.is_active_leaf() && c.status == first)
        .then_some(first)
}

fn merge_children(forest: &mut Forest, parent: NodeId, status: Status) {
    let children = std::mem::take(&mut forest.node_mut(parent).children);
    for child in children {
        forest.node_mut(child).is_active = false;
    }
    forest.node_mut(parent).status = status;
}

/// Check that no cut or buffer leaf is coarser than the finest grid cell
pub fn verify_interface_resolution(forest: &Forest) -> Result<()> {
    let finest = forest.finest_size();
    for node in forest.nodes() {
        if !node.is_active_leaf() || node.status.is_mergeable() || node.status == Status::Undefined
        {
            continue;
        }
        if node.size > finest * (1.0 + SIZE_TOLERANCE) {
            return Err(MeshError::UnresolvedInterface {
                id: node.id,
                status: node.status,
                size: node.size,
                finest,
            });
        }
    }
    Ok(())
}
