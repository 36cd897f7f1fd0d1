//! 2:1 balance enforcement
//!
//! A FIFO worklist holds leaves whose neighbourhood must be checked. Each leaf
//! probes just past the middle of each of its faces; when the leaf found there
//! is two or more levels coarser it is split and its children are queued.
//! Balancing only ever splits, so coarsening decisions are refined, never
//! undone.

use crate::core::{Face, Forest, NodeId};
use crate::error::Result;
use std::collections::{HashSet, VecDeque};

/// Default cap on the number of splits before balancing gives up
pub const DEFAULT_MAX_SPLITS: usize = 500_000;

/// Probe distance from the cell center, in half cell sizes. Overshooting the
/// face keeps the probe off the shared edge.
const PROBE_OVERSHOOT: f64 = 1.2;

/// Summary of one balancing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceReport {
    pub splits: usize,
    /// Active leaves popped from the worklist and checked
    pub visited: usize,
    /// False when the split cap stopped the run early
    pub converged: bool,
}

/// Balance the whole forest, seeding the worklist with every active leaf
pub fn balance(forest: &mut Forest, max_splits: usize) -> Result<BalanceReport> {
    let seeds = forest.active_leaves();
    balance_from(forest, seeds, max_splits)
}

/// Balance starting from the given leaves. New children are queued as they
/// are created, so the result is balanced everywhere the seeds can reach.
pub fn balance_from<I>(forest: &mut Forest, seeds: I, max_splits: usize) -> Result<BalanceReport>
where
    I: IntoIterator<Item = NodeId>,
{
    let mut queue = VecDeque::new();
    let mut queued = HashSet::new();
    for id in seeds {
        if queued.insert(id) {
            queue.push_back(id);
        }
    }

    let domain = forest.domain();
    let mut report = BalanceReport {
        converged: true,
        ..Default::default()
    };

    while let Some(id) = queue.pop_front() {
        queued.remove(&id);
        if !forest.is_active_leaf(id) {
            continue;
        }
        report.visited += 1;

        let (center, size, level) = {
            let node = forest.node(id);
            (node.center, node.size, node.level)
        };

        for face in Face::ALL {
            let probe = center + face.normal() * (size * 0.5 * PROBE_OVERSHOOT);
            if !domain.contains(probe) {
                continue;
            }

            // Re-probe after every split until this face is graded
            while let Some(neighbor) = forest.locate_leaf(probe) {
                let n = forest.node(neighbor);
                if !n.is_leaf() || level < n.level + 2 {
                    break;
                }
                if report.splits >= max_splits {
                    tracing::warn!(
                        "Balancing stopped after {} splits, {} leaves still queued; mesh may not be 2:1 graded",
                        report.splits,
                        queue.len()
                    );
                    report.converged = false;
                    return Ok(report);
                }

                tracing::trace!(
                    "Splitting node {} (level {}) next to node {} (level {})",
                    neighbor,
                    n.level,
                    id,
                    level
                );
                for child in forest.split(neighbor)? {
                    if queued.insert(child) {
                        queue.push_back(child);
                    }
                }
                report.splits += 1;
            }
        }
    }

    tracing::debug!(
        "Balancing visited {} leaves and made {} splits",
        report.visited,
        report.splits
    );
    Ok(report)
}

/// Face-adjacent leaf pairs `(fine, coarse)` whose levels differ by more than one
pub fn find_violations(forest: &Forest) -> Vec<(NodeId, NodeId)> {
    let domain = forest.domain();
    let mut violations = Vec::new();
    for id in forest.active_leaves() {
        let node = forest.node(id);
        for face in Face::ALL {
            let probe = node.center + face.normal() * (node.size * 0.5 * PROBE_OVERSHOOT);
            if !domain.contains(probe) {
                continue;
            }
            if let Some(neighbor) = forest.locate_leaf(probe) {
                if node.level >= forest.node(neighbor).level + 2 {
                    violations.push((id, neighbor));
                }
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_forest;
    use crate::grid::GridSpec;
    use glam::DVec2;

    /// Unit square split down to level 3 in the south-west corner only
    fn corner_refined() -> Forest {
        let mut forest = build_forest(&GridSpec::unit_square(1, 1)).unwrap();
        let root = forest.roots()[0];
        let level1 = forest.split(root).unwrap();
        let level2 = forest.split(level1[0]).unwrap();
        forest.split(level2[3]).unwrap();
        forest
    }

    #[test]
    fn test_detects_and_fixes_violation() {
        let mut forest = corner_refined();
        assert!(!find_violations(&forest).is_empty());

        let report = balance(&mut forest, DEFAULT_MAX_SPLITS).unwrap();
        assert!(report.converged);
        assert_eq!(report.splits, 2);
        assert!(find_violations(&forest).is_empty());
    }

    #[test]
    fn test_balanced_forest_is_untouched() {
        let mut forest = build_forest(&GridSpec::unit_square(4, 4)).unwrap();
        let before = forest.len();
        let report = balance(&mut forest, DEFAULT_MAX_SPLITS).unwrap();
        assert_eq!(report.splits, 0);
        assert_eq!(report.visited, 16);
        assert_eq!(forest.len(), before);
    }

    #[test]
    fn test_split_cap_reports_non_convergence() {
        let mut forest = corner_refined();
        let report = balance(&mut forest, 1).unwrap();
        assert!(!report.converged);
        assert_eq!(report.splits, 1);
    }

    #[test]
    fn test_deep_refinement_ripples() {
        let mut forest = build_forest(&GridSpec::unit_square(1, 1)).unwrap();
        // Refine towards the domain center: south-west once, then north-east
        let mut id = forest.split(forest.roots()[0]).unwrap()[0];
        for _ in 0..5 {
            id = forest.split(id).unwrap()[3];
        }
        let report = balance(&mut forest, DEFAULT_MAX_SPLITS).unwrap();
        assert!(report.converged);
        assert!(report.splits > 4);
        assert!(find_violations(&forest).is_empty());

        let finest = forest.locate_leaf(DVec2::splat(0.499)).unwrap();
        assert_eq!(forest.node(finest).level, 6);
    }
}
