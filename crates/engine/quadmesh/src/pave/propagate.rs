//! Optional pre-paving refinement that removes odd hanging-node masks
//!
//! A leaf with one or three hanging nodes can only be paved with the triangle
//! fan. Splitting it aligns its children with the finer neighbours, and a
//! balancing pass from the new children restores 2:1 grading. Passes repeat
//! until every leaf has an even mask, so only the quad templates are used.

use super::detect_hanging_nodes;
use crate::balance::balance_from;
use crate::core::{Forest, NodeId};
use crate::error::Result;

/// Default cap on splits made by [`propagate_splits`], including the
/// balancing splits it triggers
pub const DEFAULT_MAX_PROPAGATION_SPLITS: usize = 100_000;

/// Summary of a split propagation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub passes: usize,
    pub splits: usize,
    pub converged: bool,
}

/// Split leaves with an odd number of hanging nodes until none remain
pub fn propagate_splits(forest: &mut Forest, max_splits: usize) -> Result<PropagationReport> {
    let mut report = PropagationReport::default();

    loop {
        let odd: Vec<NodeId> = forest
            .active_leaves()
            .into_iter()
            .filter(|&leaf| detect_hanging_nodes(forest, leaf).count() % 2 == 1)
            .collect();
        if odd.is_empty() {
            report.converged = true;
            break;
        }
        report.passes += 1;
        tracing::trace!("Propagation pass {}: {} odd leaves", report.passes, odd.len());

        let mut children = Vec::with_capacity(odd.len() * 4);
        for leaf in odd {
            if report.splits >= max_splits {
                return Ok(capped(report));
            }
            if forest.is_active_leaf(leaf) {
                children.extend(forest.split(leaf)?);
                report.splits += 1;
            }
        }

        let balance = balance_from(forest, children, max_splits - report.splits)?;
        report.splits += balance.splits;
        if !balance.converged {
            return Ok(capped(report));
        }
    }

    tracing::debug!(
        "Split propagation finished after {} passes and {} splits",
        report.passes,
        report.splits
    );
    Ok(report)
}

fn capped(mut report: PropagationReport) -> PropagationReport {
    tracing::warn!(
        "Split propagation stopped after {} splits; odd hanging-node masks remain",
        report.splits
    );
    report.converged = false;
    report
}
