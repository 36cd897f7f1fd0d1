//! Fine-to-coarse index map
//!
//! For every cell of the initial fine grid, the id of the active leaf that
//! covers it. This is the piecewise-constant transfer between the fine grid
//! and the adaptive mesh.

use crate::core::{Forest, NodeId};
use crate::grid::GridSpec;
use serde::{Deserialize, Serialize};

/// Guard against boundary rounding when converting leaf bounds to indices,
/// in fine-cell units
const INDEX_EPSILON: f64 = 1e-9;

/// Row-major `nx * ny` map from fine cell `(i, j)` to covering leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineIndexMap {
    pub nx: usize,
    pub ny: usize,
    cells: Vec<Option<NodeId>>,
}

impl FineIndexMap {
    /// Stamp every active leaf over the fine cells it covers
    pub fn build(forest: &Forest, grid: &GridSpec) -> Self {
        let (nx, ny) = (grid.nx, grid.ny);
        let h = grid.cell_edge();
        let mut cells = vec![None; nx * ny];

        let to_range = |lo: f64, hi: f64, origin: f64, n: usize| {
            let start = ((lo - origin) / h + INDEX_EPSILON).floor().max(0.0) as usize;
            let end = ((hi - origin) / h - INDEX_EPSILON).ceil().max(0.0) as usize;
            start.min(n)..end.min(n)
        };

        for leaf in forest.active_leaves() {
            let bounds = forest.node(leaf).bounds();
            let columns = to_range(bounds.min.x, bounds.max.x, grid.origin.x, nx);
            for j in to_range(bounds.min.y, bounds.max.y, grid.origin.y, ny) {
                for i in columns.clone() {
                    cells[j * nx + i] = Some(leaf);
                }
            }
        }

        Self { nx, ny, cells }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<NodeId> {
        if i < self.nx && j < self.ny {
            self.cells[j * self.nx + i]
        } else {
            None
        }
    }

    /// Number of fine cells not covered by any leaf
    pub fn uncovered(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Rows of leaf ids (0 for uncovered cells), `j` major
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells
            .chunks(self.nx.max(1))
            .map(|row| row.iter().map(|c| c.map_or(0, NodeId::get)).collect())
            .collect()
    }
}
