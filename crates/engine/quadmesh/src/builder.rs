//! Bottom-up forest construction from a uniform grid
//!
//! The fine cells become leaves. Parents are synthesised by repeatedly halving
//! the index range (rounding up) and grouping up to four index-adjacent
//! children, until both axis extents reach one. Grids whose sides are not
//! powers of two produce "glue" parents with fewer than four children; such
//! parents are never merge candidates.
//!
//! Levels are first assigned on a placeholder scale that decreases towards
//! the root, then shifted so the root sits at level 0.

use crate::core::{Forest, NodeId, Quadrant};
use crate::error::{MeshError, Result};
use crate::grid::GridSpec;
use glam::DVec2;

/// Raw level given to the fine cells before the final shift
const PLACEHOLDER_LEVEL: i64 = 1 << 20;

/// Build the forest whose leaves reproduce `grid` exactly
pub fn build_forest(grid: &GridSpec) -> Result<Forest> {
    grid.validate()?;

    let h = grid.cell_edge();
    let mut forest = Forest::new(grid.bounds(), h);
    let mut raw_levels: Vec<i64> = Vec::with_capacity(grid.cell_count() * 4 / 3 + 1);

    // Row-major layer of the current level: index = j * width + i
    let mut layer: Vec<NodeId> = Vec::with_capacity(grid.cell_count());
    for j in 0..grid.ny {
        for i in 0..grid.nx {
            layer.push(forest.push_node(grid.cell_center(i, j), h, 0));
            raw_levels.push(PLACEHOLDER_LEVEL);
        }
    }

    let (mut width, mut height) = (grid.nx, grid.ny);
    let mut size = h;
    let mut raw = PLACEHOLDER_LEVEL;

    while width > 1 || height > 1 {
        let (parent_width, parent_height) = (width.div_ceil(2), height.div_ceil(2));
        let parent_size = size * 2.0;
        raw -= 1;

        let mut parents = Vec::with_capacity(parent_width * parent_height);
        for pj in 0..parent_height {
            for pi in 0..parent_width {
                let center = grid.origin
                    + DVec2::new(
                        (pi as f64 + 0.5) * parent_size,
                        (pj as f64 + 0.5) * parent_size,
                    );
                let parent = forest.push_node(center, parent_size, 0);
                raw_levels.push(raw);

                for q in Quadrant::ALL {
                    let (ci, cj) = (2 * pi + q.dx(), 2 * pj + q.dy());
                    if ci < width && cj < height {
                        forest.adopt(parent, layer[cj * width + ci]);
                    }
                }
                parents.push(parent);
            }
        }

        tracing::trace!(
            "Grouped {}x{} nodes into {}x{} parents",
            width,
            height,
            parent_width,
            parent_height
        );
        layer = parents;
        width = parent_width;
        height = parent_height;
        size = parent_size;
    }

    if forest.is_empty() || layer.is_empty() {
        return Err(MeshError::EmptyForest);
    }

    for (node, raw_level) in forest.nodes_mut().zip(raw_levels) {
        node.level = (raw_level - raw).unsigned_abs() as u32;
    }
    forest.set_roots(layer);

    tracing::debug!(
        "Built forest for {}x{} grid: {} nodes, {} root(s), max level {}",
        grid.nx,
        grid.ny,
        forest.len(),
        forest.roots().len(),
        forest.max_level().unwrap_or(0)
    );
    Ok(forest)
}
