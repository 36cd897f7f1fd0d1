//! End-to-end meshing: build, classify, coarsen, balance, pave
//!
//! # Example
//!
//! ```
//! use quadmesh::{build_mesh, Circle, GridSpec, MeshConfig};
//! use quadmesh::glam::DVec2;
//!
//! let grid = GridSpec::unit_square(16, 16);
//! let circle = Circle::new(DVec2::splat(0.5), 0.25);
//! let mesh = build_mesh(&grid, &circle, &MeshConfig::default()).unwrap();
//!
//! assert!(mesh.stats.final_leaves < 256);
//! let map = mesh.fine_index_map();
//! assert_eq!(map.uncovered(), 0);
//! ```

use crate::balance::balance;
use crate::builder::build_forest;
use crate::classify::classify;
use crate::coarsen::{coarsen, verify_interface_resolution};
use crate::config::MeshConfig;
use crate::core::Forest;
use crate::element::{Element, ElementKind};
use crate::error::Result;
use crate::grid::GridSpec;
use crate::index_map::FineIndexMap;
use crate::level_set::LevelSet;
use crate::mesh::PolyMesh;
use crate::pave::{pave, propagate_splits};
use serde::{Deserialize, Serialize};

/// Counters collected while meshing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshStats {
    pub fine_cells: usize,
    pub merges: usize,
    pub leaves_after_coarsening: usize,
    pub balance_splits: usize,
    pub propagation_splits: usize,
    pub final_leaves: usize,
    pub elements: usize,
    pub triangles: usize,
    pub quads: usize,
    /// False if a safety cap stopped balancing or split propagation early
    pub converged: bool,
}

/// Result of a meshing run
#[derive(Debug, Clone)]
pub struct QuadMesh {
    pub grid: GridSpec,
    pub forest: Forest,
    pub elements: Vec<Element>,
    pub stats: MeshStats,
    /// Weld distance for [`QuadMesh::to_poly_mesh`], taken from the config
    pub weld_tolerance: f64,
}

impl QuadMesh {
    /// Leaf id covering each fine grid cell
    pub fn fine_index_map(&self) -> FineIndexMap {
        FineIndexMap::build(&self.forest, &self.grid)
    }

    /// Indexed mesh with vertices welded within `weld_tolerance`
    pub fn to_poly_mesh(&self) -> Result<PolyMesh> {
        PolyMesh::from_elements(&self.elements, self.weld_tolerance)
    }
}

/// Reusable grid and configuration pair
#[derive(Debug, Clone)]
pub struct MeshPipeline {
    grid: GridSpec,
    config: MeshConfig,
}

impl MeshPipeline {
    pub fn new(grid: GridSpec, config: MeshConfig) -> Result<Self> {
        grid.validate()?;
        config.validate()?;
        Ok(Self { grid, config })
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Mesh the domain, coarsening away from the interface of `level_set`
    pub fn run<L: LevelSet + ?Sized>(&self, level_set: &L) -> Result<QuadMesh> {
        let mut forest = build_forest(&self.grid)?;
        let mut stats = MeshStats {
            fine_cells: self.grid.cell_count(),
            converged: true,
            ..Default::default()
        };

        classify(&mut forest, level_set, self.config.buffer_width);
        stats.merges = coarsen(&mut forest, self.config.max_coarsening_factor)?.merges;
        verify_interface_resolution(&forest)?;
        stats.leaves_after_coarsening = forest.leaf_count();

        self.finish(forest, stats)
    }

    /// Mesh the uniform grid without classification or coarsening
    pub fn run_uniform(&self) -> Result<QuadMesh> {
        let forest = build_forest(&self.grid)?;
        let stats = MeshStats {
            fine_cells: self.grid.cell_count(),
            leaves_after_coarsening: forest.leaf_count(),
            converged: true,
            ..Default::default()
        };
        self.finish(forest, stats)
    }

    fn finish(&self, mut forest: Forest, mut stats: MeshStats) -> Result<QuadMesh> {
        let balanced = balance(&mut forest, self.config.max_balance_splits)?;
        stats.balance_splits = balanced.splits;
        stats.converged &= balanced.converged;

        if self.config.propagate_splits {
            let propagated = propagate_splits(&mut forest, self.config.max_propagation_splits)?;
            stats.propagation_splits = propagated.splits;
            stats.converged &= propagated.converged;
        }

        let elements = pave(&forest);
        stats.final_leaves = forest.leaf_count();
        stats.elements = elements.len();
        stats.triangles = elements
            .iter()
            .filter(|e| e.kind() == ElementKind::Triangle)
            .count();
        stats.quads = elements
            .iter()
            .filter(|e| e.kind() == ElementKind::Quad)
            .count();

        tracing::info!(
            "Meshed {} fine cells into {} leaves and {} elements ({} quads, {} triangles)",
            stats.fine_cells,
            stats.final_leaves,
            stats.elements,
            stats.quads,
            stats.triangles
        );

        Ok(QuadMesh {
            grid: self.grid,
            forest,
            elements,
            stats,
            weld_tolerance: self.config.weld_tolerance,
        })
    }
}

/// Build an adaptive mesh of `grid` around the interface of `level_set`
pub fn build_mesh<L: LevelSet + ?Sized>(
    grid: &GridSpec,
    level_set: &L,
    config: &MeshConfig,
) -> Result<QuadMesh> {
    MeshPipeline::new(*grid, config.clone())?.run(level_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use glam::DVec2;

    #[test]
    fn test_rejects_invalid_config() {
        let config = MeshConfig {
            max_coarsening_factor: 3,
            ..Default::default()
        };
        assert!(matches!(
            MeshPipeline::new(GridSpec::unit_square(4, 4), config),
            Err(MeshError::InvalidCoarseningFactor(3))
        ));
    }

    #[test]
    fn test_weld_tolerance_comes_from_config() {
        let grid = GridSpec::unit_square(4, 4);
        let mesh = MeshPipeline::new(grid, MeshConfig::default())
            .unwrap()
            .run_uniform()
            .unwrap();
        let poly = mesh.to_poly_mesh().unwrap();
        assert_eq!(poly.vertices.len(), 25);
        assert_eq!(poly.cells.len(), 16);

        // A weld distance above the cell edge collapses neighbouring corners
        let config = MeshConfig {
            weld_tolerance: 0.3,
            ..Default::default()
        };
        let coarse = MeshPipeline::new(grid, config).unwrap().run_uniform().unwrap();
        assert_eq!(coarse.weld_tolerance, 0.3);
        assert!(matches!(
            coarse.to_poly_mesh(),
            Err(MeshError::DegeneratePolygon { .. })
        ));
    }

    #[test]
    fn test_stats_add_up() {
        let grid = GridSpec::unit_square(16, 16);
        let mesh = build_mesh(&grid, &|p: DVec2| p.y - 0.3, &MeshConfig::default()).unwrap();
        let stats = mesh.stats;
        assert!(stats.converged);
        assert_eq!(stats.fine_cells, 256);
        assert_eq!(stats.elements, mesh.elements.len());
        assert_eq!(stats.triangles + stats.quads, stats.elements);
        assert_eq!(stats.final_leaves, mesh.forest.leaf_count());
        assert_eq!(
            stats.final_leaves,
            stats.leaves_after_coarsening + 3 * stats.balance_splits
        );
    }
}
