//! Uniform grid descriptor that seeds the forest

use crate::core::Aabb2;
use crate::error::{MeshError, Result};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Relative tolerance when comparing the two axis cell sizes
const SQUARE_TOLERANCE: f64 = 1e-12;

/// Axis-aligned grid of `nx * ny` square cells starting at `origin`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub origin: DVec2,
    /// Cell edge length along x and y (must be equal)
    pub cell_size: DVec2,
    pub nx: usize,
    pub ny: usize,
}

impl GridSpec {
    pub fn new(origin: DVec2, cell_size: DVec2, nx: usize, ny: usize) -> Self {
        Self {
            origin,
            cell_size,
            nx,
            ny,
        }
    }

    /// Grid partitioning the unit square into `nx * ny` cells
    pub fn unit_square(nx: usize, ny: usize) -> Self {
        let cell_size = DVec2::new(1.0 / nx.max(1) as f64, 1.0 / ny.max(1) as f64);
        Self::new(DVec2::ZERO, cell_size, nx, ny)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(MeshError::EmptyGrid {
                nx: self.nx,
                ny: self.ny,
            });
        }
        for size in [self.cell_size.x, self.cell_size.y] {
            if !size.is_finite() || size <= 0.0 {
                return Err(MeshError::InvalidCellSize(size));
            }
        }
        let (dx, dy) = (self.cell_size.x, self.cell_size.y);
        if (dx - dy).abs() > SQUARE_TOLERANCE * dx.max(dy) {
            return Err(MeshError::NonSquareCells { dx, dy });
        }
        Ok(())
    }

    /// Edge length of one (square) cell
    pub fn cell_edge(&self) -> f64 {
        self.cell_size.x
    }

    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    /// Center of fine cell `(i, j)`
    pub fn cell_center(&self, i: usize, j: usize) -> DVec2 {
        let h = self.cell_edge();
        self.origin + DVec2::new((i as f64 + 0.5) * h, (j as f64 + 0.5) * h)
    }

    /// Region covered by the grid
    pub fn bounds(&self) -> Aabb2 {
        let h = self.cell_edge();
        Aabb2::new(
            self.origin,
            self.origin + DVec2::new(self.nx as f64 * h, self.ny as f64 * h),
        )
    }
}
