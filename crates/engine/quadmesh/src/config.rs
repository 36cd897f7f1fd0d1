use crate::balance;
use crate::coarsen;
use crate::error::{MeshError, Result};
use crate::mesh::DEFAULT_WELD_TOLERANCE;
use crate::pave::DEFAULT_MAX_PROPAGATION_SPLITS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Meshing configuration, loadable from TOML
///
/// ```toml
/// max_coarsening_factor = 8
/// buffer_width = 0.02
/// propagate_splits = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Largest merged cell size as a multiple of the finest cell (power of two)
    pub max_coarsening_factor: u32,
    /// Uncut cells closer than this to the interface are never coarsened
    pub buffer_width: f64,
    /// Refine leaves with odd hanging-node masks before paving
    pub propagate_splits: bool,
    /// Safety cap on balancing splits
    pub max_balance_splits: usize,
    /// Safety cap on split propagation
    pub max_propagation_splits: usize,
    /// Vertex weld distance used when building an indexed mesh
    pub weld_tolerance: f64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_coarsening_factor: 8,
            buffer_width: 0.0,
            propagate_splits: false,
            max_balance_splits: balance::DEFAULT_MAX_SPLITS,
            max_propagation_splits: DEFAULT_MAX_PROPAGATION_SPLITS,
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
        }
    }
}

impl MeshConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_coarsening_factor.is_power_of_two() {
            return Err(MeshError::InvalidCoarseningFactor(
                self.max_coarsening_factor,
            ));
        }
        if !self.buffer_width.is_finite() || self.buffer_width < 0.0 {
            return Err(MeshError::InvalidBufferWidth(self.buffer_width));
        }
        Ok(())
    }

    /// Number of levels a merged cell may rise above the finest level
    pub fn depth_limit(&self) -> u32 {
        coarsen::depth_limit(self.max_coarsening_factor)
    }
}
