//! Adaptive quadtree meshing around a level-set interface
//!
//! A uniform grid over a rectangular domain is assembled bottom-up into a
//! quadtree forest, classified against a level set, coarsened away from the
//! interface, graded to 2:1 and finally paved into conforming polygons.
//!
//! # Modules
//!
//! - [`core`]: node arena, cell geometry, split and point location
//! - [`builder`]: forest construction from a [`GridSpec`]
//! - [`classify`], [`coarsen`], [`balance`]: the tree stages
//! - [`pave`]: hanging-node detection and polygon templates
//! - [`pipeline`]: the whole chain behind [`build_mesh`]

pub mod balance;
pub mod builder;
pub mod classify;
pub mod coarsen;
pub mod config;
pub mod core;
pub mod element;
pub mod error;
pub mod grid;
pub mod index_map;
pub mod level_set;
pub mod mesh;
pub mod pave;
pub mod pipeline;

pub use balance::{balance, find_violations, BalanceReport};
pub use builder::build_forest;
pub use classify::classify;
pub use coarsen::{coarsen, verify_interface_resolution, CoarsenReport};
pub use config::MeshConfig;
pub use core::{Aabb2, Corner, Face, Forest, Node, NodeId, Quadrant, Status};
pub use element::{polygon_area, Element, ElementKind};
pub use error::{MeshError, Result};
pub use grid::GridSpec;
pub use index_map::FineIndexMap;
pub use level_set::{
    Circle, Complement, HalfPlane, Intersection, LevelSet, Rectangle, SampledField, Union,
};
pub use mesh::{MeshCell, PolyMesh};
pub use pave::{detect_hanging_nodes, pave, propagate_splits, HangingNodes, PropagationReport};
pub use pipeline::{build_mesh, MeshPipeline, MeshStats, QuadMesh};

// Re-export glam for convenience
pub use glam;
