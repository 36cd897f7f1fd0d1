use crate::core::{NodeId, Status};
use thiserror::Error;

/// Errors raised while building or converting an adaptive quadtree mesh
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Grid must have at least one cell per axis, got {nx}x{ny}")]
    EmptyGrid { nx: usize, ny: usize },

    #[error("Invalid cell size {0}")]
    InvalidCellSize(f64),

    #[error("Grid cells must be square, got {dx} x {dy}")]
    NonSquareCells { dx: f64, dy: f64 },

    #[error("Forest contains no nodes")]
    EmptyForest,

    #[error("Max coarsening factor must be a power of two >= 1, got {0}")]
    InvalidCoarseningFactor(u32),

    #[error("Buffer width must be finite and non-negative, got {0}")]
    InvalidBufferWidth(f64),

    #[error("Node {0} is not an active leaf")]
    NotALeaf(NodeId),

    #[error("{status:?} leaf {id} has size {size}, larger than the finest cell size {finest}")]
    UnresolvedInterface {
        id: NodeId,
        status: Status,
        size: f64,
        finest: f64,
    },

    #[error("Element from leaf {leaf} has {count} vertices, expected 3 or 4")]
    UnsupportedTopology { leaf: NodeId, count: usize },

    #[error("Element from leaf {leaf} uses vertex {vertex} more than once")]
    DegeneratePolygon { leaf: NodeId, vertex: u32 },

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for meshing operations that may fail
pub type Result<T> = std::result::Result<T, MeshError>;
