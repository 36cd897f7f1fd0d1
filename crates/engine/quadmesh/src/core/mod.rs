// Core quadtree data structures

pub mod forest;
pub mod geometry;
pub mod node;

// Re-export main types
pub use forest::Forest;
pub use geometry::{corner_of, Aabb2, Corner, Face};
pub use node::{Node, NodeId, Quadrant, Status};
