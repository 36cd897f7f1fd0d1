use super::geometry::{corner_of, Aabb2, Corner};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node identifier, starting at 1 and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32 + 1)
    }

    /// Position of the node in the forest registry (id - 1)
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Topological status of a leaf relative to the level-set interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Undefined,
    Interior,
    Exterior,
    Cut,
    Buffer,
}

impl Status {
    /// Only cells fully on one side of the interface may be merged
    pub fn is_mergeable(self) -> bool {
        matches!(self, Status::Interior | Status::Exterior)
    }
}

/// Child quadrant within a parent cell
///
/// Index bits encode the offset direction: bit 0 = x, bit 1 = y.
/// 0=SW (x-,y-)  1=SE (x+,y-)  2=NW (x-,y+)  3=NE (x+,y+)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    SouthWest = 0,
    SouthEast = 1,
    NorthWest = 2,
    NorthEast = 3,
}

impl Quadrant {
    /// Child order used by the builder and by splits
    pub const ALL: [Quadrant; 4] = [
        Quadrant::SouthWest,
        Quadrant::SouthEast,
        Quadrant::NorthWest,
        Quadrant::NorthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Grid offset (0 or 1) along x
    pub fn dx(self) -> usize {
        self.index() & 1
    }

    /// Grid offset (0 or 1) along y
    pub fn dy(self) -> usize {
        self.index() >> 1
    }

    /// Offset sign of the child center from the parent center
    pub fn sign(self) -> DVec2 {
        DVec2::new(
            if self.dx() == 1 { 1.0 } else { -1.0 },
            if self.dy() == 1 { 1.0 } else { -1.0 },
        )
    }
}

/// A quadtree cell stored in the forest arena
///
/// Parent and child links are ids into the same registry. A node is a leaf
/// when `children` is empty; a node that has been merged away into its parent
/// stays in the registry with `is_active == false`.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub center: DVec2,
    /// Edge length of the square cell
    pub size: f64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Depth, 0 at the roots
    pub level: u32,
    pub is_active: bool,
    pub status: Status,
}

impl Node {
    pub(crate) fn new(id: NodeId, center: DVec2, size: f64, level: u32) -> Self {
        Self {
            id,
            center,
            size,
            parent: None,
            children: Vec::new(),
            level,
            is_active: true,
            status: Status::Undefined,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn is_active_leaf(&self) -> bool {
        self.is_active && self.is_leaf()
    }

    pub fn bounds(&self) -> Aabb2 {
        Aabb2::from_center_size(self.center, self.size)
    }

    pub fn corner(&self, corner: Corner) -> DVec2 {
        corner_of(self.center, self.size, corner)
    }

    /// Corners in counter-clockwise order starting at south-west
    pub fn corners(&self) -> [DVec2; 4] {
        Corner::CCW.map(|c| self.corner(c))
    }
}
