//! Axis-aligned cell geometry
//!
//! Every quadtree cell is a square described by its center and edge length.
//! Corner and face positions are always derived through [`corner_of`] and
//! [`Face::midpoint`] so that two cells computing the same point from the same
//! node get bit-identical coordinates.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Closed axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb2 {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Box of a square cell with the given center and edge length
    pub fn from_center_size(center: DVec2, size: f64) -> Self {
        let half = DVec2::splat(size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Closed containment test (points on the boundary are inside)
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn area(&self) -> f64 {
        let s = self.size();
        s.x * s.y
    }
}

/// Cell corners in counter-clockwise order starting at south-west
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    SouthWest,
    SouthEast,
    NorthEast,
    NorthWest,
}

impl Corner {
    /// Counter-clockwise boundary order
    pub const CCW: [Corner; 4] = [
        Corner::SouthWest,
        Corner::SouthEast,
        Corner::NorthEast,
        Corner::NorthWest,
    ];

    /// Sign of the offset from the cell center, (-1|+1, -1|+1)
    pub fn sign(self) -> DVec2 {
        match self {
            Corner::SouthWest => DVec2::new(-1.0, -1.0),
            Corner::SouthEast => DVec2::new(1.0, -1.0),
            Corner::NorthEast => DVec2::new(1.0, 1.0),
            Corner::NorthWest => DVec2::new(-1.0, 1.0),
        }
    }
}

/// Corner position of a square cell
#[inline]
pub fn corner_of(center: DVec2, size: f64, corner: Corner) -> DVec2 {
    center + corner.sign() * (size * 0.5)
}

/// The four cell faces, carrying the hanging-node bit of each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::North, Face::South, Face::East, Face::West];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Hanging-node mask bit: N=1, S=2, E=4, W=8
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Outward unit normal
    pub fn normal(self) -> DVec2 {
        match self {
            Face::North => DVec2::Y,
            Face::South => DVec2::NEG_Y,
            Face::East => DVec2::X,
            Face::West => DVec2::NEG_X,
        }
    }

    /// Unit vector along the face, pointing from its first to its second probe
    fn tangent(self) -> DVec2 {
        match self {
            Face::North | Face::South => DVec2::X,
            Face::East | Face::West => DVec2::Y,
        }
    }

    pub fn midpoint(self, center: DVec2, size: f64) -> DVec2 {
        center + self.normal() * (size * 0.5)
    }

    /// Two probe points just outside the face, straddling its midpoint.
    ///
    /// The first probe sits on the negative-tangent side (west of a horizontal
    /// face, south of a vertical one).
    pub fn probe_points(self, center: DVec2, size: f64, eps: f64) -> [DVec2; 2] {
        let across = self.midpoint(center, size) + self.normal() * eps;
        let along = self.tangent() * eps;
        [across - along, across + along]
    }

    /// Corner of the first-probed neighbour that coincides with this face's
    /// midpoint when that neighbour is finer.
    pub fn shared_corner(self) -> Corner {
        match self {
            Face::North => Corner::SouthEast,
            Face::South => Corner::NorthEast,
            Face::East => Corner::NorthWest,
            Face::West => Corner::NorthEast,
        }
    }
}
