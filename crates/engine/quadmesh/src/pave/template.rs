//! Polygon templates for the 16 hanging-node configurations
//!
//! A leaf's mask has one bit per face carrying a hanging node (N=1, S=2, E=4,
//! W=8). Masks with an even number of bits tile the cell with quads; the odd
//! masks fall back to a triangle fan around the cell center.
//!
//! ```text
//!  NW ---- N ---- NE
//!   |             |
//!   W      C      E
//!   |             |
//!  SW ---- S ---- SE
//! ```

use crate::core::{corner_of, Corner, Face};
use glam::DVec2;

/// Symbolic template vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertex {
    Corner(Corner),
    Hanging(Face),
    /// Cell center, used as an interior Steiner point
    Center,
}

/// Polygon layout for one mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Counter-clockwise quads
    Quads(&'static [[Vertex; 4]]),
    /// Triangles from the center to each edge of the boundary ring
    Fan,
}

const SW: Vertex = Vertex::Corner(Corner::SouthWest);
const SE: Vertex = Vertex::Corner(Corner::SouthEast);
const NE: Vertex = Vertex::Corner(Corner::NorthEast);
const NW: Vertex = Vertex::Corner(Corner::NorthWest);
const N: Vertex = Vertex::Hanging(Face::North);
const S: Vertex = Vertex::Hanging(Face::South);
const E: Vertex = Vertex::Hanging(Face::East);
const W: Vertex = Vertex::Hanging(Face::West);
const C: Vertex = Vertex::Center;

const PLAIN: &[[Vertex; 4]] = &[[SW, SE, NE, NW]];
const NORTH_SOUTH: &[[Vertex; 4]] = &[[SW, S, N, NW], [S, SE, NE, N]];
const EAST_WEST: &[[Vertex; 4]] = &[[SW, SE, E, W], [W, E, NE, NW]];
const NORTH_EAST: &[[Vertex; 4]] = &[[C, N, NW, SW], [C, SW, SE, E], [C, E, NE, N]];
const SOUTH_EAST: &[[Vertex; 4]] = &[[C, S, SE, E], [C, E, NE, NW], [C, NW, SW, S]];
const NORTH_WEST: &[[Vertex; 4]] = &[[C, W, SW, SE], [C, SE, NE, N], [C, N, NW, W]];
const SOUTH_WEST: &[[Vertex; 4]] = &[[C, W, SW, S], [C, S, SE, NE], [C, NE, NW, W]];
const CROSS: &[[Vertex; 4]] = &[[SW, S, C, W], [S, SE, E, C], [C, E, NE, N], [W, C, N, NW]];

/// Template for a hanging-node mask; only the low four bits are used
pub const fn template(mask: u8) -> Template {
    match mask & 0xF {
        0 => Template::Quads(PLAIN),
        3 => Template::Quads(NORTH_SOUTH),
        12 => Template::Quads(EAST_WEST),
        5 => Template::Quads(NORTH_EAST),
        6 => Template::Quads(SOUTH_EAST),
        9 => Template::Quads(NORTH_WEST),
        10 => Template::Quads(SOUTH_WEST),
        15 => Template::Quads(CROSS),
        // 1, 2, 4, 8, 7, 11, 13, 14
        _ => Template::Fan,
    }
}

/// Hanging nodes found on the faces of one leaf
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HangingNodes {
    pub mask: u8,
    /// Hanging-node position per face, indexed by [`Face::index`]
    pub points: [Option<DVec2>; 4],
}

impl HangingNodes {
    pub fn set(&mut self, face: Face, point: DVec2) {
        self.mask |= face.bit();
        self.points[face.index()] = Some(point);
    }

    pub fn get(&self, face: Face) -> Option<DVec2> {
        self.points[face.index()]
    }

    /// Hanging nodes at the exact face midpoints for every bit of `mask`
    pub fn at_midpoints(center: DVec2, size: f64, mask: u8) -> Self {
        let mut nodes = Self::default();
        for face in Face::ALL {
            if mask & face.bit() != 0 {
                nodes.set(face, face.midpoint(center, size));
            }
        }
        nodes
    }

    pub fn count(&self) -> u32 {
        self.mask.count_ones()
    }
}

/// Split the square cell `(center, size)` into counter-clockwise polygons
/// that conform to `hanging`.
pub fn pave_cell(center: DVec2, size: f64, hanging: &HangingNodes) -> Vec<Vec<DVec2>> {
    let resolve = |v: Vertex| match v {
        Vertex::Corner(c) => corner_of(center, size, c),
        Vertex::Hanging(face) => hanging
            .get(face)
            .unwrap_or_else(|| face.midpoint(center, size)),
        Vertex::Center => center,
    };

    match template(hanging.mask) {
        Template::Quads(quads) => quads
            .iter()
            .map(|quad| quad.iter().map(|&v| resolve(v)).collect())
            .collect(),
        Template::Fan => {
            let ring = boundary_ring(hanging.mask);
            (0..ring.len())
                .map(|i| vec![center, resolve(ring[i]), resolve(ring[(i + 1) % ring.len()])])
                .collect()
        }
    }
}

/// Cell boundary walked counter-clockwise from SW, with each present hanging
/// node inserted between its two corners
fn boundary_ring(mask: u8) -> Vec<Vertex> {
    const WALK: [(Corner, Face); 4] = [
        (Corner::SouthWest, Face::South),
        (Corner::SouthEast, Face::East),
        (Corner::NorthEast, Face::North),
        (Corner::NorthWest, Face::West),
    ];
    let mut ring = Vec::with_capacity(8);
    for (corner, face) in WALK {
        ring.push(Vertex::Corner(corner));
        if mask & face.bit() != 0 {
            ring.push(Vertex::Hanging(face));
        }
    }
    ring
}
