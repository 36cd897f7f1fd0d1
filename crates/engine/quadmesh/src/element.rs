use crate::core::{NodeId, Status};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Shape of an output polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Triangle,
    Quad,
    Polygon,
}

impl ElementKind {
    pub fn from_vertex_count(count: usize) -> Self {
        match count {
            3 => ElementKind::Triangle,
            4 => ElementKind::Quad,
            _ => ElementKind::Polygon,
        }
    }
}

/// Polygon emitted by the paver for one leaf
///
/// A leaf yields one to seven elements depending on the hanging nodes on its
/// faces. Vertices are counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Leaf the element was cut from
    pub leaf: NodeId,
    pub vertices: Vec<DVec2>,
    /// Status of the leaf, kept for colouring and debugging
    pub status: Status,
    /// Hanging-node mask of the leaf (N=1, S=2, E=4, W=8)
    pub mask: u8,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        ElementKind::from_vertex_count(self.vertices.len())
    }

    /// Signed area, positive for counter-clockwise vertices
    pub fn area(&self) -> f64 {
        polygon_area(&self.vertices)
    }
}

/// Signed shoelace area of a closed polygon
pub fn polygon_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_area_orientation() {
        let square = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
        ];
        assert_eq!(polygon_area(&square), 4.0);
        let mut reversed = square;
        reversed.reverse();
        assert_eq!(polygon_area(&reversed), -4.0);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_kind_from_vertex_count() {
        assert_eq!(ElementKind::from_vertex_count(3), ElementKind::Triangle);
        assert_eq!(ElementKind::from_vertex_count(4), ElementKind::Quad);
        assert_eq!(ElementKind::from_vertex_count(5), ElementKind::Polygon);
    }
}
