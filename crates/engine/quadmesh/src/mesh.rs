//! Conversion of the element soup into an indexed polygon mesh
//!
//! Vertices closer than the weld tolerance are merged, so neighbouring
//! elements share vertex indices. Only triangles and quads are accepted.

use crate::core::NodeId;
use crate::element::{Element, ElementKind};
use crate::error::{MeshError, Result};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default distance under which two vertices are considered identical
pub const DEFAULT_WELD_TOLERANCE: f64 = 1e-10;

/// One cell of a [`PolyMesh`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshCell {
    pub leaf: NodeId,
    pub kind: ElementKind,
    /// Counter-clockwise indices into [`PolyMesh::vertices`]
    pub vertices: Vec<u32>,
}

/// Indexed mesh of triangles and quads with welded vertices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyMesh {
    pub vertices: Vec<DVec2>,
    pub cells: Vec<MeshCell>,
}

impl PolyMesh {
    pub fn from_elements(elements: &[Element], tolerance: f64) -> Result<Self> {
        let mut welder = VertexWelder::new(tolerance);
        let mut cells = Vec::with_capacity(elements.len());

        for element in elements {
            let kind = element.kind();
            if kind == ElementKind::Polygon {
                return Err(MeshError::UnsupportedTopology {
                    leaf: element.leaf,
                    count: element.vertices.len(),
                });
            }

            let vertices: Vec<u32> = element.vertices.iter().map(|&p| welder.insert(p)).collect();
            for (i, v) in vertices.iter().enumerate() {
                if vertices[i + 1..].contains(v) {
                    return Err(MeshError::DegeneratePolygon {
                        leaf: element.leaf,
                        vertex: *v,
                    });
                }
            }
            cells.push(MeshCell {
                leaf: element.leaf,
                kind,
                vertices,
            });
        }

        let mesh = Self {
            vertices: welder.vertices,
            cells,
        };
        tracing::debug!(
            "Welded {} elements into {} cells over {} vertices",
            elements.len(),
            mesh.cells.len(),
            mesh.vertices.len()
        );
        Ok(mesh)
    }

    /// Number of distinct undirected edges
    pub fn edge_count(&self) -> usize {
        self.edge_uses().len()
    }

    /// Edges used by exactly one cell (the domain outline in a watertight mesh)
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .edge_uses()
            .into_iter()
            .filter(|&(_, uses)| uses == 1)
            .map(|(edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    fn edge_uses(&self) -> HashMap<(u32, u32), usize> {
        let mut uses = HashMap::new();
        for cell in &self.cells {
            let n = cell.vertices.len();
            for i in 0..n {
                let (a, b) = (cell.vertices[i], cell.vertices[(i + 1) % n]);
                *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        uses
    }
}

/// Spatial hash that merges points within `tolerance`
struct VertexWelder {
    tolerance: f64,
    buckets: HashMap<(i64, i64), Vec<u32>>,
    vertices: Vec<DVec2>,
}

impl VertexWelder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(f64::MIN_POSITIVE),
            buckets: HashMap::new(),
            vertices: Vec::new(),
        }
    }

    fn key(&self, p: DVec2) -> (i64, i64) {
        (
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
        )
    }

    fn insert(&mut self, p: DVec2) -> u32 {
        let (kx, ky) = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.buckets.get(&(kx + dx, ky + dy)) {
                    if let Some(&found) = bucket
                        .iter()
                        .find(|&&v| self.vertices[v as usize].distance(p) <= self.tolerance)
                    {
                        return found;
                    }
                }
            }
        }

        let index = self.vertices.len() as u32;
        self.vertices.push(p);
        self.buckets.entry((kx, ky)).or_default().push(index);
        index
    }
}
