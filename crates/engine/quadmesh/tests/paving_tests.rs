//! Paving: template coverage, hanging-node agreement and watertightness


use quadmesh::pave::pave_leaf;
use quadmesh::{
    build_mesh, detect_hanging_nodes, pave, Corner, ElementKind, Face, GridSpec, MeshConfig,
};
use test_shapes::*;

const FACE_CORNERS: [(Face, Corner); 4] = [
    (Face::North, Corner::SouthEast),
    (Face::South, Corner::NorthEast),
    (Face::East, Corner::NorthWest),
    (Face::West, Corner::NorthEast),
];

#[test]
fn test_every_mask_partitions_its_leaf() {
    for mask in 0u8..16 {
        let (forest, target) = forest_with_mask(mask);
        let hanging = detect_hanging_nodes(&forest, target);
        assert_eq!(hanging.mask, mask, "detected mask for {:04b}", mask);

        let elements = pave_leaf(&forest, target);
        let size = forest.node(target).size;
        let area: f64 = elements.iter().map(|e| e.area()).sum();
        assert!(
            (area - size * size).abs() < TOLERANCE,
            "mask {:04b} covers {} instead of {}",
            mask,
            area,
            size * size
        );
        for element in &elements {
            assert!(element.area() > 0.0, "mask {:04b} has a flipped element", mask);
            assert_ne!(element.kind(), ElementKind::Polygon);
        }
    }
}

#[test]
fn test_even_masks_pave_with_quads_only() {
    for mask in [0u8, 3, 5, 6, 9, 10, 12, 15] {
        let (forest, target) = forest_with_mask(mask);
        let elements = pave_leaf(&forest, target);
        assert!(elements.iter().all(|e| e.kind() == ElementKind::Quad));
    }
    for mask in [1u8, 2, 4, 8, 7, 11, 13, 14] {
        let (forest, target) = forest_with_mask(mask);
        let elements = pave_leaf(&forest, target);
        assert_eq!(elements.len(), 4 + mask.count_ones() as usize);
        assert!(elements.iter().all(|e| e.kind() == ElementKind::Triangle));
    }
}

#[test]
fn test_hanging_nodes_match_neighbour_corners_bitwise() {
    let (forest, target) = forest_with_mask(15);
    let node = forest.node(target);
    let hanging = detect_hanging_nodes(&forest, target);
    let elements = pave(&forest);

    for (face, corner) in FACE_CORNERS {
        let point = hanging.get(face).unwrap();
        let [first, _] = face.probe_points(node.center, node.size, node.size * 1e-6);
        let neighbour = forest.locate_leaf(first).unwrap();
        let expected = forest.node(neighbour).corner(corner);
        assert_eq!(point.x.to_bits(), expected.x.to_bits());
        assert_eq!(point.y.to_bits(), expected.y.to_bits());

        // The neighbour emits the exact same coordinate
        let shared = elements
            .iter()
            .filter(|e| e.leaf == neighbour)
            .flat_map(|e| e.vertices.iter())
            .any(|v| v.x.to_bits() == point.x.to_bits() && v.y.to_bits() == point.y.to_bits());
        assert!(shared, "{:?} hanging node not emitted by leaf {}", face, neighbour);
    }
}

#[test]
fn test_mesh_covers_domain() {
    let grid = GridSpec::unit_square(32, 32);
    let mesh = build_mesh(&grid, &offset_circle(), &MeshConfig::default()).unwrap();

    let total: f64 = mesh.elements.iter().map(|e| e.area()).sum();
    assert!((total - grid.bounds().area()).abs() < TOLERANCE);

    for (leaf, area) in area_by_leaf(&mesh.elements) {
        let size = mesh.forest.node(leaf).size;
        assert!((area - size * size).abs() < TOLERANCE, "leaf {}", leaf);
    }
}

#[test]
fn test_mesh_is_watertight() {
    let grid = GridSpec::unit_square(32, 32);
    let mesh = build_mesh(&grid, &offset_circle(), &MeshConfig::default()).unwrap();
    let poly = mesh.to_poly_mesh().unwrap();
    let domain = grid.bounds();

    for (a, b) in poly.boundary_edges() {
        let (pa, pb) = (poly.vertices[a as usize], poly.vertices[b as usize]);
        let mid = (pa + pb) * 0.5;
        assert!(
            on_domain_boundary(&domain, mid),
            "open edge {:?} - {:?} inside the domain",
            pa,
            pb
        );
    }
}

#[test]
fn test_propagated_mesh_is_watertight_quads() {
    let config = MeshConfig {
        propagate_splits: true,
        ..Default::default()
    };
    let grid = GridSpec::unit_square(32, 32);
    let mesh = build_mesh(&grid, &centered_circle(), &config).unwrap();
    let poly = mesh.to_poly_mesh().unwrap();

    assert!(poly.cells.iter().all(|c| c.kind == ElementKind::Quad));
    let domain = grid.bounds();
    for (a, b) in poly.boundary_edges() {
        let mid = (poly.vertices[a as usize] + poly.vertices[b as usize]) * 0.5;
        assert!(on_domain_boundary(&domain, mid));
    }
}
