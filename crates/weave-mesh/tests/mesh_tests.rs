//! Integration tests for weave-mesh.

use std::io::Cursor;

use weave_math::{Vec2, Vec3};
use weave_mesh::generators::{quad_grid, GridLayout, GridPlane};
use weave_mesh::normals::compute_vertex_normals;
use weave_mesh::obj::{read_obj, write_obj};
use weave_mesh::{ClothMesh, Face};
use weave_types::WeaveError;

// ─── ClothMesh Tests ──────────────────────────────────────────

fn make_single_triangle() -> ClothMesh {
    ClothMesh {
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        uvs: vec![Vec2::ZERO, Vec2::X, Vec2::Y],
        normals: Vec::new(),
        faces: vec![Face::shared([0, 1, 2])],
    }
}

#[test]
fn basic_counts() {
    let mesh = make_single_triangle();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);
    assert!((mesh.total_area() - 0.5).abs() < 1e-6);
}

#[test]
fn validate_ok() {
    assert!(make_single_triangle().validate().is_ok());
}

#[test]
fn validate_catches_oob_vertex() {
    let mut mesh = make_single_triangle();
    mesh.faces[0].vertices[2] = 7;
    assert!(matches!(mesh.validate(), Err(WeaveError::InvalidMesh(_))));
}

#[test]
fn validate_catches_oob_uv() {
    let mut mesh = make_single_triangle();
    mesh.faces[0].uvs[1] = 3;
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_degenerate() {
    let mut mesh = make_single_triangle();
    mesh.positions[2] = Vec3::new(2.0, 0.0, 0.0);
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_repeated_vertex() {
    let mut mesh = make_single_triangle();
    mesh.faces[0].vertices = [0, 1, 1];
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_nan() {
    let mut mesh = make_single_triangle();
    mesh.positions[0].x = f32::NAN;
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_rejects_empty() {
    assert!(ClothMesh::default().validate().is_err());
}

// ─── Generator Tests ──────────────────────────────────────────

#[test]
fn quad_grid_counts() {
    let mesh = quad_grid(4, 3, 2.0, 1.5, GridPlane::XZ);
    assert_eq!(mesh.vertex_count(), 20);
    assert_eq!(mesh.triangle_count(), 24);
    assert!(mesh.validate().is_ok());
}

#[test]
fn quad_grid_area_matches_extent() {
    let mesh = quad_grid(5, 5, 1.0, 0.5, GridPlane::XY);
    assert!((mesh.total_area() - 0.5).abs() < 1e-5);
}

#[test]
fn quad_grid_planes() {
    let xz = quad_grid(2, 2, 1.0, 1.0, GridPlane::XZ);
    assert!(xz.positions.iter().all(|p| p.y == 0.0));
    let xy = quad_grid(2, 2, 1.0, 1.0, GridPlane::XY);
    assert!(xy.positions.iter().all(|p| p.z == 0.0));
}

#[test]
fn quad_grid_uvs_match_in_plane_coordinates() {
    let mesh = quad_grid(3, 2, 1.0, 1.0, GridPlane::XZ);
    for (p, uv) in mesh.positions.iter().zip(&mesh.uvs) {
        assert_eq!(uv.x, p.x);
        assert_eq!(uv.y, p.z);
    }
}

#[test]
fn grid_layout_corners_and_edges() {
    let layout = GridLayout { cols: 3, rows: 2 };
    assert_eq!(layout.corners(), [0, 3, 8, 11]);
    assert_eq!(layout.row(0), vec![0, 1, 2, 3]);
    assert_eq!(layout.column(3), vec![3, 7, 11]);
    assert_eq!(layout.vertex_count(), 12);
}

#[test]
fn grid_layout_corners_match_positions() {
    let mesh = quad_grid(4, 4, 2.0, 2.0, GridPlane::XY);
    let layout = GridLayout { cols: 4, rows: 4 };
    let [tl, tr, bl, br] = layout.corners();
    assert_eq!(mesh.positions[tl], Vec3::new(-1.0, 1.0, 0.0));
    assert_eq!(mesh.positions[tr], Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(mesh.positions[bl], Vec3::new(-1.0, -1.0, 0.0));
    assert_eq!(mesh.positions[br], Vec3::new(1.0, -1.0, 0.0));
}

// ─── Normal Tests ─────────────────────────────────────────────

#[test]
fn flat_grid_normals_are_consistent() {
    let mut mesh = quad_grid(3, 3, 1.0, 1.0, GridPlane::XZ);
    mesh.normals.clear();
    compute_vertex_normals(&mut mesh);
    let first = mesh.normals[0];
    assert!((first.length() - 1.0).abs() < 1e-5);
    assert!(first.y.abs() > 0.999);
    for n in &mesh.normals {
        assert!((*n - first).length() < 1e-5);
    }
}

// ─── OBJ Tests ────────────────────────────────────────────────

const QUAD_OBJ: &str = "\
# unit quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
s off
f 1/1 2/2 3/3
f 1/1 3/3 4/4
";

#[test]
fn obj_reads_quad() {
    let mesh = read_obj(Cursor::new(QUAD_OBJ)).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.uvs.len(), 4);
    assert_eq!(mesh.faces[1].vertices, [0, 2, 3]);
    assert_eq!(mesh.faces[1].uvs, [0, 2, 3]);
    assert!(mesh.normals.is_empty());
}

#[test]
fn obj_accepts_normals_and_negative_indices() {
    let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\n\
               vn 0 0 1\nvn 0 0 1\nvn 0 0 1\nf -3/-3/1 -2/-2/2 -1/-1/3\n";
    let mesh = read_obj(Cursor::new(src)).unwrap();
    assert_eq!(mesh.faces[0].vertices, [0, 1, 2]);
    assert_eq!(mesh.normals.len(), 3);
}

#[test]
fn obj_rejects_face_without_uv() {
    let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1 2 3\n";
    let err = read_obj(Cursor::new(src)).unwrap_err();
    assert!(matches!(err, WeaveError::Parse { line: 5, .. }));
}

#[test]
fn obj_rejects_quads() {
    let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/1 4/1\n";
    assert!(matches!(
        read_obj(Cursor::new(src)),
        Err(WeaveError::Parse { line: 6, .. })
    ));
}

#[test]
fn obj_rejects_zero_index() {
    let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 0/1 1/1 2/1\n";
    assert!(read_obj(Cursor::new(src)).is_err());
}

#[test]
fn obj_rejects_bad_number() {
    let src = "v 0 zero 0\n";
    assert!(matches!(
        read_obj(Cursor::new(src)),
        Err(WeaveError::Parse { line: 1, .. })
    ));
}

#[test]
fn obj_round_trip() {
    let mesh = quad_grid(3, 2, 1.0, 1.0, GridPlane::XZ);
    let mut buf = Vec::new();
    write_obj(&mesh, &mut buf).unwrap();

    let text = String::from_utf8(buf.clone()).unwrap();
    assert!(text.lines().any(|l| l.starts_with("f ") && l.contains('/')));

    let back = read_obj(Cursor::new(buf)).unwrap();
    assert_eq!(back.vertex_count(), mesh.vertex_count());
    assert_eq!(back.triangle_count(), mesh.triangle_count());
    for (a, b) in back.positions.iter().zip(&mesh.positions) {
        assert!((*a - *b).length() < 1e-6);
    }
    for (a, b) in back.faces.iter().zip(&mesh.faces) {
        assert_eq!(a, b);
    }
}

#[test]
fn mesh_serde_round_trip() {
    let mesh = make_single_triangle();
    let json = serde_json::to_string(&mesh).unwrap();
    let back: ClothMesh = serde_json::from_str(&json).unwrap();
    assert_eq!(back.faces, mesh.faces);
    assert_eq!(back.positions, mesh.positions);
}
