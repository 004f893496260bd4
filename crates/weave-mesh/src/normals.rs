//! Vertex normal computation from triangle mesh data.
//!
//! Computes area-weighted vertex normals by accumulating
//! face normals from each adjacent triangle.

use weave_math::Vec3;

use crate::mesh::{ClothMesh, Face};

/// Area-weighted, re-normalized vertex normals.
///
/// Each face's unnormalized normal (magnitude = 2 × area) is accumulated at
/// its three vertices; the sums are then normalized. Vertices with no
/// usable contribution get a zero normal.
pub fn vertex_normals(positions: &[Vec3], faces: &[Face]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for face in faces {
        let [a, b, c] = face.vertices.map(|i| i as usize);
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }

    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

/// Recompute and store the normals of `mesh` in place.
pub fn compute_vertex_normals(mesh: &mut ClothMesh) {
    mesh.normals = vertex_normals(&mesh.positions, &mesh.faces);
}
