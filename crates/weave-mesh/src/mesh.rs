//! Core cloth mesh type.
//!
//! Positions and UVs live in separate pools, as in the OBJ format:
//! a face names three position indices and three UV indices, so a
//! vertex on a UV seam can carry different UVs in different faces.

use serde::{Deserialize, Serialize};
use weave_math::{Vec2, Vec3};
use weave_types::constants::DEGENERATE_AREA_THRESHOLD;
use weave_types::{WeaveError, WeaveResult};

/// One triangular face: three position indices and three UV indices (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// Indices into [`ClothMesh::positions`].
    pub vertices: [u32; 3],
    /// Indices into [`ClothMesh::uvs`].
    pub uvs: [u32; 3],
}

impl Face {
    /// A face whose UV indices equal its vertex indices.
    pub fn shared(vertices: [u32; 3]) -> Self {
        Self {
            vertices,
            uvs: vertices,
        }
    }
}

/// A triangle mesh as consumed by the cloth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClothMesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Per-position normals. May be empty; see [`crate::normals`].
    pub normals: Vec<Vec3>,
    /// Triangles.
    pub faces: Vec<Face>,
}

impl ClothMesh {
    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the three positions of face `f`.
    #[inline]
    pub fn face_positions(&self, f: usize) -> [Vec3; 3] {
        let [a, b, c] = self.faces[f].vertices;
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Returns the three UVs of face `f`.
    #[inline]
    pub fn face_uvs(&self, f: usize) -> [Vec2; 3] {
        let [a, b, c] = self.faces[f].uvs;
        [self.uvs[a as usize], self.uvs[b as usize], self.uvs[c as usize]]
    }

    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_capacity),
            uvs: Vec::with_capacity(vertex_capacity),
            normals: Vec::with_capacity(vertex_capacity),
            faces: Vec::with_capacity(triangle_capacity),
        }
    }

    /// Surface area of the whole mesh.
    pub fn total_area(&self) -> f32 {
        (0..self.faces.len())
            .map(|f| {
                let [a, b, c] = self.face_positions(f);
                0.5 * (b - a).cross(c - a).length()
            })
            .sum()
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - At least one face
    /// - Position and UV indices are within bounds
    /// - No face repeats a vertex
    /// - No face has (near) zero area
    /// - All coordinates are finite
    /// - Normals, when present, match the position count
    pub fn validate(&self) -> WeaveResult<()> {
        if self.faces.is_empty() {
            return Err(WeaveError::InvalidMesh("Mesh has no faces".into()));
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(WeaveError::InvalidMesh(format!(
                "Normal count ({}) != vertex count ({})",
                self.normals.len(),
                self.positions.len()
            )));
        }
        if let Some(i) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(WeaveError::InvalidMesh(format!(
                "Vertex {i} has a non-finite coordinate"
            )));
        }
        if let Some(i) = self.uvs.iter().position(|uv| !uv.is_finite()) {
            return Err(WeaveError::InvalidMesh(format!(
                "UV {i} has a non-finite coordinate"
            )));
        }

        let n = self.positions.len();
        let n_uv = self.uvs.len();
        for (t, face) in self.faces.iter().enumerate() {
            for &idx in &face.vertices {
                if idx as usize >= n {
                    return Err(WeaveError::InvalidMesh(format!(
                        "Face {t} references vertex {idx} (vertex count: {n})"
                    )));
                }
            }
            for &idx in &face.uvs {
                if idx as usize >= n_uv {
                    return Err(WeaveError::InvalidMesh(format!(
                        "Face {t} references UV {idx} (UV count: {n_uv})"
                    )));
                }
            }

            let [a, b, c] = face.vertices;
            if a == b || b == c || a == c {
                return Err(WeaveError::InvalidMesh(format!(
                    "Face {t} has repeated vertex indices: [{a}, {b}, {c}]"
                )));
            }

            let [pa, pb, pc] = self.face_positions(t);
            let area = 0.5 * (pb - pa).cross(pc - pa).length();
            if area < DEGENERATE_AREA_THRESHOLD {
                return Err(WeaveError::InvalidMesh(format!(
                    "Face {t} is degenerate (area {area:.3e})"
                )));
            }
        }

        Ok(())
    }
}
