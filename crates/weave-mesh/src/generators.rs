//! Procedural mesh generators for scenarios and testing.
//!
//! These generators produce deterministic, resolution-configurable flat
//! grids with UVs matching the in-plane coordinates, so that an
//! axis-aligned parametrization preserves triangle areas.

use serde::{Deserialize, Serialize};
use weave_math::{Vec2, Vec3};

use crate::mesh::{ClothMesh, Face};

/// Plane a generated grid lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridPlane {
    /// Grid spans X and Y at Z = 0 (hangs vertically).
    XY,
    /// Grid spans X and Z at Y = 0 (lies horizontally).
    XZ,
}

/// Index bookkeeping for a `cols × rows` quad grid.
///
/// Vertex `(i, j)` (column `i`, row `j`) has index `j * (cols + 1) + i`;
/// row 0 is the "top" edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Number of quads along the first axis.
    pub cols: usize,
    /// Number of quads along the second axis.
    pub rows: usize,
}

impl GridLayout {
    /// Vertex index of column `i`, row `j`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * (self.cols + 1) + i
    }

    /// Total vertex count.
    pub fn vertex_count(&self) -> usize {
        (self.cols + 1) * (self.rows + 1)
    }

    /// The four corners: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [usize; 4] {
        [
            self.index(0, 0),
            self.index(self.cols, 0),
            self.index(0, self.rows),
            self.index(self.cols, self.rows),
        ]
    }

    /// All vertices of row `j`, left to right.
    pub fn row(&self, j: usize) -> Vec<usize> {
        (0..=self.cols).map(|i| self.index(i, j)).collect()
    }

    /// All vertices of column `i`, top to bottom.
    pub fn column(&self, i: usize) -> Vec<usize> {
        (0..=self.rows).map(|j| self.index(i, j)).collect()
    }
}

/// Generates a flat rectangular quad grid.
///
/// The grid spans `[-width/2, width/2]` along X and `[-height/2, height/2]`
/// along the second axis of `plane`, centered at the origin. UVs are the
/// in-plane coordinates, so `to_param` for the matching plane reproduces
/// them exactly.
///
/// # Example
/// ```
/// use weave_mesh::generators::{quad_grid, GridPlane};
/// let mesh = quad_grid(2, 2, 1.0, 1.0, GridPlane::XZ);
/// assert_eq!(mesh.vertex_count(), 9);  // 3×3 vertices
/// assert_eq!(mesh.triangle_count(), 8); // 2×2 quads × 2 tris each
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f32, height: f32, plane: GridPlane) -> ClothMesh {
    let layout = GridLayout { cols, rows };
    let mut mesh = ClothMesh::with_capacity(layout.vertex_count(), cols * rows * 2);

    let half_w = width / 2.0;
    let half_h = height / 2.0;

    for j in 0..=rows {
        for i in 0..=cols {
            let x = -half_w + width * i as f32 / cols as f32;
            let s = half_h - height * j as f32 / rows as f32; // Top to bottom

            let (position, normal) = match plane {
                GridPlane::XY => (Vec3::new(x, s, 0.0), Vec3::Z),
                GridPlane::XZ => (Vec3::new(x, 0.0, s), Vec3::Y),
            };
            mesh.positions.push(position);
            mesh.normals.push(normal);
            mesh.uvs.push(Vec2::new(x, s));
        }
    }

    for j in 0..rows {
        for i in 0..cols {
            let top_left = layout.index(i, j) as u32;
            let top_right = layout.index(i + 1, j) as u32;
            let bot_left = layout.index(i, j + 1) as u32;
            let bot_right = layout.index(i + 1, j + 1) as u32;

            mesh.faces.push(Face::shared([top_left, bot_left, top_right]));
            mesh.faces.push(Face::shared([top_right, bot_left, bot_right]));
        }
    }

    mesh
}
