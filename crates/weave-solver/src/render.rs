//! Renderable vertex buffers.
//!
//! Every triangle emits its own three vertices (no sharing), each with a
//! smoothed normal and the triangle's UV for that corner.

use serde::{Deserialize, Serialize};
use weave_math::{Vec2, Vec3};
use weave_mesh::normals::vertex_normals;
use weave_mesh::Face;

use crate::triangle::Triangle;

/// Floats per vertex in [`flatten`]'s output: position, normal, uv.
pub const FLOATS_PER_VERTEX: usize = 8;

/// One vertex of the render buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Build the buffer from the triangles' cached positions.
pub fn render_vertices(triangles: &[Triangle], point_count: usize) -> Vec<RenderVertex> {
    let mut positions = vec![Vec3::ZERO; point_count];
    let faces: Vec<Face> = triangles
        .iter()
        .map(|tri| {
            for (id, v) in tri.points.iter().zip(tri.vertices()) {
                positions[id.index()] = *v;
            }
            Face::shared(tri.points.map(|id| id.0))
        })
        .collect();
    let normals = vertex_normals(&positions, &faces);

    let mut out = Vec::with_capacity(triangles.len() * 3);
    for tri in triangles {
        for k in 0..3 {
            let id = tri.points[k].index();
            out.push(RenderVertex {
                position: tri.vertices()[k],
                normal: normals[id],
                uv: tri.uvs()[k],
            });
        }
    }
    out
}

/// Interleave into `[px, py, pz, nx, ny, nz, u, v]` per vertex.
pub fn flatten(vertices: &[RenderVertex]) -> Vec<f32> {
    let mut out = Vec::with_capacity(vertices.len() * FLOATS_PER_VERTEX);
    for v in vertices {
        out.extend_from_slice(&v.position.to_array());
        out.extend_from_slice(&v.normal.to_array());
        out.extend_from_slice(&v.uv.to_array());
    }
    out
}
