//! Cloth triangles and their rest-pose r-weights.
//!
//! ## Weft and warp directions
//!
//! A triangle with parametric coordinates `(u, v)` at its three vertices
//! has a linear map from parameter space to world space. Its columns
//!
//! ```text
//! U = ∂x/∂u = Σ ru_k · P_k      V = ∂x/∂v = Σ rv_k · P_k
//! ```
//!
//! are the weft and warp directions of the fabric. The r-weights `ru`, `rv`
//! depend only on the rest parametrization, so they are computed once and
//! every later step gets U and V with two dot products per axis.

use serde::{Deserialize, Serialize};
use weave_math::{Vec2, Vec3};
use weave_types::constants::DEGENERATE_AREA_THRESHOLD;
use weave_types::{PointId, WeaveError, WeaveResult};

/// Fixed-axis parametrizations: which two world axes become `(u, v)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamAxes {
    XY,
    XZ,
    YZ,
}

impl ParamAxes {
    /// Project a world position to parameter space.
    #[inline]
    pub fn project(self, p: Vec3) -> Vec2 {
        match self {
            ParamAxes::XY => Vec2::new(p.x, p.y),
            ParamAxes::XZ => Vec2::new(p.x, p.z),
            ParamAxes::YZ => Vec2::new(p.y, p.z),
        }
    }
}

/// One cloth triangle.
///
/// The vertex positions are a cache of the owning points' positions,
/// refreshed once per step; the points stay the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    /// The three points, counter-clockwise as loaded.
    pub points: [PointId; 3],
    vertices: [Vec3; 3],
    uvs: [Vec2; 3],
    area: f32,
    rest_area: f32,
    ru: Vec3,
    rv: Vec3,
}

impl Triangle {
    /// Build a triangle at its rest pose. r-weights are zero until
    /// [`compute_r`](Self::compute_r) runs.
    pub fn new(points: [PointId; 3], vertices: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        let area = surface_area(&vertices);
        Self {
            points,
            vertices,
            uvs,
            area,
            rest_area: area,
            ru: Vec3::ZERO,
            rv: Vec3::ZERO,
        }
    }

    /// Refresh the cached positions and the current surface area.
    pub fn set_vertices(&mut self, vertices: [Vec3; 3]) {
        self.vertices = vertices;
        self.area = surface_area(&vertices);
    }

    /// Compute r-weights from a parametrization of the rest pose.
    ///
    /// The parametrization must preserve triangle areas; the inverse uses
    /// the 3D rest area rather than the parametric one.
    pub fn compute_r<F>(&mut self, to_param: F) -> WeaveResult<()>
    where
        F: Fn(Vec3) -> Vec2,
    {
        if self.rest_area < DEGENERATE_AREA_THRESHOLD {
            return Err(WeaveError::InvalidMesh(format!(
                "Triangle {:?} is degenerate at rest (area {:.3e})",
                self.points.map(|p| p.0),
                self.rest_area
            )));
        }

        let [a, b, c] = self.vertices.map(&to_param);
        let inv_d = 1.0 / (2.0 * self.rest_area);
        self.ru = Vec3::new(b.y - c.y, c.y - a.y, a.y - b.y) * inv_d;
        self.rv = Vec3::new(c.x - b.x, a.x - c.x, b.x - a.x) * inv_d;
        Ok(())
    }

    /// [`compute_r`](Self::compute_r) with a fixed-axis projection.
    pub fn compute_r_axis(&mut self, axes: ParamAxes) -> WeaveResult<()> {
        self.compute_r(|p| axes.project(p))
    }

    /// Weft and warp directions for the given positions of this triangle's points.
    #[inline]
    pub fn weft_warp(&self, positions: &[Vec3; 3]) -> (Vec3, Vec3) {
        weft_warp(self.ru, self.rv, positions)
    }

    /// Cached vertex positions.
    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[Vec2; 3] {
        &self.uvs
    }

    /// Current surface area.
    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn rest_area(&self) -> f32 {
        self.rest_area
    }

    pub fn ru(&self) -> Vec3 {
        self.ru
    }

    pub fn rv(&self) -> Vec3 {
        self.rv
    }

    /// Unit face normal of the cached positions (zero if collapsed).
    pub fn normal(&self) -> Vec3 {
        let [a, b, c] = self.vertices;
        (b - a).cross(c - a).normalize_or_zero()
    }
}

/// `U = Σ ru_k P_k`, `V = Σ rv_k P_k`.
#[inline]
pub(crate) fn weft_warp(ru: Vec3, rv: Vec3, p: &[Vec3; 3]) -> (Vec3, Vec3) {
    let u = p[0] * ru.x + p[1] * ru.y + p[2] * ru.z;
    let v = p[0] * rv.x + p[1] * rv.y + p[2] * rv.z;
    (u, v)
}

fn surface_area(v: &[Vec3; 3]) -> f32 {
    0.5 * (v[1] - v[0]).cross(v[2] - v[0]).length()
}
