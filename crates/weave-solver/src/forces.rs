//! Per-triangle internal forces and their position Jacobians, plus the
//! point-local external fields (gravity, air drag).
//!
//! ## Energy model
//!
//! With weft/warp directions `U`, `V` of a triangle (see
//! [`crate::triangle`]) the Green strains are
//!
//! ```text
//! ε_u = ½(U·U − 1)    ε_v = ½(V·V − 1)    ε_s = U·V
//! ```
//!
//! and, since `∂U/∂x_k = ru_k I`, the force on vertex `k` is
//!
//! ```text
//! f_k = −A (σ_u ru_k U + σ_v rv_k V + σ_s (ru_k V + rv_k U))
//! ```
//!
//! with `A` the rest area and `σ` read from the material curves.
//! Differentiating once more gives a linear term in `σ′` built from outer
//! products of `U` and `V` and a geometric term in `σ` along the identity.

use weave_material::{ClothMaterial, Strain, Stress};
use weave_math::{clean_scalar, outer, Mat3, Vec3};
use weave_types::constants::CLEAN_EPSILON;

use crate::mass_point::MassPoint;
use crate::triangle::{weft_warp, Triangle};

/// Forces of one triangle at one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleResponse {
    /// Weft/warp directions.
    pub u: Vec3,
    pub v: Vec3,
    /// Clamped strain the curves were evaluated at.
    pub strain: Strain,
    pub stress: Stress,
    /// Force on each of the three vertices.
    pub forces: [Vec3; 3],
}

/// `J[i][j] = ∂f_i/∂x_j` for the three vertices of a triangle.
pub type TriangleJacobian = [[Mat3; 3]; 3];

/// Green strain of directions `U`, `V`, with near-zero residue removed.
/// Not yet clamped.
pub fn green_strain(u: Vec3, v: Vec3) -> Strain {
    Strain {
        weft: clean_scalar(0.5 * (u.dot(u) - 1.0)),
        warp: clean_scalar(0.5 * (v.dot(v) - 1.0)),
        shear: clean_scalar(u.dot(v)),
    }
}

/// Evaluate one triangle with r-weights `ru`, `rv` and rest area `area`
/// at vertex positions `p`.
pub fn triangle_response(
    material: &ClothMaterial,
    ru: Vec3,
    rv: Vec3,
    area: f32,
    p: &[Vec3; 3],
) -> TriangleResponse {
    let (u, v) = weft_warp(ru, rv, p);
    let strain = material.clamp_strain(green_strain(u, v));
    let stress = material.stress(strain);

    let r_u = ru.to_array();
    let r_v = rv.to_array();
    let forces = std::array::from_fn(|k| {
        -area
            * (stress.weft * r_u[k] * u
                + stress.warp * r_v[k] * v
                + stress.shear * (r_u[k] * v + r_v[k] * u))
    });

    TriangleResponse {
        u,
        v,
        strain,
        stress,
        forces,
    }
}

/// Position Jacobian of [`triangle_response`]'s forces.
///
/// `σ′` is evaluated at the same clamped strain as `σ`. Under compression
/// weft and warp strain clamp to zero, so `σ` is flat there while `σ′(0)`
/// still enters the linear term. In compression this Jacobian is therefore
/// stiffer than the derivative of the force, which stays zero.
pub fn triangle_jacobian(
    material: &ClothMaterial,
    ru: Vec3,
    rv: Vec3,
    area: f32,
    response: &TriangleResponse,
) -> TriangleJacobian {
    let (u, v) = (response.u, response.v);
    let s = response.stress;
    let d = material.stress_prime(response.strain);

    let uu = outer(u, u);
    let vv = outer(v, v);
    let uv = outer(u, v);
    let vu = outer(v, u);

    let r_u = ru.to_array();
    let r_v = rv.to_array();

    std::array::from_fn(|i| {
        std::array::from_fn(|j| {
            let (ui, uj, vi, vj) = (r_u[i], r_u[j], r_v[i], r_v[j]);
            let linear = uu * (d.weft * ui * uj)
                + vv * (d.warp * vi * vj)
                + (vv * (ui * uj) + vu * (ui * vj) + uv * (vi * uj) + uu * (vi * vj)) * d.shear;
            let geometric = s.weft * ui * uj + s.warp * vi * vj + s.shear * (ui * vj + vi * uj);
            (linear + Mat3::from_diagonal(Vec3::splat(geometric))) * -area
        })
    })
}

/// `½ Σ σ ε`: elastic energy per unit rest area, trapezoid rule from zero.
pub fn energy_density(strain: Strain, stress: Stress) -> f32 {
    0.5 * (stress.weft * strain.weft + stress.warp * strain.warp + stress.shear * strain.shear)
}

/// Quadratic drag `−c|v|v` and its velocity Jacobian `−c(|v|I + v vᵀ/|v|)`.
///
/// Both are zero for a (nearly) resting point.
pub fn air_drag(velocity: Vec3, c: f32) -> (Vec3, Mat3) {
    let speed = velocity.length();
    if c == 0.0 || speed < CLEAN_EPSILON {
        return (Vec3::ZERO, Mat3::ZERO);
    }
    let force = -c * speed * velocity;
    let jacobian = (Mat3::from_diagonal(Vec3::splat(speed)) + outer(velocity, velocity) * (1.0 / speed)) * -c;
    (force, jacobian)
}

/// Accumulate every triangle's forces and position Jacobians into the
/// points, reading the triangles' cached vertex positions.
pub fn accumulate_internal(material: &ClothMaterial, triangles: &[Triangle], points: &mut [MassPoint]) {
    for tri in triangles {
        let response = triangle_response(material, tri.ru(), tri.rv(), tri.rest_area(), tri.vertices());
        let jacobian = triangle_jacobian(material, tri.ru(), tri.rv(), tri.rest_area(), &response);

        for (i, &pi) in tri.points.iter().enumerate() {
            let point = &mut points[pi.index()];
            point.add_force(response.forces[i]);
            for (j, &pj) in tri.points.iter().enumerate() {
                point.add_jpos(pj, jacobian[i][j]);
            }
        }
    }
}

/// Internal forces only, at arbitrary positions. Used by the explicit
/// integrator, which needs no Jacobians.
pub fn internal_forces(material: &ClothMaterial, triangles: &[Triangle], positions: &[Vec3], out: &mut [Vec3]) {
    for tri in triangles {
        let p = tri.points.map(|id| positions[id.index()]);
        let response = triangle_response(material, tri.ru(), tri.rv(), tri.rest_area(), &p);
        for (k, id) in tri.points.iter().enumerate() {
            out[id.index()] += response.forces[k];
        }
    }
}
