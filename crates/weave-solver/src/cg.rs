//! Filtered, Jacobi-preconditioned conjugate gradient.
//!
//! Solves `A Δv = b` where constrained components are removed by the
//! per-point filter: `b`, each search direction and each `A p` are
//! filtered, so fixed points never receive a velocity change.

use weave_math::{Mat3, Vec3};
use weave_types::constants::MIN_PRECONDITIONER;
use weave_types::PointId;

use crate::mass_point::{MassPoint, Product};
use crate::operator::{apply_filter, dot, system_product, weighted_dot};

/// Curvature `pᵀAp` at or below which the search stops.
const MIN_CURVATURE: f64 = 1e-30;

/// Parameters of one solve.
#[derive(Debug, Clone, Copy)]
pub struct CgParams {
    pub h: f32,
    pub use_damping: bool,
    /// Relative tolerance on `r·P·r`.
    pub tolerance: f32,
    pub max_iterations: u32,
}

/// Outcome of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct CgOutcome {
    pub iterations: u32,
    /// Final `r·P·r`.
    pub residual: f64,
    pub converged: bool,
    /// `r·P·r` after each iteration.
    pub history: Vec<f64>,
}

/// Jacobi preconditioner `1 / diag(A)`. Near-zero denominators are
/// replaced by 1.
pub fn jacobi_preconditioner(points: &[MassPoint], h: f32, use_damping: bool) -> Vec<Vec3> {
    let mut guarded = 0usize;
    let inv = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let d = p.diagonal_of_system(PointId::from(i), true, use_damping, h);
            let mut out = Vec3::ONE;
            for k in 0..3 {
                if d[k].abs() < MIN_PRECONDITIONER {
                    guarded += 1;
                } else {
                    out[k] = 1.0 / d[k];
                }
            }
            out
        })
        .collect();
    if guarded > 0 {
        tracing::warn!(guarded, "Near-zero system diagonal, preconditioner entries set to 1");
    }
    inv
}

/// Solve `A Δv = b` and return `Δv`. `b` is filtered in place.
pub fn solve(
    points: &[MassPoint],
    filter: &[Mat3],
    b: &mut [Vec3],
    params: CgParams,
) -> (Vec<Vec3>, CgOutcome) {
    let n = points.len();
    let product = Product::system(params.use_damping);
    let precond = jacobi_preconditioner(points, params.h, params.use_damping);

    let mut dv = vec![Vec3::ZERO; n];
    apply_filter(filter, b);

    // Δv₀ = 0, so r₀ = b.
    let mut r: Vec<Vec3> = b.to_vec();
    let delta0 = weighted_dot(&r, &precond, &r);
    if delta0 <= 0.0 {
        return (
            dv,
            CgOutcome {
                iterations: 0,
                residual: 0.0,
                converged: true,
                history: Vec::new(),
            },
        );
    }
    let target = params.tolerance as f64 * delta0;

    let mut c: Vec<Vec3> = r.iter().zip(&precond).map(|(x, p)| *p * *x).collect();
    apply_filter(filter, &mut c);
    let mut delta_new = delta0;

    let mut q = vec![Vec3::ZERO; n];
    let mut iterations = 0u32;
    let mut history = Vec::new();

    while iterations < params.max_iterations && delta_new > target {
        system_product(points, &c, product, params.h, &mut q);
        apply_filter(filter, &mut q);

        let curvature = dot(&c, &q);
        if curvature <= MIN_CURVATURE {
            tracing::debug!(iterations, curvature, "CG stopped on vanishing curvature");
            break;
        }
        let alpha = (delta_new / curvature) as f32;

        for k in 0..n {
            dv[k] += alpha * c[k];
            r[k] -= alpha * q[k];
        }

        let delta_old = delta_new;
        delta_new = weighted_dot(&r, &precond, &r);
        history.push(delta_new);
        let beta = (delta_new / delta_old) as f32;
        for k in 0..n {
            c[k] = precond[k] * r[k] + beta * c[k];
        }
        apply_filter(filter, &mut c);

        iterations += 1;
    }

    let converged = delta_new <= target;
    if !converged {
        tracing::warn!(
            iterations,
            residual = delta_new,
            target,
            "CG stopped before reaching tolerance"
        );
    }

    (
        dv,
        CgOutcome {
            iterations,
            residual: delta_new,
            converged,
            history,
        },
    )
}
