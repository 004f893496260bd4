//! Explicit assembly of the implicit system, solved by sparse Cholesky.
//!
//! The CG path never builds `A`. Assembling it is useful to inspect the
//! system and to cross-check CG against a direct factorization.

use weave_math::faer_solver::CholeskySolver;
use weave_math::sparse::CsrMatrix;
use weave_math::{Mat3, Vec3};
use weave_types::{WeaveError, WeaveResult};

use crate::mass_point::MassPoint;

/// Assemble `A = M − Jpos − Jvel + damping` from already scaled ledgers.
///
/// Rows and columns of fixed points are replaced by the identity, which
/// keeps the matrix symmetric and pins `Δv` to zero there.
pub fn assemble(points: &[MassPoint], h: f32, use_damping: bool) -> CsrMatrix {
    let mut blocks: Vec<(usize, usize, Mat3)> = Vec::new();

    for (i, point) in points.iter().enumerate() {
        if point.is_fixed() {
            blocks.push((i, i, Mat3::IDENTITY));
            continue;
        }

        let mut diag = point.mass;
        if use_damping {
            diag += point.damping_term(h);
        }
        blocks.push((i, i, Mat3::from_diagonal(Vec3::splat(diag))));

        for (&j, block) in point.jacobians() {
            if points[j.index()].is_fixed() {
                continue;
            }
            blocks.push((i, j.index(), -(block.pos + block.vel)));
        }
    }

    CsrMatrix::from_blocks(points.len(), &blocks)
}

/// Solve `A Δv = b`. Entries of `b` at fixed points are ignored.
pub fn solve(points: &[MassPoint], b: &[Vec3], h: f32, use_damping: bool) -> WeaveResult<Vec<Vec3>> {
    let matrix = assemble(points, h, use_damping);

    let rhs: Vec<f32> = points
        .iter()
        .zip(b)
        .flat_map(|(p, x)| {
            let x = if p.is_fixed() { Vec3::ZERO } else { *x };
            x.to_array()
        })
        .collect();

    let flat = CholeskySolver::solve_once(&matrix, &rhs)
        .map_err(|e| WeaveError::InvariantViolation(format!("Cholesky solve failed: {e}")))?;

    Ok(flat
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}
