//! Sparse Cholesky solver backed by `faer`.
//!
//! Implements the [`SparseSolver`] trait using faer's supernodal LLᵀ
//! factorization. Values are promoted to f64 for the factorization and
//! demoted back to f32 at the interface boundary.
//!
//! The implicit cloth system changes every step (its Jacobians follow
//! the deformation), so unlike a constant-matrix solver this one is
//! refactorized per solve. It is the reference path used to cross-check
//! the matrix-free conjugate gradient.

use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};

use crate::sparse::{CsrMatrix, SparseSolver};

/// Sparse Cholesky (LLᵀ) solver using `faer`.
pub struct CholeskySolver {
    factorization: Option<Llt<usize, f64>>,
    dimension: usize,
}

impl CholeskySolver {
    /// Creates a new solver (unfactorized).
    pub fn new() -> Self {
        Self {
            factorization: None,
            dimension: 0,
        }
    }

    /// Factorize and solve in one call.
    pub fn solve_once(matrix: &CsrMatrix, rhs: &[f32]) -> Result<Vec<f32>, String> {
        let mut solver = Self::new();
        solver.factorize(matrix)?;
        let mut solution = vec![0.0f32; rhs.len()];
        solver.solve(rhs, &mut solution)?;
        Ok(solution)
    }

    fn to_faer(matrix: &CsrMatrix) -> Result<SparseColMat<usize, f64>, String> {
        let triplets: Vec<Triplet<usize, usize, f64>> = (0..matrix.rows)
            .flat_map(|row| {
                (matrix.row_ptr[row]..matrix.row_ptr[row + 1]).map(move |idx| Triplet {
                    row,
                    col: matrix.col_idx[idx],
                    val: f64::from(matrix.values[idx]),
                })
            })
            .collect();

        SparseColMat::try_new_from_triplets(matrix.rows, matrix.cols, &triplets)
            .map_err(|e| format!("Failed to build faer matrix: {e:?}"))
    }
}

impl Default for CholeskySolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseSolver for CholeskySolver {
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), String> {
        if matrix.rows != matrix.cols {
            return Err(format!(
                "Matrix must be square, got {}×{}",
                matrix.rows, matrix.cols
            ));
        }
        if matrix.rows == 0 {
            return Err("Cannot factorize empty matrix".into());
        }

        self.factorization = None;
        self.dimension = matrix.rows;

        let csc = Self::to_faer(matrix)?;
        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| format!("Symbolic analysis failed: {e:?}"))?;
        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper)
            .map_err(|e| format!("Cholesky factorization failed: {e:?}"))?;

        self.factorization = Some(llt);
        Ok(())
    }

    fn solve(&self, rhs: &[f32], solution: &mut [f32]) -> Result<(), String> {
        let llt = self
            .factorization
            .as_ref()
            .ok_or_else(|| "Solver not factorized. Call factorize() first.".to_string())?;

        if rhs.len() != self.dimension || solution.len() != self.dimension {
            return Err(format!(
                "Vector lengths (rhs {}, solution {}) != matrix dimension ({})",
                rhs.len(),
                solution.len(),
                self.dimension
            ));
        }

        let b: faer::Mat<f64> = faer::Mat::from_fn(self.dimension, 1, |i, _| f64::from(rhs[i]));
        let x = llt.solve(&b);

        for (i, out) in solution.iter_mut().enumerate() {
            *out = x[(i, 0)] as f32;
        }
        Ok(())
    }

    fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }
}
