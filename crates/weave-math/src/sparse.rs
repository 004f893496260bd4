//! Sparse matrix representation and solver interface.
//!
//! The conjugate gradient path never materializes the system matrix;
//! it multiplies through the per-point Jacobian rows instead. This CSR
//! form exists for the reference direct solve and for inspection.

use glam::Mat3;
use serde::{Deserialize, Serialize};

/// Compressed Sparse Row (CSR) matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Row pointer array (length = rows + 1).
    /// `row_ptr[i]..row_ptr[i+1]` are the indices into `col_idx` and `values`
    /// for non-zeros in row `i`.
    pub row_ptr: Vec<usize>,
    /// Column indices of non-zero entries.
    pub col_idx: Vec<usize>,
    /// Non-zero values.
    pub values: Vec<f32>,
}

impl CsrMatrix {
    /// Returns the number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Creates a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries are summed.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f32)]) -> Self {
        let mut sorted: Vec<(usize, usize, f32)> = triplets.to_vec();
        sorted.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(sorted.len());
        let mut values: Vec<f32> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in sorted {
            if last == Some((r, c)) {
                if let Some(tail) = values.last_mut() {
                    *tail += v;
                }
                continue;
            }
            col_idx.push(c);
            values.push(v);
            row_ptr[r + 1] += 1;
            last = Some((r, c));
        }

        for i in 0..rows {
            row_ptr[i + 1] += row_ptr[i];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Creates a `3n × 3n` matrix from 3×3 blocks addressed by block row/column.
    ///
    /// Blocks sharing an address are summed. Exact zeros are skipped.
    pub fn from_blocks(block_count: usize, blocks: &[(usize, usize, Mat3)]) -> Self {
        let mut triplets = Vec::with_capacity(blocks.len() * 9);
        for &(br, bc, m) in blocks {
            for c in 0..3 {
                let col = m.col(c);
                for r in 0..3 {
                    let v = col[r];
                    if v != 0.0 {
                        triplets.push((br * 3 + r, bc * 3 + c, v));
                    }
                }
            }
        }
        let n = block_count * 3;
        Self::from_triplets(n, n, &triplets)
    }

    /// Dense lookup of entry `(row, col)`; zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_idx[span.clone()]
            .binary_search(&col)
            .map(|k| self.values[span.start + k])
            .unwrap_or(0.0)
    }

    /// Matrix-vector product `y = A x`.
    pub fn mul_vec(&self, x: &[f32]) -> Vec<f32> {
        let mut y = vec![0.0f32; self.rows];
        for (row, out) in y.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
                acc += self.values[idx] * x[self.col_idx[idx]];
            }
            *out = acc;
        }
        y
    }
}

/// Trait for sparse symmetric positive-definite solvers.
pub trait SparseSolver {
    /// Factorize the matrix. Call again whenever the values change.
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), String>;

    /// Solve Ax = b using the pre-computed factorization.
    /// Returns x in the provided output buffer.
    fn solve(&self, rhs: &[f32], solution: &mut [f32]) -> Result<(), String>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;
}
