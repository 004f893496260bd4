//! Outer products for Jacobian assembly.

use glam::{Mat3, Vec3};

/// Outer product `a · bᵀ` as a column-major 3×3 matrix.
///
/// Column `j` of the result is `a * b[j]`.
#[inline]
pub fn outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}

