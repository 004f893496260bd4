//! Whole-cloth vector operations for the implicit solve.
//!
//! Vectors are `&[Vec3]`, one entry per point. The system matrix only
//! exists implicitly, as the points' Jacobian rows.

use weave_math::{Mat3, Vec3};
use weave_types::PointId;

use crate::mass_point::{MassPoint, Product};

/// Filter block for a point: identity when free, zero when fixed.
#[inline]
pub fn filter_block(fixed: bool) -> Mat3 {
    if fixed {
        Mat3::ZERO
    } else {
        Mat3::IDENTITY
    }
}

/// Project out the constrained components: `v_i ← S_i v_i`.
pub fn apply_filter(filter: &[Mat3], v: &mut [Vec3]) {
    for (s, x) in filter.iter().zip(v.iter_mut()) {
        *x = *s * *x;
    }
}

/// `out = M vec` for the requested product, row by row.
pub fn system_product(points: &[MassPoint], vec: &[Vec3], product: Product, h: f32, out: &mut [Vec3]) {
    for (i, (point, o)) in points.iter().zip(out.iter_mut()).enumerate() {
        *o = point.jacobian_vector_mult(PointId::from(i), vec, product, h);
    }
}

/// `Σ a_i · b_i`, accumulated in `f64`.
pub fn dot(a: &[Vec3], b: &[Vec3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x.dot(*y) as f64).sum()
}

/// `Σ a_i · (p_i ∘ b_i)` with a diagonal (component-wise) weight `p`.
pub fn weighted_dot(a: &[Vec3], p: &[Vec3], b: &[Vec3]) -> f64 {
    a.iter()
        .zip(p)
        .zip(b)
        .map(|((x, w), y)| x.dot(*w * *y) as f64)
        .sum()
}
