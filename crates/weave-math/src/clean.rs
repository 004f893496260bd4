//! Near-zero snapping.
//!
//! Repeated multiply-accumulate across steps leaves residue such as
//! `1e-9` where an exact zero belongs. Strain and stress evaluation
//! snap those components to zero first so the material curves see
//! the rest state exactly.

use glam::Vec3;
use weave_types::constants::CLEAN_EPSILON;

/// Snap a scalar within [`CLEAN_EPSILON`] of zero to exactly zero.
#[inline]
pub fn clean_scalar(x: f32) -> f32 {
    if x.abs() < CLEAN_EPSILON { 0.0 } else { x }
}

/// Snap each component of `v` within [`CLEAN_EPSILON`] of zero to exactly zero.
#[inline]
pub fn clean_vec3(v: Vec3) -> Vec3 {
    Vec3::new(clean_scalar(v.x), clean_scalar(v.y), clean_scalar(v.z))
}
