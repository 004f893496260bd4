//! # weave-math
//!
//! Linear algebra primitives for the weave cloth simulator.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Mat3`, etc.)
//! - Near-zero snapping and outer products used by the force pass
//! - Uniform natural cubic splines for measured material curves
//! - Sparse matrix representation (CSR) and a Cholesky solver interface

pub mod clean;
pub mod faer_solver;
pub mod outer;
pub mod sparse;
pub mod spline;

// Re-export glam types as the canonical math types for weave.
pub use glam::{Mat3, Vec2, Vec3};

pub use clean::{clean_scalar, clean_vec3};
pub use outer::outer;
pub use spline::CubicSpline;
