//! Scalar type alias for the simulation.
//!
//! Everything runs in `f32` to match the `glam` vector types the solver
//! is written against.

/// The floating-point type used throughout the simulation.
pub type Scalar = f32;
