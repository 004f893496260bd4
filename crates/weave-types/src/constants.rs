//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.8;

/// Default simulation timestep (seconds).
pub const DEFAULT_DT: f32 = 0.01;

/// Default per-point damping coefficient applied at cloth init.
pub const DEFAULT_DAMPING: f32 = 9.0;

/// Default air resistance coefficient for the quadratic drag term.
pub const DEFAULT_AIR_RESISTANCE: f32 = 1.0;

/// Relative convergence threshold for the conjugate gradient solve.
///
/// Iteration stops once `r·P·r < CG_TOLERANCE · r₀·P·r₀`.
pub const CG_TOLERANCE: f32 = 1.0e-5;

/// Magnitude below which vector components are snapped to exactly zero
/// before they enter strain and stress evaluation.
pub const CLEAN_EPSILON: f32 = 1.0e-6;

/// Smallest admissible preconditioner denominator.
pub const MIN_PRECONDITIONER: f32 = 1.0e-12;

/// Epsilon for degenerate triangle detection (area threshold).
pub const DEGENERATE_AREA_THRESHOLD: f32 = 1.0e-10;
