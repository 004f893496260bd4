//! Solver configuration.
//!
//! Parameters that control how a step is integrated: the integration
//! scheme, external fields, and conjugate-gradient convergence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use weave_types::constants::{CG_TOLERANCE, DEFAULT_AIR_RESISTANCE, GRAVITY};
use weave_types::{WeaveError, WeaveResult};

/// Time integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Integration {
    /// Semi-implicit backward Euler solved with filtered, preconditioned CG.
    #[default]
    ConjugateGradient,
    /// Explicit classical Runge-Kutta, four stages.
    Rk4,
    /// Same linear system as `ConjugateGradient`, solved by sparse Cholesky.
    DirectCholesky,
}

impl Integration {
    /// Short lowercase name, used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::ConjugateGradient => "cg",
            Self::Rk4 => "rk4",
            Self::DirectCholesky => "cholesky",
        }
    }
}

/// Configuration for the cloth solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Integration scheme.
    pub integration: Integration,

    /// Gravity vector [gx, gy, gz].
    pub gravity: [f32; 3],

    /// Quadratic air drag coefficient (0.0 disables drag).
    pub air_resistance: f32,

    /// Whether the per-point damping term enters the implicit system.
    pub use_damping: bool,

    /// Relative CG tolerance on the preconditioned residual.
    pub cg_tolerance: f32,

    /// CG iteration cap. `None` means one iteration per point.
    pub max_cg_iterations: Option<u32>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            integration: Integration::ConjugateGradient,
            gravity: [0.0, -GRAVITY, 0.0],
            air_resistance: DEFAULT_AIR_RESISTANCE,
            use_damping: true,
            cg_tolerance: CG_TOLERANCE,
            max_cg_iterations: None,
        }
    }
}

impl SolverConfig {
    /// Creates a config for debugging (few CG iterations, looser tolerance).
    pub fn debug() -> Self {
        Self {
            cg_tolerance: 1e-3,
            max_cg_iterations: Some(8),
            ..Default::default()
        }
    }

    /// Creates a high-quality config (tight tolerance, uncapped CG).
    pub fn high_quality() -> Self {
        Self {
            cg_tolerance: 1e-8,
            max_cg_iterations: None,
            ..Default::default()
        }
    }

    /// Gravity as a vector.
    pub fn gravity_vec(&self) -> weave_math::Vec3 {
        weave_math::Vec3::from_array(self.gravity)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> WeaveResult<()> {
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(WeaveError::InvalidConfig("Gravity must be finite".into()));
        }
        if !(self.air_resistance.is_finite() && self.air_resistance >= 0.0) {
            return Err(WeaveError::InvalidConfig(format!(
                "Air resistance must be non-negative, got {}",
                self.air_resistance
            )));
        }
        if !(self.cg_tolerance.is_finite() && self.cg_tolerance > 0.0) {
            return Err(WeaveError::InvalidConfig(format!(
                "CG tolerance must be positive, got {}",
                self.cg_tolerance
            )));
        }
        if self.max_cg_iterations == Some(0) {
            return Err(WeaveError::InvalidConfig(
                "CG iteration cap must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(src: &str) -> WeaveResult<Self> {
        let config: Self =
            toml::from_str(src).map_err(|e| WeaveError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> WeaveResult<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}
