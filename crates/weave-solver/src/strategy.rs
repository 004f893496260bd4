//! Step outcome shared by every integration scheme.

use serde::{Deserialize, Serialize};

use crate::config::Integration;

/// Result of one `Cloth::update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Scheme that produced this step.
    pub integration: Integration,
    /// Linear-solver iterations performed (0 for RK4, 1 for a direct solve).
    pub iterations: u32,
    /// Final preconditioned residual `r·P·r` (0 for RK4).
    pub final_residual: f64,
    /// Whether the linear solve reached its tolerance. RK4 always converges.
    pub converged: bool,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
    /// Residual after each CG iteration (empty for other schemes).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub residual_history: Vec<f64>,
}

impl StepResult {
    pub(crate) fn explicit(wall_time: f64) -> Self {
        Self {
            integration: Integration::Rk4,
            iterations: 0,
            final_residual: 0.0,
            converged: true,
            wall_time,
            residual_history: Vec::new(),
        }
    }
}
