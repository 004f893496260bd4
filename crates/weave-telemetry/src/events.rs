//! Simulation event types.

use serde::{Deserialize, Serialize};

/// One event, tagged with the step it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Step index (0-based).
    pub timestep: u32,
    pub kind: EventKind,
}

/// Event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A step is about to run.
    TimestepBegin {
        /// Simulated time at the start of the step (seconds).
        sim_time: f64,
        /// Step size (seconds).
        dt: f32,
    },

    /// A step finished.
    TimestepEnd {
        /// Wall-clock time spent in the step (seconds).
        wall_time: f64,
    },

    /// One conjugate-gradient iteration.
    SolverIteration {
        iteration: u32,
        /// Preconditioned residual `rᵀ s`.
        residual: f64,
    },

    /// Linear solve report for the step.
    Convergence {
        /// Integrator that ran ("cg", "rk4" or "cholesky").
        integration: String,
        iterations: u32,
        final_residual: f64,
        converged: bool,
    },

    /// Energy of the state after the step.
    Energy {
        /// `½ Σ m |v|²`.
        kinetic: f64,
        /// `−Σ m g·x`.
        potential: f64,
        /// Membrane strain energy.
        elastic: f64,
    },

    /// Largest absolute strain component over all triangles.
    Strain { max: f32 },

    /// Free-form event.
    Custom {
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    pub fn new(timestep: u32, kind: EventKind) -> Self {
        Self { timestep, kind }
    }

    /// Short name of the payload variant, used by log sinks.
    pub fn label(&self) -> &str {
        match &self.kind {
            EventKind::TimestepBegin { .. } => "timestep_begin",
            EventKind::TimestepEnd { .. } => "timestep_end",
            EventKind::SolverIteration { .. } => "solver_iteration",
            EventKind::Convergence { .. } => "convergence",
            EventKind::Energy { .. } => "energy",
            EventKind::Strain { .. } => "strain",
            EventKind::Custom { label, .. } => label,
        }
    }
}
