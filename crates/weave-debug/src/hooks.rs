//! Inspection hooks around the cloth step.
//!
//! An [`Inspector`] drives a [`Cloth`] and calls every registered hook
//! before and after each step:
//!
//! ```text
//! for each step:
//!   hook.on_timestep_begin(..)
//!   cloth.update(..)
//!   hook.on_timestep_end(..)
//! hook.on_simulation_end(..)
//! ```
//!
//! Hooks only see the cloth by shared reference.

use std::sync::mpsc;

use weave_math::Vec3;
use weave_solver::{Cloth, StepResult};
use weave_telemetry::{EventKind, SimulationEvent};
use weave_types::WeaveResult;

use crate::snapshot::StateSnapshot;

pub trait InspectionHook: Send {
    fn on_timestep_begin(&mut self, timestep: u32, sim_time: f64, cloth: &Cloth) {
        let _ = (timestep, sim_time, cloth);
    }

    /// `sim_time` is the time at the end of the step.
    fn on_timestep_end(&mut self, timestep: u32, sim_time: f64, cloth: &Cloth, result: &StepResult) {
        let _ = (timestep, sim_time, cloth, result);
    }

    fn on_simulation_end(&mut self, cloth: &Cloth) {
        let _ = cloth;
    }

    fn name(&self) -> &str;
}

/// Steps a cloth and notifies hooks. Hooks are borrowed, so their
/// collected data is readable again once the inspector is dropped.
pub struct Inspector<'a> {
    hooks: Vec<&'a mut dyn InspectionHook>,
    timestep: u32,
    sim_time: f64,
}

impl<'a> Inspector<'a> {
    pub fn new() -> Self {
        Self {
            hooks: Vec::new(),
            timestep: 0,
            sim_time: 0.0,
        }
    }

    pub fn with_hook(mut self, hook: &'a mut dyn InspectionHook) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn add_hook(&mut self, hook: &'a mut dyn InspectionHook) {
        self.hooks.push(hook);
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Steps taken through this inspector.
    pub fn timestep(&self) -> u32 {
        self.timestep
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// One `cloth.update(dt, external)` wrapped in hook calls. On error
    /// the end hooks are skipped and the clock does not advance.
    pub fn step(&mut self, cloth: &mut Cloth, dt: f32, external: &[Vec3]) -> WeaveResult<StepResult> {
        for hook in &mut self.hooks {
            hook.on_timestep_begin(self.timestep, self.sim_time, cloth);
        }

        let result = cloth.update(dt, external)?;
        let end_time = self.sim_time + dt as f64;

        for hook in &mut self.hooks {
            hook.on_timestep_end(self.timestep, end_time, cloth, &result);
        }
        self.timestep += 1;
        self.sim_time = end_time;
        Ok(result)
    }

    pub fn finish(&mut self, cloth: &Cloth) {
        for hook in &mut self.hooks {
            tracing::debug!(hook = hook.name(), steps = self.timestep, "Simulation finished");
            hook.on_simulation_end(cloth);
        }
    }
}

impl Default for Inspector<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Translates steps into telemetry events.
///
/// Per step: `TimestepBegin`, one `SolverIteration` per CG iteration,
/// `Convergence`, `Energy`, `Strain`, `TimestepEnd`. Events are buffered
/// unless the hook is connected to a bus sender.
pub struct TelemetryHook {
    dt: f32,
    events: Vec<SimulationEvent>,
    sender: Option<mpsc::Sender<SimulationEvent>>,
}

impl TelemetryHook {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            events: Vec::new(),
            sender: None,
        }
    }

    /// Forward events to `sender` (typically [`EventBus::sender`]) instead
    /// of buffering them.
    ///
    /// [`EventBus::sender`]: weave_telemetry::EventBus::sender
    pub fn connected(dt: f32, sender: mpsc::Sender<SimulationEvent>) -> Self {
        Self {
            dt,
            events: Vec::new(),
            sender: Some(sender),
        }
    }

    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    fn push(&mut self, timestep: u32, kind: EventKind) {
        let event = SimulationEvent::new(timestep, kind);
        match &self.sender {
            // A dropped bus only means nobody is listening.
            Some(sender) => {
                let _ = sender.send(event);
            }
            None => self.events.push(event),
        }
    }
}

impl InspectionHook for TelemetryHook {
    fn on_timestep_begin(&mut self, timestep: u32, sim_time: f64, _cloth: &Cloth) {
        let dt = self.dt;
        self.push(timestep, EventKind::TimestepBegin { sim_time, dt });
    }

    fn on_timestep_end(&mut self, timestep: u32, _sim_time: f64, cloth: &Cloth, result: &StepResult) {
        for (k, &residual) in result.residual_history.iter().enumerate() {
            self.push(
                timestep,
                EventKind::SolverIteration {
                    iteration: k as u32,
                    residual,
                },
            );
        }
        self.push(
            timestep,
            EventKind::Convergence {
                integration: result.integration.name().to_string(),
                iterations: result.iterations,
                final_residual: result.final_residual,
                converged: result.converged,
            },
        );
        self.push(
            timestep,
            EventKind::Energy {
                kinetic: cloth.kinetic_energy(),
                potential: cloth.potential_energy(),
                elastic: cloth.elastic_energy(),
            },
        );
        self.push(timestep, EventKind::Strain { max: cloth.max_strain() });
        self.push(
            timestep,
            EventKind::TimestepEnd {
                wall_time: result.wall_time,
            },
        );
    }

    fn name(&self) -> &str {
        "telemetry_hook"
    }
}

/// Captures a [`StateSnapshot`] every `every` steps (after the step), and
/// once more at the end of the run.
pub struct SnapshotHook {
    every: u32,
    sim_time: f64,
    snapshots: Vec<StateSnapshot>,
}

impl SnapshotHook {
    /// `every` is clamped to at least 1.
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            sim_time: 0.0,
            snapshots: Vec::new(),
        }
    }

    pub fn snapshots(&self) -> &[StateSnapshot] {
        &self.snapshots
    }

    pub fn last(&self) -> Option<&StateSnapshot> {
        self.snapshots.last()
    }

    pub fn into_snapshots(self) -> Vec<StateSnapshot> {
        self.snapshots
    }
}

impl InspectionHook for SnapshotHook {
    fn on_timestep_end(&mut self, timestep: u32, sim_time: f64, cloth: &Cloth, _result: &StepResult) {
        self.sim_time = sim_time;
        if (timestep + 1) % self.every == 0 {
            self.snapshots.push(StateSnapshot::capture(cloth, sim_time));
        }
    }

    fn on_simulation_end(&mut self, cloth: &Cloth) {
        let already = self
            .snapshots
            .last()
            .is_some_and(|s| s.timestep == cloth.steps());
        if !already {
            tracing::debug!(timestep = cloth.steps(), "Capturing final snapshot");
            self.snapshots.push(StateSnapshot::capture(cloth, self.sim_time));
        }
    }

    fn name(&self) -> &str {
        "snapshot_hook"
    }
}
