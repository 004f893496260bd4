//! Event consumers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{EventKind, SimulationEvent};

/// Receives events from an [`EventBus`](crate::EventBus).
pub trait EventSink: Send {
    fn handle(&mut self, event: &SimulationEvent);

    /// Called once when the run ends.
    fn finalize(&mut self) {}

    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// The buffer is shared, so events stay readable after the sink has been
/// boxed into a bus: keep a clone and read it with [`VecSink::events`].
#[derive(Default, Clone)]
pub struct VecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<SimulationEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of everything collected so far.
    pub fn events(&self) -> Vec<SimulationEvent> {
        self.buffer().to_vec()
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        self.buffer().push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Forwards events to `tracing`. Convergence failures are logged at
/// `warn`, everything else at `info` (or `debug` when `verbose` is off).
pub struct TracingSink {
    verbose: bool,
}

impl TracingSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        match &event.kind {
            EventKind::Convergence {
                integration,
                iterations,
                final_residual,
                converged: false,
            } => {
                tracing::warn!(
                    step = event.timestep,
                    integration = integration.as_str(),
                    iterations,
                    final_residual,
                    "Solver did not converge"
                );
            }
            kind if self.verbose => {
                tracing::info!(step = event.timestep, event = ?kind, "{}", event.label());
            }
            kind => {
                tracing::debug!(step = event.timestep, event = ?kind, "{}", event.label());
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
