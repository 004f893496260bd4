//! # weave-telemetry
//!
//! Structured events emitted while a cloth is stepped (step timing,
//! solver convergence, energy), delivered through an [`EventBus`] to
//! pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
