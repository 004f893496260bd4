//! # weave-bench
//!
//! Canonical cloth setups (start configurations crossed with fix-point
//! setups), a driver that runs them while reporting to a telemetry bus,
//! and CSV metrics for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::{BenchmarkRunner, RunOutcome};
pub use scenarios::{FixPoints, Scenario, ScenarioKind, StartConfig};
