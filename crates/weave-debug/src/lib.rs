//! # weave-debug
//!
//! Inspection hooks called around every cloth step, and binary state
//! snapshots for replay and determinism checks.

pub mod hooks;
pub mod snapshot;

pub use hooks::{InspectionHook, Inspector, SnapshotHook, TelemetryHook};
pub use snapshot::{SnapshotDiff, StateSnapshot};
