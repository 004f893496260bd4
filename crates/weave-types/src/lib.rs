//! # weave-types
//!
//! Shared types, identifiers, error types, and physical constants
//! for the weave cloth simulator.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other weave crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod scalar;

pub use error::{WeaveError, WeaveResult};
pub use ids::{PointId, TriangleId};
pub use scalar::Scalar;
