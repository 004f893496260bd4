//! Error types for the weave simulator.
//!
//! All crates return `WeaveResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the weave simulator.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Material curve or parameter is out of valid range.
    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    /// Configuration value or call argument is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A text mesh file could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        line: usize,
        message: String,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Linear solve failed.
    #[error("Solver did not converge after {iterations} iterations (residual: {residual:.2e})")]
    SolverDivergence {
        iterations: u32,
        residual: f64,
    },

    /// A simulation invariant was violated (e.g., a non-finite position).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for `Result<T, WeaveError>`.
pub type WeaveResult<T> = Result<T, WeaveError>;
