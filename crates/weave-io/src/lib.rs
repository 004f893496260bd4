//! # weave-io
//!
//! The run contract: what a simulation is given (`SimulationInput`, read
//! from TOML) and what it reports back (`SimulationOutput`), plus the
//! checks applied to both inputs and meshes before the solver sees them.

pub mod contract;
pub mod validator;

pub use contract::{
    FixSetup, MaterialSource, MeshSource, SimulationInput, SimulationMetrics, SimulationOutput,
    SimulationParams,
};
pub use validator::{inspect_mesh, validate_input, MeshReport};
