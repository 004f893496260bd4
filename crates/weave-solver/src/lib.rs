//! # weave-solver
//!
//! Continuum cloth model and its time integrators.
//!
//! ## Key Types
//!
//! - [`Cloth`] — points, triangles, constraints; runs one step per [`Cloth::update`]
//! - [`MassPoint`] — a point mass with its row of the implicit system
//! - [`Triangle`] — rest-pose r-weights and cached vertex positions
//! - [`SolverConfig`] — integration scheme, external fields, CG settings
//! - [`StepResult`] — iterations, residual and timing of one step
//!
//! ## Integration
//!
//! The default scheme is semi-implicit backward Euler: the step solves
//! `(M − h²∂f/∂x − h∂f/∂v) Δv = h (f + h ∂f/∂x v)` with a filtered,
//! Jacobi-preconditioned conjugate gradient that never assembles the
//! matrix. [`Integration::Rk4`] is the explicit alternative and
//! [`Integration::DirectCholesky`] solves the same implicit system with a
//! sparse factorization.

pub mod cg;
pub mod cloth;
pub mod config;
pub mod direct;
pub mod forces;
pub mod mass_point;
pub mod operator;
pub mod render;
pub mod rk4;
pub mod strategy;
pub mod triangle;

pub use cloth::Cloth;
pub use config::{Integration, SolverConfig};
pub use mass_point::{JacobianBlock, MassPoint, Product};
pub use render::RenderVertex;
pub use strategy::StepResult;
pub use triangle::{ParamAxes, Triangle};
