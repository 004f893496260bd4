//! # weave-material
//!
//! Fabric material model driven by measured stress curves.
//!
//! ## Design
//!
//! A woven fabric responds differently along its weft, its warp and in
//! shear. Each response is a [`StressCurve`]: a stress table sampled at
//! evenly spaced strains, interpolated by a natural cubic spline so both
//! the stress and its derivative are available to the solver.
//!
//! [`ClothMaterial`] bundles the three curves with an areal density and
//! the shear strain floor. It is immutable once built; the solver only
//! reads it.
//!
//! The [`MaterialDatabase`] stores named presets. [`MaterialKind`] tags the
//! built-in ones; custom materials load from TOML or JSON.

pub mod curve;
pub mod database;
pub mod material;

pub use curve::{CurveSpec, StressCurve};
pub use database::{MaterialDatabase, MaterialKind};
pub use material::{ClothMaterial, Strain, Stress};
