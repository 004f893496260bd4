//! # weave-mesh
//!
//! Triangle mesh input for the cloth simulator.
//!
//! ## Key Types
//!
//! - [`ClothMesh`] — positions, UVs and faces that carry both vertex and
//!   UV indices, validated as a whole before a cloth is built from it.
//! - [`obj`] — Wavefront OBJ reader and writer (1-based on disk, 0-based here).
//! - [`generators`] — procedural flat grids with known corner and edge indices.
//! - [`normals`] — area-weighted vertex normals.

pub mod generators;
pub mod mesh;
pub mod normals;
pub mod obj;

pub use mesh::{ClothMesh, Face};
