//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of mass point indices
//! with triangle indices.

use serde::{Deserialize, Serialize};

/// Index into the cloth's mass point array.
///
/// Ordered so that per-point Jacobian rows iterate neighbors
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointId(pub u32);

/// Index into the cloth's triangle array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriangleId(pub u32);

impl PointId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TriangleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for PointId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<usize> for PointId {
    fn from(val: usize) -> Self {
        Self(val as u32)
    }
}

impl From<u32> for TriangleId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
