//! Binary state snapshots.
//!
//! A snapshot holds the dynamic state of a cloth (positions, velocities,
//! fixed flags) plus enough bookkeeping to check that it is restored onto
//! a compatible cloth.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use weave_math::Vec3;
use weave_solver::Cloth;
use weave_types::{WeaveError, WeaveResult};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Dynamic state of a cloth at one instant. Serialized with `bincode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    /// Steps taken by the cloth when captured.
    pub timestep: u64,
    /// Simulated time in seconds.
    pub sim_time: f64,
    /// Material name, checked on restore.
    pub material: String,
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub fixed: Vec<bool>,
}

/// Largest per-point differences between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotDiff {
    pub max_position_delta: f32,
    pub max_velocity_delta: f32,
}

impl SnapshotDiff {
    /// Both deltas are at most `tolerance`.
    pub fn within(&self, tolerance: f32) -> bool {
        self.max_position_delta <= tolerance && self.max_velocity_delta <= tolerance
    }
}

impl StateSnapshot {
    pub fn capture(cloth: &Cloth, sim_time: f64) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            timestep: cloth.steps(),
            sim_time,
            material: cloth.material().name.clone(),
            positions: cloth.positions(),
            velocities: cloth.velocities(),
            fixed: cloth.points().iter().map(|p| p.is_fixed()).collect(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    /// Write this state back into `cloth`, which must have been built from
    /// the same mesh and material.
    pub fn restore(&self, cloth: &mut Cloth) -> WeaveResult<()> {
        if self.point_count() != cloth.point_count() {
            return Err(WeaveError::InvalidConfig(format!(
                "Snapshot has {} points, cloth has {}",
                self.point_count(),
                cloth.point_count()
            )));
        }
        if self.material != cloth.material().name {
            return Err(WeaveError::InvalidConfig(format!(
                "Snapshot material '{}' does not match cloth material '{}'",
                self.material,
                cloth.material().name
            )));
        }
        if self.fixed.len() != self.point_count() {
            return Err(WeaveError::Serialization(
                "Snapshot fixed flags do not match its point count".into(),
            ));
        }

        for (i, &fixed) in self.fixed.iter().enumerate() {
            cloth.set_point_fixed(i, fixed)?;
        }
        cloth.set_state(&self.positions, &self.velocities)?;
        tracing::debug!(timestep = self.timestep, points = self.point_count(), "Snapshot restored");
        Ok(())
    }

    /// Compare against a snapshot of the same cloth.
    pub fn diff(&self, other: &StateSnapshot) -> WeaveResult<SnapshotDiff> {
        if self.point_count() != other.point_count() {
            return Err(WeaveError::InvalidConfig(format!(
                "Cannot compare snapshots with {} and {} points",
                self.point_count(),
                other.point_count()
            )));
        }
        let max_delta = |a: &[Vec3], b: &[Vec3]| {
            a.iter()
                .zip(b)
                .map(|(x, y)| x.distance(*y))
                .fold(0.0f32, f32::max)
        };
        Ok(SnapshotDiff {
            max_position_delta: max_delta(&self.positions, &other.positions),
            max_velocity_delta: max_delta(&self.velocities, &other.velocities),
        })
    }

    pub fn to_bytes(&self) -> WeaveResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| WeaveError::Serialization(format!("Snapshot encoding failed: {e}")))
    }

    pub fn from_bytes(data: &[u8]) -> WeaveResult<Self> {
        let snapshot: Self = bincode::deserialize(data)
            .map_err(|e| WeaveError::Serialization(format!("Snapshot decoding failed: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(WeaveError::Serialization(format!(
                "Unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        if snapshot.velocities.len() != snapshot.positions.len() {
            return Err(WeaveError::Serialization(
                "Snapshot velocity count does not match position count".into(),
            ));
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> WeaveResult<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> WeaveResult<Self> {
        Self::from_bytes(&fs::read(path)?)
    }
}
