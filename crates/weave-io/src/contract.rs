//! Run contract types.
//!
//! A run file looks like:
//!
//! ```toml
//! axes = "XZ"
//!
//! [mesh]
//! kind = "grid"
//! cols = 10
//! rows = 10
//! width = 1.0
//! height = 1.0
//! plane = "XZ"
//!
//! [material]
//! kind = "builtin"
//! name = "wool"
//!
//! [params]
//! dt = 0.01
//! steps = 100
//! fix = "corners"
//!
//! [solver]
//! integration = "ConjugateGradient"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use weave_material::{ClothMaterial, MaterialKind};
use weave_mesh::generators::{quad_grid, GridPlane};
use weave_mesh::obj::load_obj;
use weave_mesh::ClothMesh;
use weave_solver::{ParamAxes, SolverConfig};
use weave_types::constants::{DEFAULT_DAMPING, DEFAULT_DT};
use weave_types::{WeaveError, WeaveResult};

/// Where the rest mesh comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshSource {
    /// A Wavefront OBJ file with texture coordinates.
    Obj { path: PathBuf },
    /// A generated rectangle; see [`quad_grid`].
    Grid {
        cols: usize,
        rows: usize,
        width: f32,
        height: f32,
        plane: GridPlane,
    },
}

impl MeshSource {
    pub fn load(&self) -> WeaveResult<ClothMesh> {
        match self {
            MeshSource::Obj { path } => load_obj(path),
            MeshSource::Grid {
                cols,
                rows,
                width,
                height,
                plane,
            } => Ok(quad_grid(*cols, *rows, *width, *height, *plane)),
        }
    }
}

/// Where the material comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialSource {
    Builtin { name: MaterialKind },
    /// A TOML (or `.json`) material description.
    File { path: PathBuf },
}

impl MaterialSource {
    pub fn load(&self) -> WeaveResult<ClothMaterial> {
        match self {
            MaterialSource::Builtin { name } => ClothMaterial::from_kind(*name),
            MaterialSource::File { path } => ClothMaterial::load(path),
        }
    }
}

impl Default for MaterialSource {
    fn default() -> Self {
        MaterialSource::Builtin {
            name: MaterialKind::Wool,
        }
    }
}

/// Which of the cloth's registered fix points are held.
///
/// The fix-point list is ordered: the four corners (top-left, top-right,
/// bottom-left, bottom-right), then the left edge between the corners,
/// then the top edge between the corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixSetup {
    /// Nothing held.
    #[default]
    None,
    /// All four corners.
    Corners,
    /// The two top corners.
    Hang,
    /// The whole left edge.
    Flag,
    /// The whole left edge, with the right edge pulled along the weft.
    PullTest,
}

impl FixSetup {
    pub const ALL: [FixSetup; 5] = [
        FixSetup::None,
        FixSetup::Corners,
        FixSetup::Hang,
        FixSetup::Flag,
        FixSetup::PullTest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FixSetup::None => "none",
            FixSetup::Corners => "corners",
            FixSetup::Hang => "hang",
            FixSetup::Flag => "flag",
            FixSetup::PullTest => "pull_test",
        }
    }
}

/// Time stepping and per-run physics knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Step size in seconds.
    pub dt: f32,
    pub steps: u32,
    /// Per-point damping coefficient.
    pub damping: f32,
    pub fix: FixSetup,
    /// Force per pulled point for [`FixSetup::PullTest`], along +weft.
    pub pull_force: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            steps: 100,
            damping: DEFAULT_DAMPING,
            fix: FixSetup::None,
            pull_force: 0.5,
        }
    }
}

impl SimulationParams {
    /// Total simulated time.
    pub fn duration(&self) -> f64 {
        self.dt as f64 * self.steps as f64
    }
}

/// Everything needed to set up and run one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    /// World axes used as the rest parametrization.
    pub axes: ParamAxes,
    pub mesh: MeshSource,
    #[serde(default)]
    pub material: MaterialSource,
    #[serde(default)]
    pub params: SimulationParams,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl SimulationInput {
    /// A generated grid lying in `plane`, parametrized by the same axes.
    pub fn grid(cols: usize, rows: usize, plane: GridPlane) -> Self {
        let axes = match plane {
            GridPlane::XY => ParamAxes::XY,
            GridPlane::XZ => ParamAxes::XZ,
        };
        Self {
            axes,
            mesh: MeshSource::Grid {
                cols,
                rows,
                width: 1.0,
                height: 1.0,
                plane,
            },
            material: MaterialSource::default(),
            params: SimulationParams::default(),
            solver: SolverConfig::default(),
        }
    }

    pub fn from_toml_str(src: &str) -> WeaveResult<Self> {
        toml::from_str(src).map_err(|e| WeaveError::Serialization(format!("Invalid run file: {e}")))
    }

    pub fn to_toml_string(&self) -> WeaveResult<String> {
        toml::to_string_pretty(self).map_err(|e| WeaveError::Serialization(e.to_string()))
    }

    /// Read a run file. Relative mesh and material paths are resolved
    /// against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> WeaveResult<Self> {
        let path = path.as_ref();
        let mut input = Self::from_toml_str(&fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            input.resolve_paths(base);
        }
        tracing::debug!(path = %path.display(), "Loaded run file");
        Ok(input)
    }

    /// Prefix relative file references with `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let MeshSource::Obj { path } = &mut self.mesh {
            rebase(path);
        }
        if let MaterialSource::File { path } = &mut self.material {
            rebase(path);
        }
    }
}

/// Aggregate figures from a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    pub wall_time_seconds: f64,
    pub timestep_count: u32,
    pub final_kinetic_energy: f64,
    pub final_elastic_energy: f64,
    /// Largest strain component at the final state.
    pub max_strain: f32,
    /// Mean linear-solver iterations per step.
    pub avg_iterations: f32,
    /// Steps whose linear solve stopped before its tolerance.
    pub unconverged_steps: u32,
}

/// Result of a run: the deformed mesh and its metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub mesh: ClothMesh,
    pub metrics: SimulationMetrics,
}
