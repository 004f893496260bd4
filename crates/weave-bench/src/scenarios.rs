//! Scenarios: a rest mesh, a fix-point layout and a run description.
//!
//! Start configurations are square grids at two resolutions, lying
//! either flat (XZ) or hanging (XY), each parametrized by its own plane.
//! Fix points are found from the parametrization, so the same setups
//! apply to any rectangular OBJ cloth:
//!
//! ```text
//!   TL ─ warp hold ─ TR      v
//!   │                 │      ▲
//! weft                │      │
//! hold                │      └──▶ u
//!   │                 │
//!   BL ────────────── BR
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use weave_io::{validate_input, FixSetup, SimulationInput};
use weave_math::{Vec2, Vec3};
use weave_mesh::generators::GridPlane;
use weave_mesh::ClothMesh;
use weave_solver::{Cloth, ParamAxes};
use weave_types::{WeaveError, WeaveResult};

/// Starting rest state of the cloth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartConfig {
    LowResXZ,
    LowResXY,
    HighResXZ,
    HighResXY,
}

impl StartConfig {
    pub const ALL: [StartConfig; 4] = [
        StartConfig::LowResXZ,
        StartConfig::LowResXY,
        StartConfig::HighResXZ,
        StartConfig::HighResXY,
    ];

    /// Quads per side.
    pub fn resolution(self) -> usize {
        match self {
            StartConfig::LowResXZ | StartConfig::LowResXY => 9,
            StartConfig::HighResXZ | StartConfig::HighResXY => 29,
        }
    }

    pub fn plane(self) -> GridPlane {
        match self {
            StartConfig::LowResXZ | StartConfig::HighResXZ => GridPlane::XZ,
            StartConfig::LowResXY | StartConfig::HighResXY => GridPlane::XY,
        }
    }

    /// A run description for this start state with default parameters.
    pub fn input(self, fix: FixSetup) -> SimulationInput {
        let n = self.resolution();
        let mut input = SimulationInput::grid(n, n, self.plane());
        input.params.fix = fix;
        input
    }
}

/// Registered fix points of a rectangular cloth, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixPoints {
    /// Top-left, top-right, bottom-left, bottom-right.
    pub corners: [usize; 4],
    /// Left edge strictly between the corners, top to bottom.
    pub weft_hold: Vec<usize>,
    /// Top edge strictly between the corners, left to right.
    pub warp_hold: Vec<usize>,
    /// Right edge, corners included. Not registered; this is where a
    /// pull test applies its force.
    pub pulled: Vec<usize>,
}

impl FixPoints {
    /// Locate corners and edges from each vertex's parameter coordinates.
    ///
    /// The cloth is assumed to be rectangular in the parameter plane.
    /// Vertices within a small tolerance of an edge belong to it.
    pub fn locate(mesh: &ClothMesh, axes: ParamAxes) -> WeaveResult<Self> {
        if mesh.positions.is_empty() {
            return Err(WeaveError::InvalidMesh("Mesh has no vertices".into()));
        }
        let params: Vec<Vec2> = mesh.positions.iter().map(|&p| axes.project(p)).collect();
        let (min, max) = params
            .iter()
            .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            });
        let extent = max - min;
        if extent.x <= 0.0 || extent.y <= 0.0 {
            return Err(WeaveError::InvalidMesh(format!(
                "Mesh is flat in the {axes:?} parameter plane"
            )));
        }
        let tol = 1e-4 * extent.max_element();

        let nearest = |target: Vec2| {
            params
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.distance_squared(target).total_cmp(&b.distance_squared(target)))
                .map_or(0, |(i, _)| i)
        };
        let corners = [
            nearest(Vec2::new(min.x, max.y)),
            nearest(Vec2::new(max.x, max.y)),
            nearest(Vec2::new(min.x, min.y)),
            nearest(Vec2::new(max.x, min.y)),
        ];

        let weft_hold = edge_points(&params, &corners, |p| (p.x - min.x).abs() <= tol, |p| -p.y);
        let warp_hold = edge_points(&params, &corners, |p| (p.y - max.y).abs() <= tol, |p| p.x);
        let mut pulled = edge_points(&params, &corners, |p| (p.x - max.x).abs() <= tol, |p| -p.y);
        pulled.push(corners[1]);
        pulled.push(corners[3]);
        pulled.sort_unstable();

        Ok(Self {
            corners,
            weft_hold,
            warp_hold,
            pulled,
        })
    }

    /// Corners, then weft hold, then warp hold.
    pub fn list(&self) -> Vec<usize> {
        let mut out = self.corners.to_vec();
        out.extend(&self.weft_hold);
        out.extend(&self.warp_hold);
        out
    }

    /// Which entries of [`list`](Self::list) are held under `setup`.
    pub fn flags(&self, setup: FixSetup) -> Vec<bool> {
        let weft = self.weft_hold.len();
        let warp = self.warp_hold.len();
        let (corners, hold_left) = match setup {
            FixSetup::None => ([false; 4], false),
            FixSetup::Corners => ([true; 4], false),
            FixSetup::Hang => ([true, true, false, false], false),
            FixSetup::Flag | FixSetup::PullTest => ([true, false, true, false], true),
        };
        let mut out = corners.to_vec();
        out.extend(std::iter::repeat(hold_left).take(weft));
        out.extend(std::iter::repeat(false).take(warp));
        out
    }
}

/// Non-corner vertices satisfying `on_edge`, ordered by `key`.
fn edge_points(
    params: &[Vec2],
    corners: &[usize; 4],
    on_edge: impl Fn(Vec2) -> bool,
    key: impl Fn(Vec2) -> f32,
) -> Vec<usize> {
    let mut ids: Vec<usize> = (0..params.len())
        .filter(|&i| on_edge(params[i]) && !corners.contains(&i))
        .collect();
    ids.sort_by(|&a, &b| key(params[a]).total_cmp(&key(params[b])));
    ids
}

/// World direction of the first parameter axis.
pub fn weft_direction(axes: ParamAxes) -> Vec3 {
    match axes {
        ParamAxes::XY | ParamAxes::XZ => Vec3::X,
        ParamAxes::YZ => Vec3::Y,
    }
}

/// The named benchmark suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Vertical sheet held by its two top corners.
    HangingSheet,
    /// Horizontal sheet held at all four corners.
    PinnedSheet,
    /// Vertical sheet held along its left edge.
    Flag,
    /// Horizontal sheet held along its left edge and pulled on the right.
    PullTest,
    /// Horizontal sheet with nothing held.
    FreeFall,
    /// High-resolution horizontal sheet held at its corners.
    HighResDrape,
}

impl ScenarioKind {
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::HangingSheet,
            ScenarioKind::PinnedSheet,
            ScenarioKind::Flag,
            ScenarioKind::PullTest,
            ScenarioKind::FreeFall,
            ScenarioKind::HighResDrape,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::HangingSheet => "hanging_sheet",
            ScenarioKind::PinnedSheet => "pinned_sheet",
            ScenarioKind::Flag => "flag",
            ScenarioKind::PullTest => "pull_test",
            ScenarioKind::FreeFall => "free_fall",
            ScenarioKind::HighResDrape => "high_res_drape",
        }
    }

    pub fn start(&self) -> (StartConfig, FixSetup) {
        match self {
            ScenarioKind::HangingSheet => (StartConfig::LowResXY, FixSetup::Hang),
            ScenarioKind::PinnedSheet => (StartConfig::LowResXZ, FixSetup::Corners),
            ScenarioKind::Flag => (StartConfig::LowResXY, FixSetup::Flag),
            ScenarioKind::PullTest => (StartConfig::LowResXZ, FixSetup::PullTest),
            ScenarioKind::FreeFall => (StartConfig::LowResXZ, FixSetup::None),
            ScenarioKind::HighResDrape => (StartConfig::HighResXZ, FixSetup::Corners),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::all().iter().map(|k| k.name()).collect();
                WeaveError::InvalidConfig(format!(
                    "Unknown scenario '{s}'. Available: {}",
                    names.join(", ")
                ))
            })
    }
}

/// A validated run description with its mesh loaded.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub input: SimulationInput,
    pub mesh: ClothMesh,
    pub fix_points: FixPoints,
}

impl Scenario {
    pub fn from_input(name: impl Into<String>, input: SimulationInput) -> WeaveResult<Self> {
        validate_input(&input)?;
        let mesh = input.mesh.load()?;
        let fix_points = FixPoints::locate(&mesh, input.axes)?;
        Ok(Self {
            name: name.into(),
            input,
            mesh,
            fix_points,
        })
    }

    pub fn from_kind(kind: ScenarioKind) -> WeaveResult<Self> {
        let (start, fix) = kind.start();
        Self::from_input(kind.name(), start.input(fix))
    }

    /// Build the cloth at rest, with the setup's fix points held.
    pub fn build_cloth(&self) -> WeaveResult<Cloth> {
        let material = self.input.material.load()?;
        let mut cloth = Cloth::with_config(material, self.input.solver.clone());
        cloth.init_axes(
            &self.mesh,
            self.input.axes,
            &self.fix_points.list(),
            self.input.params.damping,
        )?;
        cloth.fix_corners(&self.fix_points.flags(self.input.params.fix))?;
        tracing::debug!(
            scenario = %self.name,
            fix = self.input.params.fix.name(),
            fixed = cloth.points().iter().filter(|p| p.is_fixed()).count(),
            "Scenario cloth built"
        );
        Ok(cloth)
    }

    /// Per-point external force for one step. Only a pull test applies
    /// any: `pull_force` along the weft at each point of the right edge.
    pub fn external_forces(&self, cloth: &Cloth) -> Vec<Vec3> {
        let mut forces = vec![Vec3::ZERO; cloth.point_count()];
        if self.input.params.fix == FixSetup::PullTest {
            let pull = weft_direction(self.input.axes) * self.input.params.pull_force;
            for &i in &self.fix_points.pulled {
                if let Some(f) = forces.get_mut(i) {
                    *f = pull;
                }
            }
        }
        forces
    }
}
