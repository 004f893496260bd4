//! Input and mesh validation.
//!
//! Runs before a cloth is built so that bad run files fail with a clear
//! message instead of surfacing as a solver error later.

use serde::Serialize;
use weave_mesh::ClothMesh;
use weave_solver::ParamAxes;
use weave_types::constants::DEGENERATE_AREA_THRESHOLD;
use weave_types::{WeaveError, WeaveResult};

use crate::contract::{MeshSource, SimulationInput, SimulationParams};

/// Checks a run description without touching the filesystem.
///
/// - the solver configuration is valid
/// - time stepping is positive and finite, and `dt` is at most one second
/// - damping and pull force are finite, damping non-negative
/// - generated grids have at least one quad and positive extent
/// - file references are non-empty
pub fn validate_input(input: &SimulationInput) -> WeaveResult<()> {
    input.solver.validate()?;
    validate_params(&input.params)?;

    match &input.mesh {
        MeshSource::Grid {
            cols,
            rows,
            width,
            height,
            ..
        } => {
            if *cols == 0 || *rows == 0 {
                return Err(WeaveError::InvalidConfig(format!(
                    "Grid needs at least one quad per side, got {cols}×{rows}"
                )));
            }
            if !(width.is_finite() && *width > 0.0 && height.is_finite() && *height > 0.0) {
                return Err(WeaveError::InvalidConfig(format!(
                    "Grid extent must be positive, got {width}×{height}"
                )));
            }
        }
        MeshSource::Obj { path } => {
            if path.as_os_str().is_empty() {
                return Err(WeaveError::InvalidConfig("Mesh path is empty".into()));
            }
        }
    }

    if let crate::contract::MaterialSource::File { path } = &input.material {
        if path.as_os_str().is_empty() {
            return Err(WeaveError::InvalidConfig("Material path is empty".into()));
        }
    }

    Ok(())
}

fn validate_params(params: &SimulationParams) -> WeaveResult<()> {
    if !(params.dt.is_finite() && params.dt > 0.0) {
        return Err(WeaveError::InvalidConfig(format!(
            "Timestep must be positive, got {}",
            params.dt
        )));
    }
    if params.dt > 1.0 {
        return Err(WeaveError::InvalidConfig(format!(
            "Timestep {} s is unreasonably large",
            params.dt
        )));
    }
    if params.steps == 0 {
        return Err(WeaveError::InvalidConfig("Step count must be at least 1".into()));
    }
    if !(params.damping.is_finite() && params.damping >= 0.0) {
        return Err(WeaveError::InvalidConfig(format!(
            "Damping must be non-negative, got {}",
            params.damping
        )));
    }
    if !params.pull_force.is_finite() {
        return Err(WeaveError::InvalidConfig("Pull force must be finite".into()));
    }
    Ok(())
}

/// Summary of a mesh as the cloth would see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshReport {
    pub vertices: usize,
    pub triangles: usize,
    pub total_area: f32,
    /// Vertices referenced by no face; they would get zero mass.
    pub isolated_vertices: usize,
    /// Faces with (near) zero area in space or in the parameter plane.
    /// The first kind stops a cloth from being built, the second leaves
    /// the face without stiffness.
    pub degenerate_faces: Vec<usize>,
}

impl MeshReport {
    pub fn is_usable(&self) -> bool {
        self.triangles > 0 && self.degenerate_faces.is_empty()
    }
}

/// Validate `mesh` and report how it parametrizes under `axes`.
pub fn inspect_mesh(mesh: &ClothMesh, axes: ParamAxes) -> WeaveResult<MeshReport> {
    mesh.validate()?;

    let mut used = vec![false; mesh.vertex_count()];
    let mut degenerate_faces = Vec::new();
    for (f, face) in mesh.faces.iter().enumerate() {
        for &v in &face.vertices {
            used[v as usize] = true;
        }
        let [p0, p1, p2] = mesh.face_positions(f);
        let spatial = 0.5 * (p1 - p0).cross(p2 - p0).length();
        let [a, b, c] = [p0, p1, p2].map(|p| axes.project(p));
        let planar = 0.5 * (b - a).perp_dot(c - a).abs();
        if spatial < DEGENERATE_AREA_THRESHOLD || planar < DEGENERATE_AREA_THRESHOLD {
            degenerate_faces.push(f);
        }
    }

    let report = MeshReport {
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        total_area: mesh.total_area(),
        isolated_vertices: used.iter().filter(|&&u| !u).count(),
        degenerate_faces,
    };
    if !report.degenerate_faces.is_empty() {
        tracing::warn!(
            count = report.degenerate_faces.len(),
            ?axes,
            "Faces are degenerate in the parameter plane"
        );
    }
    Ok(report)
}
