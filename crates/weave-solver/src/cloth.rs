//! The cloth: points, triangles, constraints, and the per-step pipeline.
//!
//! ```text
//! let mut cloth = Cloth::new(material);
//! cloth.init_axes(&mesh, ParamAxes::XZ, &corners, damping)?;
//! cloth.fix_corners(&[true, true, false, false])?;
//! loop {
//!     cloth.update(h, &external)?;
//! }
//! ```
//!
//! One [`Cloth::update`]:
//! 1. Zero forces and Jacobian ledgers.
//! 2. Triangle forces and position Jacobians.
//! 3. Gravity, air drag (with its velocity Jacobian), caller forces.
//! 4. Integrate with the configured scheme.
//! 5. Refresh the triangles' cached positions.

use std::io::Write;
use std::time::Instant;

use weave_material::ClothMaterial;
use weave_math::sparse::CsrMatrix;
use weave_math::{Mat3, Vec2, Vec3};
use weave_mesh::normals::vertex_normals;
use weave_mesh::obj::write_obj;
use weave_mesh::{ClothMesh, Face};
use weave_types::{PointId, WeaveError, WeaveResult};

use crate::cg::{self, CgParams};
use crate::config::{Integration, SolverConfig};
use crate::direct;
use crate::forces::{accumulate_internal, air_drag, energy_density, green_strain, triangle_response};
use crate::mass_point::{MassPoint, Product};
use crate::operator::{filter_block, system_product};
use crate::render::{flatten, render_vertices, RenderVertex};
use crate::rk4::{self, Rk4Context};
use crate::strategy::StepResult;
use crate::triangle::{ParamAxes, Triangle};

/// A simulated piece of cloth.
#[derive(Debug, Clone)]
pub struct Cloth {
    material: ClothMaterial,
    config: SolverConfig,
    points: Vec<MassPoint>,
    triangles: Vec<Triangle>,
    /// UV pool and per-triangle UV indices, kept for export.
    uvs: Vec<Vec2>,
    uv_faces: Vec<[u32; 3]>,
    corners: Vec<PointId>,
    /// Identity for free points, zero for fixed ones.
    filter: Vec<Mat3>,
    steps: u64,
}

impl Cloth {
    /// An empty cloth with the default solver configuration.
    pub fn new(material: ClothMaterial) -> Self {
        Self::with_config(material, SolverConfig::default())
    }

    /// An empty cloth.
    pub fn with_config(material: ClothMaterial, config: SolverConfig) -> Self {
        Self {
            material,
            config,
            points: Vec::new(),
            triangles: Vec::new(),
            uvs: Vec::new(),
            uv_faces: Vec::new(),
            corners: Vec::new(),
            filter: Vec::new(),
            steps: 0,
        }
    }

    /// Build points and triangles from `mesh`, replacing any previous state.
    ///
    /// `to_param` maps rest positions to fabric coordinates and must
    /// preserve triangle areas. `corners` lists the point indices that
    /// [`fix_corners`](Self::fix_corners) addresses, in order. Nothing is
    /// modified unless every input is valid.
    pub fn init<F>(&mut self, mesh: &ClothMesh, to_param: F, corners: &[usize], damping: f32) -> WeaveResult<()>
    where
        F: Fn(Vec3) -> Vec2,
    {
        mesh.validate()?;
        self.material.validate()?;
        if !(damping.is_finite() && damping >= 0.0) {
            return Err(WeaveError::InvalidConfig(format!(
                "Damping must be non-negative, got {damping}"
            )));
        }
        let n = mesh.vertex_count();
        if let Some(&c) = corners.iter().find(|&&c| c >= n) {
            return Err(WeaveError::InvalidConfig(format!(
                "Corner {c} is out of range (vertex count: {n})"
            )));
        }

        let mut triangles = Vec::with_capacity(mesh.triangle_count());
        for (t, face) in mesh.faces.iter().enumerate() {
            let ids = face.vertices.map(PointId);
            let mut tri = Triangle::new(ids, mesh.face_positions(t), mesh.face_uvs(t));
            tri.compute_r(&to_param)?;
            triangles.push(tri);
        }

        let mut mass = vec![0.0f32; n];
        for tri in &triangles {
            let share = tri.rest_area() * self.material.density / 3.0;
            for id in tri.points {
                mass[id.index()] += share;
            }
        }
        let isolated = mass.iter().filter(|&&m| m == 0.0).count();
        if isolated > 0 {
            tracing::warn!(isolated, "Mesh has vertices that belong to no triangle");
        }

        self.points = mesh
            .positions
            .iter()
            .zip(mass)
            .map(|(&p, m)| MassPoint::new(p, m, damping))
            .collect();
        self.triangles = triangles;
        self.uvs = mesh.uvs.clone();
        self.uv_faces = mesh.faces.iter().map(|f| f.uvs).collect();
        self.corners = corners.iter().map(|&c| PointId::from(c)).collect();
        self.filter = vec![Mat3::IDENTITY; n];
        self.steps = 0;

        tracing::debug!(
            points = self.points.len(),
            triangles = self.triangles.len(),
            total_mass = self.total_mass(),
            "Cloth initialized"
        );
        Ok(())
    }

    /// [`init`](Self::init) with a fixed-axis parametrization.
    pub fn init_axes(&mut self, mesh: &ClothMesh, axes: ParamAxes, corners: &[usize], damping: f32) -> WeaveResult<()> {
        self.init(mesh, |p| axes.project(p), corners, damping)
    }

    /// Add a free point that belongs to no triangle.
    pub fn insert_point(&mut self, position: Vec3, mass: f32) -> WeaveResult<PointId> {
        if !position.is_finite() {
            return Err(WeaveError::InvalidConfig("Point position must be finite".into()));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(WeaveError::InvalidConfig(format!(
                "Point mass must be positive, got {mass}"
            )));
        }
        let id = PointId::from(self.points.len());
        self.points.push(MassPoint::new(position, mass, 0.0));
        self.filter.push(Mat3::IDENTITY);
        Ok(id)
    }

    /// Remove every point, triangle and constraint.
    pub fn clear(&mut self) {
        self.points.clear();
        self.triangles.clear();
        self.uvs.clear();
        self.uv_faces.clear();
        self.corners.clear();
        self.filter.clear();
        self.steps = 0;
    }

    // ─── Stepping ─────────────────────────────────────────────

    /// Advance by `h` with one external force per point.
    ///
    /// A step that would leave any point non-finite is discarded: positions
    /// and velocities are restored and `InvariantViolation` is returned.
    pub fn update(&mut self, h: f32, external: &[Vec3]) -> WeaveResult<StepResult> {
        if !(h.is_finite() && h > 0.0) {
            return Err(WeaveError::InvalidConfig(format!(
                "Timestep must be positive, got {h}"
            )));
        }
        if external.len() != self.points.len() {
            return Err(WeaveError::InvalidConfig(format!(
                "External force count ({}) != point count ({})",
                external.len(),
                self.points.len()
            )));
        }
        if !external.iter().all(|f| f.is_finite()) {
            return Err(WeaveError::InvalidConfig("External forces must be finite".into()));
        }
        self.config.validate()?;

        let start = Instant::now();
        let committed: Vec<(Vec3, Vec3)> = self
            .points
            .iter()
            .map(|p| (p.position, p.velocity))
            .collect();
        let mut result = match self.config.integration {
            Integration::Rk4 => {
                let ctx = Rk4Context {
                    material: &self.material,
                    triangles: &self.triangles,
                    filter: &self.filter,
                    gravity: self.config.gravity_vec(),
                    air_resistance: self.config.air_resistance,
                    external,
                };
                rk4::step(&mut self.points, &ctx, h);
                StepResult::explicit(0.0)
            }
            Integration::ConjugateGradient => {
                let mut b = self.prepare_implicit(h, external);
                let max_iterations = self
                    .config
                    .max_cg_iterations
                    .unwrap_or(self.points.len().max(1) as u32);
                let (dv, outcome) = cg::solve(
                    &self.points,
                    &self.filter,
                    &mut b,
                    CgParams {
                        h,
                        use_damping: self.config.use_damping,
                        tolerance: self.config.cg_tolerance,
                        max_iterations,
                    },
                );
                self.apply_velocity_change(h, &dv);
                StepResult {
                    integration: Integration::ConjugateGradient,
                    iterations: outcome.iterations,
                    final_residual: outcome.residual,
                    converged: outcome.converged,
                    wall_time: 0.0,
                    residual_history: outcome.history,
                }
            }
            Integration::DirectCholesky => {
                let b = self.prepare_implicit(h, external);
                let dv = if self.points.is_empty() {
                    Vec::new()
                } else {
                    direct::solve(&self.points, &b, h, self.config.use_damping)?
                };
                self.apply_velocity_change(h, &dv);
                StepResult {
                    integration: Integration::DirectCholesky,
                    iterations: 1,
                    final_residual: 0.0,
                    converged: true,
                    wall_time: 0.0,
                    residual_history: Vec::new(),
                }
            }
        };

        if let Some(i) = self
            .points
            .iter()
            .position(|p| !(p.position.is_finite() && p.velocity.is_finite()))
        {
            for (p, &(x, v)) in self.points.iter_mut().zip(&committed) {
                p.position = x;
                p.velocity = v;
            }
            return Err(WeaveError::InvariantViolation(format!(
                "Point {i} has a non-finite state after step {}; step discarded",
                self.steps + 1
            )));
        }

        self.refresh_triangles();
        self.steps += 1;

        result.wall_time = start.elapsed().as_secs_f64();
        tracing::debug!(
            step = self.steps,
            iterations = result.iterations,
            residual = result.final_residual,
            converged = result.converged,
            "Cloth step"
        );
        Ok(result)
    }

    /// Steps 1–3 of the pipeline plus Jacobian scaling. Returns the
    /// right-hand side `b = h f + h² Jpos v (− damping·v)` (unfiltered).
    fn prepare_implicit(&mut self, h: f32, external: &[Vec3]) -> Vec<Vec3> {
        for p in &mut self.points {
            p.force = Vec3::ZERO;
            p.reset_jacobians();
        }

        accumulate_internal(&self.material, &self.triangles, &mut self.points);

        let gravity = self.config.gravity_vec();
        let air = self.config.air_resistance;
        for (i, (p, ext)) in self.points.iter_mut().zip(external).enumerate() {
            let (drag, jvel) = air_drag(p.velocity, air);
            p.add_force(gravity * p.mass + drag + *ext);
            p.add_jvel(PointId::from(i), jvel);
        }

        for p in &mut self.points {
            p.scale_jacobians(h);
        }

        let velocities: Vec<Vec3> = self.points.iter().map(|p| p.velocity).collect();
        let mut b = vec![Vec3::ZERO; self.points.len()];
        system_product(
            &self.points,
            &velocities,
            Product::rhs(self.config.use_damping),
            h,
            &mut b,
        );
        for (bi, p) in b.iter_mut().zip(&self.points) {
            *bi += h * p.force;
        }
        b
    }

    fn apply_velocity_change(&mut self, h: f32, dv: &[Vec3]) {
        for (p, d) in self.points.iter_mut().zip(dv) {
            if p.is_fixed() {
                p.velocity = Vec3::ZERO;
                continue;
            }
            p.velocity += *d;
            p.position += h * p.velocity;
        }
    }

    fn refresh_triangles(&mut self) {
        for tri in &mut self.triangles {
            let v = tri.points.map(|id| self.points[id.index()].position);
            tri.set_vertices(v);
        }
    }

    /// The implicit system `A` at the current state for a step of `h`, with
    /// fixed rows and columns replaced by the identity. Rebuilds the
    /// Jacobian ledgers as a step would, without integrating.
    pub fn assemble_system_matrix(&mut self, h: f32) -> WeaveResult<CsrMatrix> {
        if !(h.is_finite() && h > 0.0) {
            return Err(WeaveError::InvalidConfig(format!(
                "Timestep must be positive, got {h}"
            )));
        }
        let external = vec![Vec3::ZERO; self.points.len()];
        self.prepare_implicit(h, &external);
        Ok(direct::assemble(&self.points, h, self.config.use_damping))
    }

    // ─── Constraints ──────────────────────────────────────────

    /// Fix or release each corner. `fixed` pairs with the corner list
    /// given to [`init`](Self::init).
    pub fn fix_corners(&mut self, fixed: &[bool]) -> WeaveResult<()> {
        if fixed.len() != self.corners.len() {
            return Err(WeaveError::InvalidConfig(format!(
                "Expected {} corner flags, got {}",
                self.corners.len(),
                fixed.len()
            )));
        }
        for (k, &flag) in fixed.iter().enumerate() {
            let id = self.corners[k];
            self.set_point_fixed(id.index(), flag)?;
        }
        Ok(())
    }

    /// Fixed state of each corner, in corner-list order.
    pub fn is_corner_fixed(&self) -> Vec<bool> {
        self.corners
            .iter()
            .map(|id| self.points[id.index()].is_fixed())
            .collect()
    }

    /// Fix or release one point.
    pub fn set_point_fixed(&mut self, index: usize, fixed: bool) -> WeaveResult<()> {
        self.check_index(index)?;
        self.points[index].set_fixed(fixed);
        self.filter[index] = filter_block(fixed);
        Ok(())
    }

    /// Move a point, leaving its velocity alone. Triangle caches follow.
    pub fn set_point_position(&mut self, index: usize, position: Vec3) -> WeaveResult<()> {
        self.check_index(index)?;
        if !position.is_finite() {
            return Err(WeaveError::InvalidConfig("Point position must be finite".into()));
        }
        self.points[index].position = position;
        let id = PointId::from(index);
        for tri in self.triangles.iter_mut().filter(|t| t.points.contains(&id)) {
            let v = tri.points.map(|p| self.points[p.index()].position);
            tri.set_vertices(v);
        }
        Ok(())
    }

    /// Set a free point's velocity. Fixed points reject this.
    pub fn set_point_velocity(&mut self, index: usize, velocity: Vec3) -> WeaveResult<()> {
        self.check_index(index)?;
        if self.points[index].is_fixed() {
            return Err(WeaveError::InvalidConfig(format!(
                "Point {index} is fixed and cannot move"
            )));
        }
        if !velocity.is_finite() {
            return Err(WeaveError::InvalidConfig("Point velocity must be finite".into()));
        }
        self.points[index].velocity = velocity;
        Ok(())
    }

    /// Overwrite positions and velocities, e.g. from a snapshot.
    /// Velocities of fixed points are forced to zero.
    pub fn set_state(&mut self, positions: &[Vec3], velocities: &[Vec3]) -> WeaveResult<()> {
        let n = self.points.len();
        if positions.len() != n || velocities.len() != n {
            return Err(WeaveError::InvalidConfig(format!(
                "State lengths ({}, {}) != point count ({n})",
                positions.len(),
                velocities.len()
            )));
        }
        for (p, (&x, &v)) in self.points.iter_mut().zip(positions.iter().zip(velocities)) {
            p.position = x;
            p.velocity = if p.is_fixed() { Vec3::ZERO } else { v };
        }
        self.refresh_triangles();
        Ok(())
    }

    fn check_index(&self, index: usize) -> WeaveResult<()> {
        if index >= self.points.len() {
            return Err(WeaveError::InvalidConfig(format!(
                "Point {index} is out of range (point count: {})",
                self.points.len()
            )));
        }
        Ok(())
    }

    // ─── Accessors ────────────────────────────────────────────

    pub fn material(&self) -> &ClothMaterial {
        &self.material
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    pub fn points(&self) -> &[MassPoint] {
        &self.points
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn corners(&self) -> &[PointId] {
        &self.corners
    }

    /// Per-point constraint filter.
    pub fn filter(&self) -> &[Mat3] {
        &self.filter
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Completed steps since the last `init` or `clear`.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn velocities(&self) -> Vec<Vec3> {
        self.points.iter().map(|p| p.velocity).collect()
    }

    // ─── Diagnostics ──────────────────────────────────────────

    pub fn total_mass(&self) -> f32 {
        self.points.iter().map(|p| p.mass).sum()
    }

    /// `Σ ½ m |v|²`.
    pub fn kinetic_energy(&self) -> f64 {
        self.points
            .iter()
            .map(|p| 0.5 * p.mass as f64 * p.velocity.length_squared() as f64)
            .sum()
    }

    /// Gravitational potential `−Σ m g·x` under the configured gravity.
    pub fn potential_energy(&self) -> f64 {
        let g = self.config.gravity_vec();
        self.points
            .iter()
            .map(|p| -(p.mass as f64) * g.dot(p.position) as f64)
            .sum()
    }

    /// `Σ A · ½ σ·ε` over triangles at their cached positions.
    pub fn elastic_energy(&self) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let r = triangle_response(&self.material, tri.ru(), tri.rv(), tri.rest_area(), tri.vertices());
                tri.rest_area() as f64 * energy_density(r.strain, r.stress) as f64
            })
            .sum()
    }

    /// Largest absolute strain component over all triangles.
    pub fn max_strain(&self) -> f32 {
        self.triangles
            .iter()
            .map(|tri| {
                let (u, v) = tri.weft_warp(tri.vertices());
                let s = green_strain(u, v);
                s.weft.abs().max(s.warp.abs()).max(s.shear.abs())
            })
            .fold(0.0, f32::max)
    }

    // ─── Output ───────────────────────────────────────────────

    /// Three vertices per triangle.
    pub fn render(&self) -> Vec<RenderVertex> {
        render_vertices(&self.triangles, self.points.len())
    }

    /// [`render`](Self::render) interleaved as 8 floats per vertex.
    pub fn render_flat(&self) -> Vec<f32> {
        flatten(&self.render())
    }

    /// Current shape as a mesh, UVs as loaded.
    pub fn to_mesh(&self) -> ClothMesh {
        let positions = self.positions();
        let faces: Vec<Face> = self
            .triangles
            .iter()
            .zip(&self.uv_faces)
            .map(|(tri, &uvs)| Face {
                vertices: tri.points.map(|id| id.0),
                uvs,
            })
            .collect();
        let normals = vertex_normals(&positions, &faces);
        ClothMesh {
            positions,
            uvs: self.uvs.clone(),
            normals,
            faces,
        }
    }

    /// Write the current shape as OBJ.
    pub fn write_obj<W: Write>(&self, out: W) -> WeaveResult<()> {
        write_obj(&self.to_mesh(), out)
    }
}
