//! Mass points and their Jacobian ledger.
//!
//! Each point owns one row of the implicit system: a map from every
//! neighbor it shares a triangle with (itself included) to the 3×3
//! position and velocity Jacobian blocks `∂f_self/∂x_j`, `∂f_self/∂v_j`.
//! The system matrix is never assembled for the CG path; products are
//! taken row by row through [`MassPoint::jacobian_vector_mult`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use weave_math::{Mat3, Vec3};
use weave_types::PointId;

/// Position and velocity Jacobian blocks for one (self, neighbor) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JacobianBlock {
    /// `∂f/∂x`, scaled by `h²` once [`MassPoint::scale_jacobians`] ran.
    pub pos: Mat3,
    /// `∂f/∂v`, scaled by `h` once [`MassPoint::scale_jacobians`] ran.
    pub vel: Mat3,
}

impl Default for JacobianBlock {
    fn default() -> Self {
        Self {
            pos: Mat3::ZERO,
            vel: Mat3::ZERO,
        }
    }
}

/// Which product [`MassPoint::jacobian_vector_mult`] evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Multiply by the system matrix `A` rather than the raw Jacobians.
    pub is_a: bool,
    /// Include the velocity Jacobian.
    pub use_jvel: bool,
    /// Include the point damping term.
    pub use_damping: bool,
}

impl Product {
    /// The raw product used for the right-hand side: `h²Jpos·v`, minus
    /// damping when the system matrix carries it too.
    pub fn rhs(use_damping: bool) -> Self {
        Self {
            is_a: false,
            use_jvel: false,
            use_damping,
        }
    }

    /// The full system matrix `A`.
    pub fn system(use_damping: bool) -> Self {
        Self {
            is_a: true,
            use_jvel: true,
            use_damping,
        }
    }
}

/// A point mass of the cloth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassPoint {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Force accumulated during the current step.
    pub force: Vec3,
    pub mass: f32,
    /// Damping coefficient, applied once per neighbor.
    pub damping: f32,
    fixed: bool,
    jacobians: BTreeMap<PointId, JacobianBlock>,
}

impl MassPoint {
    /// A free point at rest.
    pub fn new(position: Vec3, mass: f32, damping: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            mass,
            damping,
            fixed: false,
            jacobians: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Pin or release the point. Pinning zeroes velocity and force.
    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
        if fixed {
            self.velocity = Vec3::ZERO;
            self.force = Vec3::ZERO;
        }
    }

    /// Accumulate a force. Fixed points accumulate too; the filter drops it.
    #[inline]
    pub fn add_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Zero every ledger block. Entries are kept so the neighbor set
    /// survives between steps.
    pub fn reset_jacobians(&mut self) {
        for block in self.jacobians.values_mut() {
            *block = JacobianBlock::default();
        }
    }

    /// Add to `∂f_self/∂x_j`. Missing entries start at zero.
    pub fn add_jpos(&mut self, j: PointId, m: Mat3) {
        self.jacobians.entry(j).or_default().pos += m;
    }

    /// Add to `∂f_self/∂v_j`. Missing entries start at zero.
    pub fn add_jvel(&mut self, j: PointId, m: Mat3) {
        self.jacobians.entry(j).or_default().vel += m;
    }

    /// Scale every block for a step of size `h`: `Jpos × h²`, `Jvel × h`.
    pub fn scale_jacobians(&mut self, h: f32) {
        let h2 = h * h;
        for block in self.jacobians.values_mut() {
            block.pos *= h2;
            block.vel *= h;
        }
    }

    /// The ledger, ordered by neighbor id.
    pub fn jacobians(&self) -> &BTreeMap<PointId, JacobianBlock> {
        &self.jacobians
    }

    /// Block for neighbor `j`, if any.
    pub fn jacobian(&self, j: PointId) -> Option<&JacobianBlock> {
        self.jacobians.get(&j)
    }

    /// Damping weight `(n − 1)·h·damping`, `n` being the ledger size.
    #[inline]
    pub fn damping_term(&self, h: f32) -> f32 {
        self.jacobians.len().saturating_sub(1) as f32 * h * self.damping
    }

    /// One row of a Jacobian-vector product. `me` is this point's own id and
    /// `vec` holds one entry per cloth point.
    ///
    /// Raw: `Σ Jpos_ij vec_j (+ Σ Jvel_ij vec_j) (− damping_term·vec_i)`.
    ///
    /// System: `mass·vec_i − Σ (Jpos_ij (+ Jvel_ij)) vec_j (+ damping_term·vec_i)`.
    pub fn jacobian_vector_mult(&self, me: PointId, vec: &[Vec3], product: Product, h: f32) -> Vec3 {
        let mut sum = Vec3::ZERO;
        for (&j, block) in &self.jacobians {
            let x = vec[j.index()];
            sum += block.pos * x;
            if product.use_jvel {
                sum += block.vel * x;
            }
        }

        let own = vec[me.index()];
        let damping = if product.use_damping {
            self.damping_term(h) * own
        } else {
            Vec3::ZERO
        };

        if product.is_a {
            self.mass * own - sum + damping
        } else {
            sum - damping
        }
    }

    /// Diagonal of this point's system-matrix row, for the Jacobi preconditioner.
    pub fn diagonal_of_system(&self, me: PointId, use_jvel: bool, use_damping: bool, h: f32) -> Vec3 {
        let mut diag = Vec3::splat(self.mass);
        if let Some(block) = self.jacobians.get(&me) {
            diag -= mat3_diagonal(block.pos);
            if use_jvel {
                diag -= mat3_diagonal(block.vel);
            }
        }
        if use_damping {
            diag += Vec3::splat(self.damping_term(h));
        }
        diag
    }
}

#[inline]
fn mat3_diagonal(m: Mat3) -> Vec3 {
    Vec3::new(m.x_axis.x, m.y_axis.y, m.z_axis.z)
}
