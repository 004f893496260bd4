//! Explicit fourth-order Runge-Kutta on `(x, v)`.
//!
//! Each stage recomputes every force at the stage positions and
//! velocities. No Jacobians are needed. Fixed points get zero
//! acceleration and zero velocity through the filter.

use weave_material::ClothMaterial;
use weave_math::{Mat3, Vec3};

use crate::forces::{air_drag, internal_forces};
use crate::mass_point::MassPoint;
use crate::operator::apply_filter;
use crate::triangle::Triangle;

/// Everything a stage needs besides the state itself.
pub struct Rk4Context<'a> {
    pub material: &'a ClothMaterial,
    pub triangles: &'a [Triangle],
    pub filter: &'a [Mat3],
    pub gravity: Vec3,
    pub air_resistance: f32,
    /// Caller force per point, constant over the step.
    pub external: &'a [Vec3],
}

impl Rk4Context<'_> {
    /// `(ẋ, v̇)` at state `(x, v)`.
    fn derivative(&self, points: &[MassPoint], x: &[Vec3], v: &[Vec3]) -> (Vec<Vec3>, Vec<Vec3>) {
        let mut force = self.external.to_vec();
        internal_forces(self.material, self.triangles, x, &mut force);

        let mut accel: Vec<Vec3> = points
            .iter()
            .zip(force)
            .zip(v)
            .map(|((p, f), vel)| {
                if p.mass <= 0.0 {
                    return Vec3::ZERO;
                }
                let (drag, _) = air_drag(*vel, self.air_resistance);
                (f + drag) / p.mass + self.gravity
            })
            .collect();
        apply_filter(self.filter, &mut accel);

        let mut dx = v.to_vec();
        apply_filter(self.filter, &mut dx);
        (dx, accel)
    }
}

/// Advance `points` by `h`.
pub fn step(points: &mut [MassPoint], ctx: &Rk4Context<'_>, h: f32) {
    let x0: Vec<Vec3> = points.iter().map(|p| p.position).collect();
    let v0: Vec<Vec3> = points.iter().map(|p| p.velocity).collect();

    let (k1x, k1v) = ctx.derivative(points, &x0, &v0);
    let (k2x, k2v) = ctx.derivative(points, &offset(&x0, &k1x, 0.5 * h), &offset(&v0, &k1v, 0.5 * h));
    let (k3x, k3v) = ctx.derivative(points, &offset(&x0, &k2x, 0.5 * h), &offset(&v0, &k2v, 0.5 * h));
    let (k4x, k4v) = ctx.derivative(points, &offset(&x0, &k3x, h), &offset(&v0, &k3v, h));

    let w = h / 6.0;
    for (i, p) in points.iter_mut().enumerate() {
        if p.is_fixed() {
            p.velocity = Vec3::ZERO;
            continue;
        }
        p.position = x0[i] + w * (k1x[i] + 2.0 * k2x[i] + 2.0 * k3x[i] + k4x[i]);
        p.velocity = v0[i] + w * (k1v[i] + 2.0 * k2v[i] + 2.0 * k3v[i] + k4v[i]);
    }
}

/// `base + s·d`, element-wise.
fn offset(base: &[Vec3], d: &[Vec3], s: f32) -> Vec<Vec3> {
    base.iter().zip(d).map(|(b, d)| *b + s * *d).collect()
}
