//! Natural cubic spline over a uniformly stepped sample table.
//!
//! Material stress curves are measured at evenly spaced strains, so the
//! spline only needs a start abscissa, a step, and the sampled values.
//! The interpolant passes through every sample and is C² inside the
//! table. Outside the table it continues along the tangent line at the
//! nearest end, which keeps both the value and the slope defined
//! everywhere.
//!
//! Internally everything is evaluated in `f64`; the tables mix values
//! near zero with values in the thousands and the second-derivative
//! solve loses digits in `f32`.

use serde::{Deserialize, Serialize};

/// Interpolating natural cubic spline on a uniform grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicSpline {
    start: f64,
    step: f64,
    values: Vec<f64>,
    /// Second derivatives at each knot (zero at both ends).
    second: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline to `values` sampled at `start + i * step`.
    ///
    /// Requires at least two samples, a positive finite step and finite
    /// sample values.
    pub fn uniform(start: f64, step: f64, values: &[f64]) -> Result<Self, String> {
        if values.len() < 2 {
            return Err(format!(
                "A spline needs at least 2 samples, got {}",
                values.len()
            ));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(format!("Sample step must be positive, got {step}"));
        }
        if !start.is_finite() {
            return Err("Sample start must be finite".into());
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(format!("Sample {i} is not finite"));
        }

        let second = natural_second_derivatives(step, values);

        Ok(Self {
            start,
            step,
            values: values.to_vec(),
            second,
        })
    }

    /// Returns `(first, last)` abscissa covered by the samples.
    pub fn domain(&self) -> (f64, f64) {
        (self.start, self.start + self.step * (self.values.len() - 1) as f64)
    }

    /// Number of samples in the table.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Interpolated value at `x`.
    pub fn value(&self, x: f64) -> f64 {
        let (lo, hi) = self.domain();
        if x < lo {
            return self.values[0] + self.end_slope(false) * (x - lo);
        }
        if x > hi {
            let last = self.values[self.values.len() - 1];
            return last + self.end_slope(true) * (x - hi);
        }

        let (i, t) = self.locate(x);
        let a = 1.0 - t;
        let b = t;
        let h2 = self.step * self.step / 6.0;
        a * self.values[i]
            + b * self.values[i + 1]
            + ((a * a * a - a) * self.second[i] + (b * b * b - b) * self.second[i + 1]) * h2
    }

    /// First derivative of the interpolant at `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        let (lo, hi) = self.domain();
        if x < lo {
            return self.end_slope(false);
        }
        if x > hi {
            return self.end_slope(true);
        }

        let (i, t) = self.locate(x);
        self.segment_slope(i, t)
    }

    /// Segment index and local parameter `t ∈ [0, 1]` for an in-domain `x`.
    fn locate(&self, x: f64) -> (usize, f64) {
        let segments = self.values.len() - 1;
        let s = (x - self.start) / self.step;
        let i = (s.floor().max(0.0) as usize).min(segments - 1);
        let t = (s - i as f64).clamp(0.0, 1.0);
        (i, t)
    }

    fn segment_slope(&self, i: usize, t: f64) -> f64 {
        let a = 1.0 - t;
        let b = t;
        (self.values[i + 1] - self.values[i]) / self.step
            + self.step / 6.0
                * ((1.0 - 3.0 * a * a) * self.second[i] + (3.0 * b * b - 1.0) * self.second[i + 1])
    }

    fn end_slope(&self, upper: bool) -> f64 {
        if upper {
            self.segment_slope(self.values.len() - 2, 1.0)
        } else {
            self.segment_slope(0, 0.0)
        }
    }
}

/// Solve the tridiagonal system for the knot second derivatives of a
/// natural spline (`M₀ = Mₙ = 0`) using the Thomas algorithm.
///
/// Interior rows read `M[i-1] + 4 M[i] + M[i+1] = 6/h² (y[i-1] - 2 y[i] + y[i+1])`.
fn natural_second_derivatives(step: f64, y: &[f64]) -> Vec<f64> {
    let n = y.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }

    let interior = n - 2;
    let scale = 6.0 / (step * step);
    let mut diag = vec![4.0; interior];
    let mut rhs: Vec<f64> = (1..n - 1)
        .map(|i| scale * (y[i - 1] - 2.0 * y[i] + y[i + 1]))
        .collect();

    // Forward sweep (sub- and super-diagonals are all 1)
    for k in 1..interior {
        let w = 1.0 / diag[k - 1];
        diag[k] -= w;
        rhs[k] -= w * rhs[k - 1];
    }

    // Back substitution
    m[interior] = rhs[interior - 1] / diag[interior - 1];
    for k in (0..interior - 1).rev() {
        m[k + 1] = (rhs[k] - m[k + 2]) / diag[k];
    }

    m
}
