//! Stress as a function of strain, from a measured table.

use serde::{Deserialize, Serialize};
use weave_math::CubicSpline;
use weave_types::{WeaveError, WeaveResult};

/// Serialized form of a stress curve: samples at `start + i * step`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSpec {
    /// Strain of the first sample.
    pub start: f32,
    /// Strain spacing between samples.
    pub step: f32,
    /// Stress values.
    pub samples: Vec<f32>,
}

/// A stress/strain response curve.
///
/// Strains below the first sample are clamped to it. Past the last sample
/// the curve continues linearly with its terminal slope, so stiff fabrics
/// keep resisting instead of going flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveSpec", into = "CurveSpec")]
pub struct StressCurve {
    spec: CurveSpec,
    spline: CubicSpline,
}

impl StressCurve {
    /// Fit a curve to a uniformly stepped table.
    pub fn new(start: f32, step: f32, samples: &[f32]) -> WeaveResult<Self> {
        Self::from_spec(CurveSpec {
            start,
            step,
            samples: samples.to_vec(),
        })
    }

    /// Fit a curve from its serialized form.
    pub fn from_spec(spec: CurveSpec) -> WeaveResult<Self> {
        let values: Vec<f64> = spec.samples.iter().map(|&s| s as f64).collect();
        let spline = CubicSpline::uniform(spec.start as f64, spec.step as f64, &values)
            .map_err(WeaveError::InvalidMaterial)?;
        Ok(Self { spec, spline })
    }

    /// Serialized form.
    pub fn spec(&self) -> &CurveSpec {
        &self.spec
    }

    /// Strain of the first sample.
    pub fn start(&self) -> f32 {
        self.spec.start
    }

    /// `(first, last)` sampled strain.
    pub fn domain(&self) -> (f32, f32) {
        let (lo, hi) = self.spline.domain();
        (lo as f32, hi as f32)
    }

    /// Stress at `strain`.
    pub fn stress(&self, strain: f32) -> f32 {
        self.spline.value(self.clamp_low(strain)) as f32
    }

    /// dσ/dε at `strain`.
    pub fn derivative(&self, strain: f32) -> f32 {
        self.spline.derivative(self.clamp_low(strain)) as f32
    }

    fn clamp_low(&self, strain: f32) -> f64 {
        (strain as f64).max(self.spline.domain().0)
    }
}

impl TryFrom<CurveSpec> for StressCurve {
    type Error = WeaveError;

    fn try_from(spec: CurveSpec) -> WeaveResult<Self> {
        Self::from_spec(spec)
    }
}

impl From<StressCurve> for CurveSpec {
    fn from(curve: StressCurve) -> Self {
        curve.spec
    }
}
