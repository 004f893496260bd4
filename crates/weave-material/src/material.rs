//! Anisotropic fabric material.

use std::path::Path;

use serde::{Deserialize, Serialize};
use weave_types::{WeaveError, WeaveResult};

use crate::curve::StressCurve;

/// Green strain of a triangle, split along the fabric axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Strain {
    /// Stretch along the weft (u) direction.
    pub weft: f32,
    /// Stretch along the warp (v) direction.
    pub warp: f32,
    /// Shear between weft and warp.
    pub shear: f32,
}

/// Stress (or stress derivative) per fabric axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stress {
    pub weft: f32,
    pub warp: f32,
    pub shear: f32,
}

/// Immutable material description consumed by the cloth.
///
/// | Field | Meaning |
/// |---|---|
/// | `density` | mass per unit rest area |
/// | `weft`, `warp` | tensile response; compression is ignored |
/// | `shear` | signed shear response |
/// | `shear_offset` | lowest shear strain the curve is evaluated at |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothMaterial {
    /// Human-readable name (e.g., "wool").
    pub name: String,
    /// Areal density.
    pub density: f32,
    pub shear_offset: f32,
    pub weft: StressCurve,
    pub warp: StressCurve,
    pub shear: StressCurve,
}

impl ClothMaterial {
    /// Build and validate a material.
    pub fn new(
        name: impl Into<String>,
        density: f32,
        weft: StressCurve,
        warp: StressCurve,
        shear: StressCurve,
        shear_offset: f32,
    ) -> WeaveResult<Self> {
        let material = Self {
            name: name.into(),
            density,
            weft,
            warp,
            shear,
            shear_offset,
        };
        material.validate()?;
        Ok(material)
    }

    /// Checks scalar parameters. Curves are validated when they are built.
    pub fn validate(&self) -> WeaveResult<()> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(WeaveError::InvalidMaterial(format!(
                "Density must be positive, got {}",
                self.density
            )));
        }
        if !self.shear_offset.is_finite() {
            return Err(WeaveError::InvalidMaterial(
                "Shear offset must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Clamp a raw strain into the range the curves are evaluated on:
    /// no compression along weft or warp, shear no lower than `shear_offset`.
    pub fn clamp_strain(&self, strain: Strain) -> Strain {
        Strain {
            weft: strain.weft.max(0.0),
            warp: strain.warp.max(0.0),
            shear: strain.shear.max(self.shear_offset),
        }
    }

    /// Stress at an already clamped strain. Tensile components never go
    /// negative.
    pub fn stress(&self, strain: Strain) -> Stress {
        Stress {
            weft: self.weft.stress(strain.weft).max(0.0),
            warp: self.warp.stress(strain.warp).max(0.0),
            shear: self.shear.stress(strain.shear),
        }
    }

    /// dσ/dε per axis at an already clamped strain.
    pub fn stress_prime(&self, strain: Strain) -> Stress {
        Stress {
            weft: self.weft.derivative(strain.weft),
            warp: self.warp.derivative(strain.warp),
            shear: self.shear.derivative(strain.shear),
        }
    }

    /// Parse a material from TOML.
    pub fn from_toml_str(src: &str) -> WeaveResult<Self> {
        let material: Self =
            toml::from_str(src).map_err(|e| WeaveError::Serialization(e.to_string()))?;
        material.validate()?;
        Ok(material)
    }

    /// Parse a material from JSON.
    pub fn from_json_str(src: &str) -> WeaveResult<Self> {
        let material: Self =
            serde_json::from_str(src).map_err(|e| WeaveError::Serialization(e.to_string()))?;
        material.validate()?;
        Ok(material)
    }

    /// Load a material file; `.json` is read as JSON, anything else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> WeaveResult<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&src),
            _ => Self::from_toml_str(&src),
        }
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> WeaveResult<String> {
        toml::to_string_pretty(self).map_err(|e| WeaveError::Serialization(e.to_string()))
    }
}
