//! Material database with measured fabric presets.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use weave_types::{WeaveError, WeaveResult};

use crate::curve::StressCurve;
use crate::material::ClothMaterial;

/// Built-in material presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    /// Woven wool, measured on a tensile tester.
    Wool,
}

impl MaterialKind {
    /// Every preset.
    pub const ALL: [MaterialKind; 1] = [MaterialKind::Wool];

    /// Lookup name.
    pub fn name(self) -> &'static str {
        match self {
            MaterialKind::Wool => "wool",
        }
    }

    /// Build the preset's material.
    pub fn material(self) -> WeaveResult<ClothMaterial> {
        match self {
            MaterialKind::Wool => wool(),
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MaterialKind {
    type Err = WeaveError;

    fn from_str(s: &str) -> WeaveResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| WeaveError::InvalidMaterial(format!("Unknown material '{s}'")))
    }
}

impl ClothMaterial {
    /// Build a preset.
    pub fn from_kind(kind: MaterialKind) -> WeaveResult<Self> {
        kind.material()
    }
}

/// A named collection of materials.
///
/// Lookups are by name (e.g., "wool"). Custom materials can be
/// registered at runtime.
#[derive(Debug, Clone)]
pub struct MaterialDatabase {
    materials: HashMap<String, ClothMaterial>,
}

impl MaterialDatabase {
    /// Creates a database holding every [`MaterialKind`] preset.
    pub fn with_defaults() -> WeaveResult<Self> {
        let mut db = Self::empty();
        for kind in MaterialKind::ALL {
            db.register(kind.material()?);
        }
        Ok(db)
    }

    /// Creates an empty database.
    pub fn empty() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    /// Registers a material. Overwrites if the name already exists.
    pub fn register(&mut self, material: ClothMaterial) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Looks up a material by name. Returns `None` if not found.
    pub fn get(&self, name: &str) -> Option<&ClothMaterial> {
        self.materials.get(name)
    }

    /// Returns all registered material names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns true if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

// ─── Built-in Presets ─────────────────────────────────────────────────

const WOOL_DENSITY: f32 = 0.15;
const WOOL_SHEAR_OFFSET: f32 = -0.14;

const WOOL_WEFT_STEP: f32 = 0.004078;
const WOOL_WEFT: [f32; 29] = [
    0.0, 1.494023904, 3.472222222, 9.881422925, 14.76377953, 24.50980392, 29.296875,
    38.91050584, 48.4496124, 57.91505792, 67.30769231, 81.41762452, 95.41984733, 118.8212928,
    146.780303, 183.9622642, 211.4661654, 238.7640449, 275.1865672, 315.9851301, 365.7407407,
    433.5793358, 510.1102941, 581.5018315, 656.9343066, 759.0909091, 851.4492754, 956.6787004,
    1052.158273,
];

const WOOL_WARP_STEP: f32 = 0.00048614;
const WOOL_WARP: [f32; 29] = [
    0.0, 7.996001999, 15.98401598, 19.97004493, 33.93213573, 41.89526185, 49.85044865,
    59.79073244, 79.6812749, 99.55201593, 119.4029851, 159.1248135, 198.8071571, 258.3209141,
    357.4975174, 416.8734491, 476.1904762, 614.7744175, 733.3994054, 911.3422486, 1069.306931,
    1197.427016, 1404.549951, 1601.581809, 1897.233202, 2133.333333, 2388.943731, 2723.23631,
    2998.027613,
];

const WOOL_SHEAR_STEP: f32 = 0.01;
const WOOL_SHEAR: [f32; 29] = [
    -59.986, -50.987, -44.488, -37.989, -32.99, -28.991, -24.992, -20.493, -16.994, -12.995,
    -9.496, -4.997, -2.998, -0.999, 0.0, 0.999, 2.998, 4.997, 9.496, 12.995, 16.994, 20.493,
    24.992, 28.991, 32.99, 37.989, 44.488, 50.987, 59.986,
];

/// Wool: stiff warp, softer weft, symmetric shear centered on zero.
fn wool() -> WeaveResult<ClothMaterial> {
    ClothMaterial::new(
        MaterialKind::Wool.name(),
        WOOL_DENSITY,
        StressCurve::new(0.0, WOOL_WEFT_STEP, &WOOL_WEFT)?,
        StressCurve::new(0.0, WOOL_WARP_STEP, &WOOL_WARP)?,
        StressCurve::new(WOOL_SHEAR_OFFSET, WOOL_SHEAR_STEP, &WOOL_SHEAR)?,
        WOOL_SHEAR_OFFSET,
    )
}
