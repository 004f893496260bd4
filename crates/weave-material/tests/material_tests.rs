//! Integration tests for weave-material.

use weave_material::{ClothMaterial, MaterialDatabase, MaterialKind, StressCurve, Strain};
use weave_types::WeaveError;

fn wool() -> ClothMaterial {
    ClothMaterial::from_kind(MaterialKind::Wool).unwrap()
}

// ─── StressCurve Tests ────────────────────────────────────────

#[test]
fn curve_passes_through_samples() {
    let curve = StressCurve::new(0.0, 0.1, &[0.0, 1.0, 3.0, 7.0]).unwrap();
    assert!((curve.stress(0.1) - 1.0).abs() < 1e-5);
    assert!((curve.stress(0.3) - 7.0).abs() < 1e-5);
}

#[test]
fn curve_clamps_below_start() {
    let curve = StressCurve::new(0.0, 0.1, &[0.0, 1.0, 3.0, 7.0]).unwrap();
    assert_eq!(curve.stress(-0.5), curve.stress(0.0));
    assert_eq!(curve.derivative(-0.5), curve.derivative(0.0));
}

#[test]
fn curve_extends_past_table() {
    let curve = StressCurve::new(0.0, 0.1, &[0.0, 1.0, 3.0, 7.0]).unwrap();
    let slope = curve.derivative(0.3);
    let far = curve.stress(0.5);
    assert!((far - (7.0 + 0.2 * slope)).abs() < 1e-3);
    assert!(far > 7.0);
}

#[test]
fn curve_rejects_bad_tables() {
    assert!(matches!(
        StressCurve::new(0.0, 0.1, &[1.0]),
        Err(WeaveError::InvalidMaterial(_))
    ));
    assert!(StressCurve::new(0.0, -0.1, &[0.0, 1.0]).is_err());
    assert!(StressCurve::new(0.0, 0.1, &[0.0, f32::INFINITY]).is_err());
}

// ─── ClothMaterial Tests ──────────────────────────────────────

#[test]
fn wool_preset_parameters() {
    let m = wool();
    assert_eq!(m.name, "wool");
    assert!((m.density - 0.15).abs() < 1e-7);
    assert!((m.shear_offset + 0.14).abs() < 1e-7);
    let (lo, hi) = m.shear.domain();
    assert!((lo + 0.14).abs() < 1e-6);
    assert!((hi - 0.14).abs() < 1e-5);
    let (_, weft_hi) = m.weft.domain();
    assert!((weft_hi - 28.0 * 0.004078).abs() < 1e-5);
}

#[test]
fn clamp_strain_rules() {
    let m = wool();
    let c = m.clamp_strain(Strain {
        weft: -0.2,
        warp: 0.01,
        shear: -0.5,
    });
    assert_eq!(c.weft, 0.0);
    assert_eq!(c.warp, 0.01);
    assert!((c.shear + 0.14).abs() < 1e-7);
}

#[test]
fn rest_strain_gives_near_zero_stress() {
    let m = wool();
    let s = m.stress(Strain::default());
    assert!(s.weft.abs() < 1e-4);
    assert!(s.warp.abs() < 1e-4);
    assert!(s.shear.abs() < 1e-3);
}

#[test]
fn tensile_stress_is_never_negative() {
    let m = wool();
    for k in 0..50 {
        let e = k as f32 * 0.003;
        let s = m.stress(Strain {
            weft: e,
            warp: e,
            shear: 0.0,
        });
        assert!(s.weft >= 0.0 && s.warp >= 0.0, "strain {e}");
    }
}

#[test]
fn shear_stress_is_odd() {
    let m = wool();
    let pos = m.stress(Strain {
        weft: 0.0,
        warp: 0.0,
        shear: 0.05,
    });
    let neg = m.stress(Strain {
        weft: 0.0,
        warp: 0.0,
        shear: -0.05,
    });
    assert!(pos.shear > 0.0);
    assert!((pos.shear + neg.shear).abs() < 1e-2);
}

#[test]
fn warp_is_stiffer_than_weft() {
    let m = wool();
    let d = m.stress_prime(Strain {
        weft: 0.01,
        warp: 0.01,
        shear: 0.0,
    });
    assert!(d.warp > d.weft);
    assert!(d.weft > 0.0);
}

#[test]
fn validate_rejects_bad_density() {
    let mut m = wool();
    m.density = 0.0;
    assert!(matches!(m.validate(), Err(WeaveError::InvalidMaterial(_))));
}

#[test]
fn toml_round_trip() {
    let m = wool();
    let text = m.to_toml_string().unwrap();
    let back = ClothMaterial::from_toml_str(&text).unwrap();
    assert_eq!(back.name, m.name);
    assert_eq!(back.weft.spec(), m.weft.spec());
    let strain = Strain {
        weft: 0.02,
        warp: 0.004,
        shear: -0.03,
    };
    assert_eq!(back.stress(strain), m.stress(strain));
}

#[test]
fn json_rejects_short_curve() {
    let src = r#"{
        "name": "broken",
        "density": 0.2,
        "weft": { "start": 0.0, "step": 0.1, "samples": [0.0] },
        "warp": { "start": 0.0, "step": 0.1, "samples": [0.0, 1.0] },
        "shear": { "start": -0.1, "step": 0.1, "samples": [-1.0, 0.0, 1.0] },
        "shear_offset": -0.1
    }"#;
    assert!(ClothMaterial::from_json_str(src).is_err());
}

// ─── MaterialDatabase Tests ──────────────────────────────────

#[test]
fn default_database_has_every_preset() {
    let db = MaterialDatabase::with_defaults().unwrap();
    assert_eq!(db.len(), MaterialKind::ALL.len());
    assert!(db.get("wool").is_some());
    assert!(db.get("nonexistent").is_none());
}

#[test]
fn register_custom_material() {
    let mut db = MaterialDatabase::empty();
    assert!(db.is_empty());
    let mut m = wool();
    m.name = "felt".into();
    db.register(m);
    assert_eq!(db.names(), vec!["felt"]);
}

#[test]
fn material_kind_parses() {
    assert_eq!("Wool".parse::<MaterialKind>().unwrap(), MaterialKind::Wool);
    assert!("silk".parse::<MaterialKind>().is_err());
    assert_eq!(MaterialKind::Wool.to_string(), "wool");
}
