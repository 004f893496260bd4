//! Integration tests for weave-types.

use weave_types::{PointId, TriangleId, WeaveError};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn point_id_index() {
    let id = PointId(42);
    assert_eq!(id.index(), 42);
    assert_eq!(PointId::from(42usize), id);
}

#[test]
fn triangle_id_index() {
    let id = TriangleId(7);
    assert_eq!(id.index(), 7);
}

#[test]
fn point_ids_order_by_index() {
    let mut ids = vec![PointId(5), PointId(1), PointId(3)];
    ids.sort();
    assert_eq!(ids, vec![PointId(1), PointId(3), PointId(5)]);
}

#[test]
fn ids_are_serializable() {
    let id = PointId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: PointId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = WeaveError::InvalidMesh("face 3 references vertex 99".into());
    assert!(err.to_string().contains("vertex 99"));
}

#[test]
fn parse_error_carries_line() {
    let err = WeaveError::Parse {
        line: 12,
        message: "face has 4 vertices".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("line 12"));
    assert!(msg.contains("4 vertices"));
}

#[test]
fn solver_divergence_display() {
    let err = WeaveError::SolverDivergence {
        iterations: 100,
        residual: 1.5e-2,
    };
    let msg = err.to_string();
    assert!(msg.contains("100"));
    assert!(msg.contains("1.50e-2") || msg.contains("1.5e-2"));
}

#[test]
fn io_error_converts() {
    fn fails() -> weave_types::WeaveResult<()> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing.obj"))?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert!(matches!(err, WeaveError::Io(_)));
}
