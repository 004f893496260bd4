//! Integration tests for weave-debug.

use weave_debug::hooks::{InspectionHook, Inspector, SnapshotHook, TelemetryHook};
use weave_debug::snapshot::{StateSnapshot, SNAPSHOT_VERSION};
use weave_material::{ClothMaterial, MaterialKind};
use weave_math::Vec3;
use weave_mesh::generators::{quad_grid, GridLayout, GridPlane};
use weave_solver::{Cloth, ParamAxes};
use weave_telemetry::{EventBus, EventKind, VecSink};
use weave_types::WeaveError;

const DT: f32 = 0.01;

fn pinned_sheet(n: usize) -> Cloth {
    let mesh = quad_grid(n, n, 1.0, 1.0, GridPlane::XZ);
    let layout = GridLayout { cols: n, rows: n };
    let material = ClothMaterial::from_kind(MaterialKind::Wool).unwrap();
    let mut cloth = Cloth::new(material);
    cloth
        .init_axes(&mesh, ParamAxes::XZ, &layout.corners(), 0.5)
        .unwrap();
    cloth.fix_corners(&[true; 4]).unwrap();
    cloth
}

fn no_force(cloth: &Cloth) -> Vec<Vec3> {
    vec![Vec3::ZERO; cloth.point_count()]
}

// ─── Hook Tests ───────────────────────────────────────────────

#[test]
fn telemetry_hook_reports_each_step() {
    let mut cloth = pinned_sheet(3);
    let external = no_force(&cloth);
    let mut hook = TelemetryHook::new(DT);

    let mut inspector = Inspector::new().with_hook(&mut hook);
    let mut iterations = 0;
    for _ in 0..2 {
        iterations += inspector.step(&mut cloth, DT, &external).unwrap().iterations;
    }
    assert_eq!(inspector.timestep(), 2);
    assert!((inspector.sim_time() - 0.02).abs() < 1e-6);
    inspector.finish(&cloth);
    drop(inspector);

    let events = hook.drain_events();
    // Begin, convergence, energy, strain and end per step, plus iterations.
    assert_eq!(events.len(), 2 * 5 + iterations as usize);
    assert!(matches!(events[0].kind, EventKind::TimestepBegin { sim_time, .. } if sim_time == 0.0));
    assert_eq!(events.last().map(|e| e.timestep), Some(1));
    assert!(events
        .iter()
        .any(|e| matches!(&e.kind, EventKind::Convergence { integration, .. } if integration == "cg")));
    assert!(hook.drain_events().is_empty());
}

#[test]
fn connected_telemetry_hook_feeds_bus() {
    let mut cloth = pinned_sheet(2);
    let external = no_force(&cloth);
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    let mut hook = TelemetryHook::connected(DT, bus.sender());
    let mut inspector = Inspector::new().with_hook(&mut hook);
    inspector.step(&mut cloth, DT, &external).unwrap();
    drop(inspector);

    assert!(hook.drain_events().is_empty());
    assert!(bus.flush() >= 5);
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e.kind, EventKind::Energy { kinetic, .. } if kinetic > 0.0)));
}

#[test]
fn failed_step_does_not_advance_clock() {
    let mut cloth = pinned_sheet(2);
    let mut hook = TelemetryHook::new(DT);
    let mut inspector = Inspector::new().with_hook(&mut hook);
    assert!(inspector.step(&mut cloth, DT, &[Vec3::ZERO]).is_err());
    assert_eq!(inspector.timestep(), 0);
    drop(inspector);
    // Only the begin event was recorded.
    assert_eq!(hook.drain_events().len(), 1);
}

#[test]
fn snapshot_hook_captures_on_schedule() {
    let mut cloth = pinned_sheet(2);
    let external = no_force(&cloth);
    let mut snapshots = SnapshotHook::new(2);

    let mut inspector = Inspector::new().with_hook(&mut snapshots);
    for _ in 0..5 {
        inspector.step(&mut cloth, DT, &external).unwrap();
    }
    inspector.finish(&cloth);
    drop(inspector);

    let steps: Vec<u64> = snapshots.snapshots().iter().map(|s| s.timestep).collect();
    assert_eq!(steps, vec![2, 4, 5]);
    let last = snapshots.last().unwrap();
    assert!((last.sim_time - 0.05).abs() < 1e-6);
    assert_eq!(last.positions, cloth.positions());
}

#[test]
fn hook_names() {
    assert_eq!(TelemetryHook::new(DT).name(), "telemetry_hook");
    assert_eq!(SnapshotHook::new(0).name(), "snapshot_hook");
    assert_eq!(Inspector::default().hook_count(), 0);
}

// ─── Snapshot Tests ───────────────────────────────────────────

#[test]
fn snapshot_bytes_round_trip() {
    let mut cloth = pinned_sheet(3);
    let external = no_force(&cloth);
    cloth.update(DT, &external).unwrap();

    let snap = StateSnapshot::capture(&cloth, 0.01);
    assert_eq!(snap.version, SNAPSHOT_VERSION);
    assert_eq!(snap.timestep, 1);
    assert_eq!(snap.point_count(), 16);
    assert_eq!(snap.fixed.iter().filter(|&&f| f).count(), 4);

    let recovered = StateSnapshot::from_bytes(&snap.to_bytes().unwrap()).unwrap();
    assert_eq!(recovered, snap);
}

#[test]
fn snapshot_file_round_trip() {
    let cloth = pinned_sheet(2);
    let snap = StateSnapshot::capture(&cloth, 0.0);
    let path = std::env::temp_dir().join(format!("weave_snapshot_{}.bin", std::process::id()));
    snap.save(&path).unwrap();
    let loaded = StateSnapshot::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, snap);
}

#[test]
fn corrupt_snapshots_are_rejected() {
    assert!(matches!(
        StateSnapshot::from_bytes(&[1, 2, 3]),
        Err(WeaveError::Serialization(_))
    ));

    let mut snap = StateSnapshot::capture(&pinned_sheet(2), 0.0);
    snap.version = SNAPSHOT_VERSION + 1;
    let bytes = snap.to_bytes().unwrap();
    assert!(matches!(
        StateSnapshot::from_bytes(&bytes),
        Err(WeaveError::Serialization(_))
    ));
}

#[test]
fn restored_snapshot_replays_identically() {
    let mut original = pinned_sheet(3);
    let external = no_force(&original);
    for _ in 0..2 {
        original.update(DT, &external).unwrap();
    }
    let checkpoint = StateSnapshot::capture(&original, 0.02);
    for _ in 0..3 {
        original.update(DT, &external).unwrap();
    }
    let expected = StateSnapshot::capture(&original, 0.05);

    let mut replay = pinned_sheet(3);
    replay.fix_corners(&[false; 4]).unwrap();
    checkpoint.restore(&mut replay).unwrap();
    assert_eq!(replay.is_corner_fixed(), vec![true; 4]);
    for _ in 0..3 {
        replay.update(DT, &external).unwrap();
    }
    let actual = StateSnapshot::capture(&replay, 0.05);

    let diff = expected.diff(&actual).unwrap();
    assert!(diff.within(1e-6), "{diff:?}");
}

#[test]
fn restore_rejects_other_cloth() {
    let snap = StateSnapshot::capture(&pinned_sheet(3), 0.0);
    let mut smaller = pinned_sheet(2);
    assert!(matches!(
        snap.restore(&mut smaller),
        Err(WeaveError::InvalidConfig(_))
    ));
    assert!(snap.diff(&StateSnapshot::capture(&smaller, 0.0)).is_err());
}
