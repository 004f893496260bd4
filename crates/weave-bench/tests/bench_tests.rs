//! Integration tests for weave-bench.

use weave_bench::metrics::BenchmarkMetrics;
use weave_bench::runner::BenchmarkRunner;
use weave_bench::scenarios::{weft_direction, FixPoints, Scenario, ScenarioKind, StartConfig};
use weave_io::{FixSetup, SimulationInput};
use weave_math::Vec3;
use weave_mesh::generators::{quad_grid, GridPlane};
use weave_solver::{Integration, ParamAxes};
use weave_telemetry::{EventBus, EventKind, VecSink};
use weave_types::WeaveError;

fn bus_with_sink() -> (EventBus, VecSink) {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    (bus, sink)
}

fn short(kind: ScenarioKind, steps: u32) -> Scenario {
    let mut scenario = Scenario::from_kind(kind).unwrap();
    scenario.input.params.steps = steps;
    scenario
}

fn sample_metrics(scenario: &str) -> BenchmarkMetrics {
    BenchmarkMetrics {
        scenario: scenario.into(),
        integration: "cg".into(),
        vertex_count: 100,
        triangle_count: 162,
        timesteps: 10,
        total_wall_time: 1.0,
        avg_step_time: 0.1,
        min_step_time: 0.05,
        max_step_time: 0.15,
        final_kinetic_energy: 1e-3,
        final_elastic_energy: 2e-4,
        max_displacement: 0.25,
        max_strain: 0.01,
        avg_iterations: 12.5,
        unconverged_steps: 1,
    }
}

// ─── Fix Point Tests ──────────────────────────────────────────

#[test]
fn low_res_fix_points_follow_grid_layout() {
    let mesh = quad_grid(9, 9, 1.0, 1.0, GridPlane::XY);
    let fix = FixPoints::locate(&mesh, ParamAxes::XY).unwrap();

    assert_eq!(fix.corners, [0, 9, 90, 99]);
    assert_eq!(fix.weft_hold, (1..9).map(|j| j * 10).collect::<Vec<_>>());
    assert_eq!(fix.warp_hold, (1..9).collect::<Vec<_>>());
    assert_eq!(fix.pulled, (0..10).map(|j| j * 10 + 9).collect::<Vec<_>>());
    assert_eq!(fix.list().len(), 20);
}

#[test]
fn horizontal_grid_uses_same_layout() {
    let mesh = quad_grid(9, 9, 1.0, 1.0, GridPlane::XZ);
    let fix = FixPoints::locate(&mesh, ParamAxes::XZ).unwrap();
    assert_eq!(fix.corners, [0, 9, 90, 99]);
}

#[test]
fn fix_flags_per_setup() {
    let mesh = quad_grid(3, 3, 1.0, 1.0, GridPlane::XY);
    let fix = FixPoints::locate(&mesh, ParamAxes::XY).unwrap();
    let count = |setup| fix.flags(setup).iter().filter(|&&f| f).count();

    for setup in FixSetup::ALL {
        assert_eq!(fix.flags(setup).len(), fix.list().len());
    }
    assert_eq!(count(FixSetup::None), 0);
    assert_eq!(count(FixSetup::Corners), 4);
    assert_eq!(&fix.flags(FixSetup::Hang)[..4], &[true, true, false, false]);
    // Two corners plus the two interior left-edge points.
    assert_eq!(count(FixSetup::Flag), 4);
    assert_eq!(fix.flags(FixSetup::PullTest), fix.flags(FixSetup::Flag));
}

#[test]
fn locate_rejects_edge_on_parametrization() {
    let mesh = quad_grid(2, 2, 1.0, 1.0, GridPlane::XY);
    assert!(matches!(
        FixPoints::locate(&mesh, ParamAxes::XZ),
        Err(WeaveError::InvalidMesh(_))
    ));
}

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn start_configs() {
    assert_eq!(StartConfig::ALL.len(), 4);
    let input = StartConfig::HighResXY.input(FixSetup::Hang);
    assert_eq!(input.axes, ParamAxes::XY);
    assert_eq!(input.params.fix, FixSetup::Hang);

    let scenario = Scenario::from_input("hi", input).unwrap();
    assert_eq!(scenario.mesh.vertex_count(), 900);
    assert_eq!(scenario.fix_points.list().len(), 60);
}

#[test]
fn scenario_names_parse() {
    for &kind in ScenarioKind::all() {
        assert_eq!(kind.name().parse::<ScenarioKind>().unwrap(), kind);
        assert_eq!(kind.to_string(), kind.name());
    }
    assert_eq!("PULL_TEST".parse::<ScenarioKind>().unwrap(), ScenarioKind::PullTest);
    assert!(matches!(
        "sphere_drape".parse::<ScenarioKind>(),
        Err(WeaveError::InvalidConfig(_))
    ));
}

#[test]
fn build_cloth_holds_setup_points() {
    let hanging = Scenario::from_kind(ScenarioKind::HangingSheet).unwrap();
    let cloth = hanging.build_cloth().unwrap();
    assert_eq!(cloth.point_count(), 100);
    assert_eq!(cloth.triangle_count(), 162);
    assert_eq!(cloth.is_corner_fixed()[..4], [true, true, false, false]);
    assert_eq!(cloth.points().iter().filter(|p| p.is_fixed()).count(), 2);

    let flag = Scenario::from_kind(ScenarioKind::Flag).unwrap();
    let cloth = flag.build_cloth().unwrap();
    assert_eq!(cloth.points().iter().filter(|p| p.is_fixed()).count(), 10);
}

#[test]
fn only_pull_test_applies_external_force() {
    let pull = Scenario::from_kind(ScenarioKind::PullTest).unwrap();
    let cloth = pull.build_cloth().unwrap();
    let forces = pull.external_forces(&cloth);
    assert_eq!(forces.len(), cloth.point_count());
    let expected = weft_direction(ParamAxes::XZ) * pull.input.params.pull_force;
    assert_eq!(forces.iter().filter(|&&f| f == expected).count(), 10);
    assert_eq!(forces.iter().filter(|&&f| f == Vec3::ZERO).count(), 90);

    let pinned = Scenario::from_kind(ScenarioKind::PinnedSheet).unwrap();
    let cloth = pinned.build_cloth().unwrap();
    assert!(pinned.external_forces(&cloth).iter().all(|&f| f == Vec3::ZERO));
}

#[test]
fn invalid_input_is_rejected() {
    let mut input = SimulationInput::grid(3, 3, GridPlane::XZ);
    input.params.dt = 0.0;
    assert!(Scenario::from_input("bad", input).is_err());
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_hanging_sheet() {
    let scenario = short(ScenarioKind::HangingSheet, 5);
    let (mut bus, sink) = bus_with_sink();
    let metrics = BenchmarkRunner::run(&scenario, &mut bus).unwrap();

    assert_eq!(metrics.scenario, "hanging_sheet");
    assert_eq!(metrics.integration, "cg");
    assert_eq!(metrics.timesteps, 5);
    assert_eq!(metrics.vertex_count, 100);
    assert!(metrics.total_wall_time > 0.0);
    assert!(metrics.min_step_time <= metrics.max_step_time);
    assert!(metrics.max_displacement > 0.0);
    assert!(metrics.avg_iterations > 0.0);

    let events = sink.events();
    let ends = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::TimestepEnd { .. }))
        .count();
    assert_eq!(ends, 5);
    assert_eq!(events.last().map(|e| e.timestep), Some(4));
}

#[test]
fn pull_test_stretches_along_weft() {
    let scenario = short(ScenarioKind::PullTest, 5);
    let (mut bus, _sink) = bus_with_sink();
    let outcome = BenchmarkRunner::run_detailed(&scenario, &mut bus, None).unwrap();

    let rest = scenario.mesh.positions[scenario.fix_points.pulled[5]];
    let now = outcome.cloth.positions()[scenario.fix_points.pulled[5]];
    assert!(now.x > rest.x);
    assert!(outcome.metrics.max_strain > 0.0);
    // The held edge stays put.
    let held = scenario.fix_points.corners[0];
    assert_eq!(outcome.cloth.positions()[held], scenario.mesh.positions[held]);
}

#[test]
fn run_detailed_captures_snapshots() {
    let scenario = short(ScenarioKind::PinnedSheet, 4);
    let (mut bus, _sink) = bus_with_sink();
    let outcome = BenchmarkRunner::run_detailed(&scenario, &mut bus, Some(2)).unwrap();

    let steps: Vec<u64> = outcome.snapshots.iter().map(|s| s.timestep).collect();
    assert_eq!(steps, vec![2, 4]);
    assert_eq!(outcome.snapshots[1].positions, outcome.cloth.positions());

    let output = outcome.into_output();
    assert_eq!(output.mesh.vertex_count(), 100);
    assert_eq!(output.metrics.timestep_count, 4);
}

#[test]
fn run_all_with_overrides() {
    let (mut bus, _sink) = bus_with_sink();
    let kinds = [ScenarioKind::PinnedSheet, ScenarioKind::FreeFall];
    let results =
        BenchmarkRunner::run_all(&kinds, Some(2), Some(Integration::DirectCholesky), &mut bus).unwrap();

    assert_eq!(results.len(), 2);
    for (metrics, kind) in results.iter().zip(kinds) {
        assert_eq!(metrics.scenario, kind.name());
        assert_eq!(metrics.timesteps, 2);
        assert_eq!(metrics.integration, "cholesky");
        assert!((metrics.avg_iterations - 1.0).abs() < 1e-6);
        assert_eq!(metrics.unconverged_steps, 0);
    }
}

// ─── Metrics Tests ────────────────────────────────────────────

#[test]
fn metrics_csv_output() {
    let row = sample_metrics("pull_test").to_csv_row();
    assert!(row.starts_with("pull_test,cg,100,162,10,"));
    assert_eq!(
        row.split(',').count(),
        BenchmarkMetrics::to_csv_header().split(',').count()
    );
}

#[test]
fn metrics_csv_multi() {
    let csv = BenchmarkMetrics::to_csv(&[sample_metrics("a"), sample_metrics("b")]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("scenario,"));
    assert!(lines[2].starts_with("b,"));
}

#[test]
fn metrics_summary_and_json() {
    let metrics = sample_metrics("flag");
    let summary = metrics.summary();
    assert_eq!(summary.timestep_count, 10);
    assert_eq!(summary.unconverged_steps, 1);

    let json = serde_json::to_string(&metrics).unwrap();
    let recovered: BenchmarkMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, metrics);
}
