//! CLI command implementations.

use std::error::Error;
use std::path::Path;

use weave_bench::metrics::BenchmarkMetrics;
use weave_bench::runner::BenchmarkRunner;
use weave_bench::scenarios::{Scenario, ScenarioKind};
use weave_debug::snapshot::StateSnapshot;
use weave_io::{inspect_mesh, validate_input, SimulationInput};
use weave_material::ClothMaterial;
use weave_mesh::obj::{load_obj, save_obj};
use weave_solver::{Integration, ParamAxes};
use weave_telemetry::{EventBus, TracingSink};

use crate::{Axes, Method};

type CliResult = Result<(), Box<dyn Error>>;

impl From<Method> for Integration {
    fn from(method: Method) -> Self {
        match method {
            Method::Cg => Integration::ConjugateGradient,
            Method::Rk4 => Integration::Rk4,
            Method::Cholesky => Integration::DirectCholesky,
        }
    }
}

impl From<Axes> for ParamAxes {
    fn from(axes: Axes) -> Self {
        match axes {
            Axes::Xy => ParamAxes::XY,
            Axes::Xz => ParamAxes::XZ,
            Axes::Yz => ParamAxes::YZ,
        }
    }
}

fn tracing_bus(verbose: bool) -> EventBus {
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new(verbose)));
    bus
}

/// Run a simulation from a run file.
pub fn simulate(
    config_path: &str,
    output_path: Option<&str>,
    snapshot_path: Option<&str>,
    verbose: bool,
) -> CliResult {
    println!("Weave Simulation");
    println!("────────────────");

    let input = SimulationInput::load(config_path)?;
    let name = Path::new(config_path)
        .file_stem()
        .map_or_else(|| "run".to_string(), |s| s.to_string_lossy().into_owned());
    let scenario = Scenario::from_input(name, input)?;
    let params = &scenario.input.params;

    println!("Config:      {config_path}");
    println!(
        "Mesh:        {} verts, {} tris",
        scenario.mesh.vertex_count(),
        scenario.mesh.triangle_count()
    );
    println!("Fix setup:   {}", params.fix.name());
    println!("Integration: {}", scenario.input.solver.integration.name());
    println!("Steps:       {} × {}s", params.steps, params.dt);
    println!();

    let mut bus = tracing_bus(verbose);
    let snapshot_every = snapshot_path.map(|_| params.steps);
    let outcome = BenchmarkRunner::run_detailed(&scenario, &mut bus, snapshot_every)?;
    bus.finish();

    let m = &outcome.metrics;
    println!("Wall time:     {:.3}s", m.total_wall_time);
    println!("Avg step:      {:.3}ms", m.avg_step_time * 1000.0);
    println!("Avg iters:     {:.1}", m.avg_iterations);
    println!("Unconverged:   {}", m.unconverged_steps);
    println!("Final KE:      {:.6e}", m.final_kinetic_energy);
    println!("Elastic:       {:.6e}", m.final_elastic_energy);
    println!("Max strain:    {:.4}", m.max_strain);
    println!("Max displace:  {:.4}m", m.max_displacement);

    if let Some(path) = snapshot_path {
        match outcome.snapshots.last() {
            Some(snapshot) => {
                snapshot.save(path)?;
                println!("Snapshot written to: {path}");
            }
            None => return Err("No snapshot was captured".into()),
        }
    }
    if let Some(path) = output_path {
        save_obj(&outcome.into_output().mesh, path)?;
        println!("Mesh written to: {path}");
    }

    Ok(())
}

/// Run benchmark scenarios.
pub fn benchmark(
    scenario_name: &str,
    output_path: Option<&str>,
    steps: Option<u32>,
    method: Option<Method>,
) -> CliResult {
    println!("Weave Benchmark Suite");
    println!("═════════════════════");
    println!();

    let kinds: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![scenario_name.parse()?]
    };

    let mut bus = tracing_bus(false);
    let mut all_metrics = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let metrics = BenchmarkRunner::run_all(&[kind], steps, method.map(Integration::from), &mut bus)
            .map_err(|e| format!("Benchmark '{kind}' failed: {e}"))?;
        for m in metrics {
            println!(
                "{} ({} verts, {} tris, {} steps, {})",
                m.scenario, m.vertex_count, m.triangle_count, m.timesteps, m.integration
            );
            println!("  Wall time:     {:.3}s", m.total_wall_time);
            println!("  Avg step:      {:.3}ms", m.avg_step_time * 1000.0);
            println!("  Avg iters:     {:.1}", m.avg_iterations);
            println!("  Final KE:      {:.6e}", m.final_kinetic_energy);
            println!("  Max displace:  {:.4}m", m.max_displacement);
            println!();
            all_metrics.push(m);
        }
    }
    bus.finish();

    let csv = BenchmarkMetrics::to_csv(&all_metrics);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }

    Ok(())
}

/// Write a scenario's cloth as OBJ.
pub fn export(scenario_name: &str, output_path: &str, steps: u32) -> CliResult {
    let kind: ScenarioKind = scenario_name.parse()?;
    let mut scenario = Scenario::from_kind(kind)?;

    let mesh = if steps == 0 {
        scenario.build_cloth()?.to_mesh()
    } else {
        scenario.input.params.steps = steps;
        let mut bus = tracing_bus(false);
        BenchmarkRunner::run_detailed(&scenario, &mut bus, None)?
            .into_output()
            .mesh
    };

    save_obj(&mesh, output_path)?;
    println!(
        "Exported {kind} after {steps} steps ({} verts, {} tris) to {output_path}",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}

/// Summarize a state snapshot.
pub fn inspect(path: &str) -> CliResult {
    println!("Weave Snapshot Inspector");
    println!("────────────────────────");
    println!();

    let snapshot = StateSnapshot::load(path)?;
    let fixed = snapshot.fixed.iter().filter(|&&f| f).count();

    println!("Version:      {}", snapshot.version);
    println!("Timestep:     {}", snapshot.timestep);
    println!("Sim time:     {:.4}s", snapshot.sim_time);
    println!("Material:     {}", snapshot.material);
    println!("Points:       {} ({fixed} fixed)", snapshot.point_count());

    if !snapshot.positions.is_empty() {
        let (lo, hi) = snapshot.positions.iter().fold(
            (snapshot.positions[0], snapshot.positions[0]),
            |(lo, hi), &p| (lo.min(p), hi.max(p)),
        );
        let max_speed = snapshot
            .velocities
            .iter()
            .map(|v| v.length())
            .fold(0.0f32, f32::max);
        println!("Bounds min:   [{:.4}, {:.4}, {:.4}]", lo.x, lo.y, lo.z);
        println!("Bounds max:   [{:.4}, {:.4}, {:.4}]", hi.x, hi.y, hi.z);
        println!("Max speed:    {max_speed:.4} m/s");
    }

    Ok(())
}

/// Validate a run file, material file or OBJ mesh.
pub fn validate(path: &str, axes: Axes) -> CliResult {
    println!("Weave Validator");
    println!("───────────────");
    println!();

    let extension = Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "toml" => {
            let content = std::fs::read_to_string(path)?;
            if let Ok(mut input) = SimulationInput::from_toml_str(&content) {
                if let Some(base) = Path::new(path).parent() {
                    input.resolve_paths(base);
                }
                println!("Validating run file: {path}");
                validate_input(&input)?;
                input.material.load()?;
                let mesh = input.mesh.load()?;
                let report = inspect_mesh(&mesh, input.axes)?;
                print_mesh_report(&report);
                if !report.is_usable() {
                    return Err("Mesh cannot be simulated with this parametrization".into());
                }
                println!("✅ Run file is valid.");
            } else {
                println!("Validating material: {path}");
                let material = ClothMaterial::from_toml_str(&content)?;
                println!("✅ Material '{}' is valid.", material.name);
            }
        }
        "obj" => {
            println!("Validating mesh: {path}");
            let mesh = load_obj(path)?;
            let report = inspect_mesh(&mesh, axes.into())?;
            print_mesh_report(&report);
            if report.is_usable() {
                println!("✅ Mesh is valid.");
            } else {
                println!("❌ Mesh has faces that are degenerate in the {axes:?} plane.");
            }
        }
        _ => {
            println!("Unsupported file format. Use .toml (run or material) or .obj (mesh).");
        }
    }

    Ok(())
}

fn print_mesh_report(report: &weave_io::MeshReport) {
    println!("  Vertices:    {}", report.vertices);
    println!("  Triangles:   {}", report.triangles);
    println!("  Area:        {:.4}", report.total_area);
    if report.isolated_vertices > 0 {
        println!("  ⚠ {} vertices belong to no triangle", report.isolated_vertices);
    }
    if !report.degenerate_faces.is_empty() {
        println!("  ⚠ {} degenerate faces", report.degenerate_faces.len());
    }
}
