//! Runs a scenario to completion, reporting every step to an event bus.

use std::time::Instant;

use weave_debug::hooks::{Inspector, SnapshotHook, TelemetryHook};
use weave_debug::snapshot::StateSnapshot;
use weave_io::SimulationOutput;
use weave_solver::{Cloth, Integration};
use weave_telemetry::EventBus;
use weave_types::WeaveResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Everything a finished run leaves behind.
pub struct RunOutcome {
    pub cloth: Cloth,
    pub metrics: BenchmarkMetrics,
    /// Captured states, when snapshots were requested.
    pub snapshots: Vec<StateSnapshot>,
}

impl RunOutcome {
    pub fn into_output(self) -> SimulationOutput {
        SimulationOutput {
            mesh: self.cloth.to_mesh(),
            metrics: self.metrics.summary(),
        }
    }
}

pub struct BenchmarkRunner;

impl BenchmarkRunner {
    pub fn run(scenario: &Scenario, bus: &mut EventBus) -> WeaveResult<BenchmarkMetrics> {
        Ok(Self::run_detailed(scenario, bus, None)?.metrics)
    }

    /// Run `scenario.input.params.steps` steps. Events are flushed to the
    /// bus after every step; with `snapshot_every`, states are captured on
    /// that schedule and at the end.
    pub fn run_detailed(
        scenario: &Scenario,
        bus: &mut EventBus,
        snapshot_every: Option<u32>,
    ) -> WeaveResult<RunOutcome> {
        let params = &scenario.input.params;
        let mut cloth = scenario.build_cloth()?;
        let rest = cloth.positions();

        let mut telemetry = TelemetryHook::connected(params.dt, bus.sender());
        let mut snapshots = snapshot_every.map(SnapshotHook::new);
        let mut inspector = Inspector::new().with_hook(&mut telemetry);
        if let Some(hook) = snapshots.as_mut() {
            inspector.add_hook(hook);
        }

        let mut step_times = Vec::with_capacity(params.steps as usize);
        let mut total_iterations = 0u64;
        let mut unconverged_steps = 0u32;
        let start = Instant::now();

        for _ in 0..params.steps {
            let external = scenario.external_forces(&cloth);
            let result = inspector.step(&mut cloth, params.dt, &external)?;
            step_times.push(result.wall_time);
            total_iterations += result.iterations as u64;
            if !result.converged {
                unconverged_steps += 1;
            }
            bus.flush();
        }
        inspector.finish(&cloth);
        drop(inspector);
        bus.flush();

        let total_wall_time = start.elapsed().as_secs_f64();
        let steps = step_times.len().max(1) as f64;
        let max_displacement = cloth
            .positions()
            .iter()
            .zip(&rest)
            .map(|(p, r)| p.distance(*r))
            .fold(0.0f32, f32::max);

        let metrics = BenchmarkMetrics {
            scenario: scenario.name.clone(),
            integration: cloth.config().integration.name().to_string(),
            vertex_count: cloth.point_count(),
            triangle_count: cloth.triangle_count(),
            timesteps: params.steps,
            total_wall_time,
            avg_step_time: step_times.iter().sum::<f64>() / steps,
            min_step_time: if step_times.is_empty() {
                0.0
            } else {
                step_times.iter().copied().fold(f64::INFINITY, f64::min)
            },
            max_step_time: step_times.iter().copied().fold(0.0, f64::max),
            final_kinetic_energy: cloth.kinetic_energy(),
            final_elastic_energy: cloth.elastic_energy(),
            max_displacement,
            max_strain: cloth.max_strain(),
            avg_iterations: (total_iterations as f64 / steps) as f32,
            unconverged_steps,
        };
        tracing::info!(
            scenario = %metrics.scenario,
            steps = metrics.timesteps,
            wall_time = metrics.total_wall_time,
            avg_iterations = metrics.avg_iterations,
            "Scenario finished"
        );

        Ok(RunOutcome {
            cloth,
            metrics,
            snapshots: snapshots.map(SnapshotHook::into_snapshots).unwrap_or_default(),
        })
    }

    /// Run each kind for `steps` steps, optionally forcing an integrator.
    pub fn run_all(
        kinds: &[ScenarioKind],
        steps: Option<u32>,
        integration: Option<Integration>,
        bus: &mut EventBus,
    ) -> WeaveResult<Vec<BenchmarkMetrics>> {
        let mut results = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let mut scenario = Scenario::from_kind(kind)?;
            if let Some(steps) = steps {
                scenario.input.params.steps = steps;
            }
            if let Some(integration) = integration {
                scenario.input.solver.integration = integration;
            }
            results.push(Self::run(&scenario, bus)?);
        }
        Ok(results)
    }
}
