//! Figures collected from one scenario run.

use serde::{Deserialize, Serialize};
use weave_io::SimulationMetrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub scenario: String,
    /// Integrator name ("cg", "rk4" or "cholesky").
    pub integration: String,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub timesteps: u32,
    /// Wall-clock time for the whole run (seconds).
    pub total_wall_time: f64,
    pub avg_step_time: f64,
    pub min_step_time: f64,
    pub max_step_time: f64,
    pub final_kinetic_energy: f64,
    pub final_elastic_energy: f64,
    /// Largest distance any point moved from its rest position.
    pub max_displacement: f32,
    pub max_strain: f32,
    /// Mean linear-solver iterations per step.
    pub avg_iterations: f32,
    pub unconverged_steps: u32,
}

impl BenchmarkMetrics {
    pub fn to_csv_header() -> String {
        "scenario,integration,vertex_count,triangle_count,timesteps,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,final_ke,final_elastic,max_displacement,max_strain,avg_iterations,unconverged_steps".to_string()
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6e},{:.6},{:.6},{:.1},{}",
            self.scenario,
            self.integration,
            self.vertex_count,
            self.triangle_count,
            self.timesteps,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.final_kinetic_energy,
            self.final_elastic_energy,
            self.max_displacement,
            self.max_strain,
            self.avg_iterations,
            self.unconverged_steps,
        )
    }

    /// Header plus one row per entry, newline separated.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }

    /// The subset reported in a run's output.
    pub fn summary(&self) -> SimulationMetrics {
        SimulationMetrics {
            wall_time_seconds: self.total_wall_time,
            timestep_count: self.timesteps,
            final_kinetic_energy: self.final_kinetic_energy,
            final_elastic_energy: self.final_elastic_energy,
            max_strain: self.max_strain,
            avg_iterations: self.avg_iterations,
            unconverged_steps: self.unconverged_steps,
        }
    }
}
