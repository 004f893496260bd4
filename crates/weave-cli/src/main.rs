//! weave: run, benchmark, export and inspect cloth simulations.

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "weave")]
#[command(version, about = "Weave: continuum cloth simulation with implicit integration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Integration scheme, as named on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Method {
    Cg,
    Rk4,
    Cholesky,
}

/// Parameter plane for meshes that carry no run file.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Axes {
    Xy,
    Xz,
    Yz,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a run file.
    Simulate {
        /// Run file (TOML).
        #[arg(short, long, default_value = "simulation.toml")]
        config: String,

        /// Write the final cloth as OBJ.
        #[arg(short, long)]
        output: Option<String>,

        /// Write the final state as a binary snapshot.
        #[arg(long)]
        snapshot: Option<String>,

        /// Log every telemetry event, not just solver warnings.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the benchmark scenarios.
    Benchmark {
        /// Scenario name, or "all".
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Write results as CSV instead of printing them.
        #[arg(short, long)]
        output: Option<String>,

        /// Override each scenario's step count.
        #[arg(long)]
        steps: Option<u32>,

        /// Override each scenario's integration scheme.
        #[arg(long, value_enum)]
        method: Option<Method>,
    },

    /// Write a scenario's cloth as OBJ, optionally after some steps.
    Export {
        #[arg(short, long)]
        scenario: String,

        #[arg(short, long)]
        output: String,

        /// Steps to simulate before exporting.
        #[arg(long, default_value_t = 0)]
        steps: u32,
    },

    /// Summarize a state snapshot.
    Inspect {
        path: String,
    },

    /// Check a run file, material file or OBJ mesh.
    Validate {
        path: String,

        /// Parameter plane used to check an OBJ mesh.
        #[arg(long, value_enum, default_value = "xz")]
        axes: Axes,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            config,
            output,
            snapshot,
            verbose,
        } => commands::simulate(&config, output.as_deref(), snapshot.as_deref(), verbose),
        Commands::Benchmark {
            scenario,
            output,
            steps,
            method,
        } => commands::benchmark(&scenario, output.as_deref(), steps, method),
        Commands::Export {
            scenario,
            output,
            steps,
        } => commands::export(&scenario, &output, steps),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path, axes } => commands::validate(&path, axes),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
