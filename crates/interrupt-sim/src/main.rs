//! CLI entry point for the interrupt-sim binary.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use interrupt_core as _;
use interrupt_sim::cli::Cli;
use interrupt_sim::config::{OutputTarget, SimConfig};
use interrupt_sim::errors::SimError;
use interrupt_sim::logging::init_tracing;
use interrupt_sim::run::{simulate, write_timeline, SimulationReport};
#[cfg(test)]
use rstest as _;
use serde as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use toml as _;
use tracing::error;
use tracing_subscriber as _;

fn output_name(target: &OutputTarget) -> PathBuf {
    match target {
        OutputTarget::Stdout => PathBuf::from("stdout"),
        OutputTarget::File(path) => path.clone(),
    }
}

fn success_line(report: &SimulationReport, target: &OutputTarget) -> String {
    format!(
        "Simulated {} records ({} steps, {} ticks) -> {}",
        report.stats.records(),
        report.timeline.len(),
        report.timeline.end_time(),
        output_name(target).display()
    )
}

fn run(config: &SimConfig) -> Result<SimulationReport, SimError> {
    let report = simulate(config)?;
    write_timeline(&config.output, &report.timeline)?;
    Ok(report)
}

fn main() {
    let cli = Cli::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", SimError::from(e).format_for_stderr());
            process::exit(1);
        }
    };

    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("warning: logging disabled: {e}");
    }

    let exit_code = match run(&config) {
        Ok(report) => {
            if config.summary {
                eprintln!("{}", report.stats);
                eprintln!("final clock: {}", report.timeline.end_time());
                eprintln!("seed: {}", report.seed);
            }
            let line = success_line(&report, &config.output);
            if config.output == OutputTarget::Stdout {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
            0
        }
        Err(e) => {
            if let Some(class) = e.class() {
                error!(?class, "simulation aborted");
            }
            eprintln!("{}", e.format_for_stderr());
            1
        }
    };

    process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use interrupt_core::{RunStats, Timeline, TimelineStep};
    use interrupt_sim::config::OutputTarget;
    use interrupt_sim::run::SimulationReport;

    use super::success_line;

    #[test]
    fn success_line_names_counts_and_destination() {
        let mut timeline = Timeline::new();
        timeline.extend([
            TimelineStep::new(0, 50, "CPU execution"),
            TimelineStep::new(50, 25, "CPU execution"),
        ]);
        let report = SimulationReport {
            timeline,
            stats: RunStats {
                cpu_records: 2,
                ..RunStats::new()
            },
            seed: 1,
            vector_mismatch: None,
            vector_rejected: None,
        };
        assert_eq!(
            success_line(&report, &OutputTarget::File(PathBuf::from("execution.txt"))),
            "Simulated 2 records (2 steps, 75 ticks) -> execution.txt"
        );
        assert_eq!(
            success_line(&report, &OutputTarget::Stdout),
            "Simulated 2 records (2 steps, 75 ticks) -> stdout"
        );
    }
}
