//! Command-line arguments and their merge with the config file.

use std::path::PathBuf;

use clap::Parser;
use interrupt_core::{SplitStrategy, TimingPreset};

use crate::config::{
    ConfigError, ConfigFile, OutputTarget, SimConfig, TimingOverrides, DEFAULT_DELAY_PATH,
    DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_PATH, DEFAULT_VECTOR_PATH,
};

/// Interrupt dispatch timeline simulator.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "interrupt-sim",
    about = "Expand a CPU/SYSCALL/END_IO trace into a timed interrupt dispatch timeline",
    version
)]
pub struct Cli {
    /// Operation trace, one `KIND, operand` per line.
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Timeline output path; `-` writes to stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Vector source (hex ISR addresses).
    #[arg(long, value_name = "FILE")]
    pub vectors: Option<PathBuf>,

    /// Device delay source (decimal service times).
    #[arg(long, value_name = "FILE")]
    pub delays: Option<PathBuf>,

    /// Seed for the service-time split; defaults to the wall clock.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Named step cost preset.
    #[arg(long, value_name = "NAME")]
    pub preset: Option<TimingPreset>,

    /// How SYSCALL service time is split between ISR and transfer.
    #[arg(long, value_name = "NAME")]
    pub split: Option<SplitStrategy>,

    /// Individual step cost overrides, applied after the preset.
    #[command(flatten)]
    pub timing: TimingOverrides,

    /// TOML config file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error); `RUST_LOG` wins.
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print run diagnostics to stderr.
    #[arg(long)]
    pub summary: bool,
}

impl Cli {
    /// Loads the config file, if one was given, and merges it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the config file cannot be read or parsed.
    pub fn resolve(self) -> Result<SimConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Ok(self.resolve_with(file))
    }

    /// Merges with an already loaded config file: command line first, then
    /// the file, then defaults.
    #[must_use]
    pub fn resolve_with(self, file: ConfigFile) -> SimConfig {
        let preset = self.preset.or(file.preset).unwrap_or_default();
        let mut timing = preset.profile();
        self.timing.or(file.timing).apply(&mut timing);

        SimConfig {
            trace: self.trace,
            vectors: self
                .vectors
                .or(file.vectors)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VECTOR_PATH)),
            delays: self
                .delays
                .or(file.delays)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DELAY_PATH)),
            output: OutputTarget::from_path(
                self.output
                    .or(file.output)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            ),
            seed: self.seed.or(file.seed),
            timing,
            split: self.split.or(file.split).unwrap_or_default(),
            log_level: self
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            summary: self.summary,
        }
    }
}
