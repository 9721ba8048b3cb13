//! Run configuration: TOML config file plus command-line overrides.
//!
//! Precedence is command line, then config file, then built-in defaults.
//!
//! ```toml
//! vectors = "tables/vector_table.txt"
//! delays = "tables/device_table.txt"
//! output = "execution.txt"
//! seed = 42
//! preset = "slow-vector"
//! split = "randomized"
//! log_level = "info"
//!
//! [timing]
//! context_save = 12
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use interrupt_core::{SplitStrategy, StepCostKind, TimingPreset, TimingProfile};
use serde::Deserialize;
use thiserror::Error;

/// Default vector source path.
pub const DEFAULT_VECTOR_PATH: &str = "vector_table.txt";
/// Default delay source path.
pub const DEFAULT_DELAY_PATH: &str = "device_table.txt";
/// Default timeline output path.
pub const DEFAULT_OUTPUT_PATH: &str = "execution.txt";
/// Default log filter; keeps table warnings visible.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Failure loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// File is not valid config TOML.
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Overrides for the dispatch step costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::Args)]
#[serde(default, deny_unknown_fields)]
pub struct TimingOverrides {
    /// Ticks per user/kernel mode switch.
    #[arg(long, value_name = "TICKS")]
    pub switch_mode: Option<u64>,
    /// Ticks per context save or restore.
    #[arg(long, value_name = "TICKS")]
    pub context_save: Option<u64>,
    /// Ticks for the vector lookup.
    #[arg(long, value_name = "TICKS")]
    pub find_vector: Option<u64>,
    /// Ticks for loading the ISR address.
    #[arg(long, value_name = "TICKS")]
    pub load_address: Option<u64>,
}

impl TimingOverrides {
    fn entries(&self) -> [(StepCostKind, Option<u64>); 4] {
        [
            (StepCostKind::SwitchMode, self.switch_mode),
            (StepCostKind::ContextSave, self.context_save),
            (StepCostKind::FindVector, self.find_vector),
            (StepCostKind::LoadAddress, self.load_address),
        ]
    }

    /// Writes every set override into `profile`.
    pub fn apply(&self, profile: &mut TimingProfile) {
        for (kind, ticks) in self.entries() {
            if let Some(ticks) = ticks {
                profile.set_cost(kind, ticks);
            }
        }
    }

    /// Field-wise `self` where set, otherwise `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            switch_mode: self.switch_mode.or(fallback.switch_mode),
            context_save: self.context_save.or(fallback.context_save),
            find_vector: self.find_vector.or(fallback.find_vector),
            load_address: self.load_address.or(fallback.load_address),
        }
    }
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Vector source path.
    pub vectors: Option<PathBuf>,
    /// Delay source path.
    pub delays: Option<PathBuf>,
    /// Timeline output path.
    pub output: Option<PathBuf>,
    /// Split seed.
    pub seed: Option<u64>,
    /// Timing preset.
    pub preset: Option<TimingPreset>,
    /// Split strategy.
    pub split: Option<SplitStrategy>,
    /// Log filter directive.
    pub log_level: Option<String>,
    /// Step cost overrides applied on top of the preset.
    pub timing: TimingOverrides,
}

impl ConfigFile {
    /// Parses config TOML; `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }
}

/// Where the timeline is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output.
    Stdout,
    /// A file, created or truncated.
    File(PathBuf),
}

impl OutputTarget {
    /// `-` selects stdout; anything else is a file path.
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        if path.as_os_str() == "-" {
            Self::Stdout
        } else {
            Self::File(path)
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Operation trace path.
    pub trace: PathBuf,
    /// Vector source path.
    pub vectors: PathBuf,
    /// Delay source path.
    pub delays: PathBuf,
    /// Timeline destination.
    pub output: OutputTarget,
    /// Split seed; `None` seeds from the wall clock.
    pub seed: Option<u64>,
    /// Step costs.
    pub timing: TimingProfile,
    /// Split strategy.
    pub split: SplitStrategy,
    /// Log filter directive.
    pub log_level: String,
    /// Print run diagnostics after the run.
    pub summary: bool,
}

impl SimConfig {
    /// Defaults for `trace`: standard timing, randomized split, default paths.
    #[must_use]
    pub fn new(trace: PathBuf) -> Self {
        Self {
            trace,
            vectors: PathBuf::from(DEFAULT_VECTOR_PATH),
            delays: PathBuf::from(DEFAULT_DELAY_PATH),
            output: OutputTarget::File(PathBuf::from(DEFAULT_OUTPUT_PATH)),
            seed: None,
            timing: TimingProfile::STANDARD,
            split: SplitStrategy::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            summary: false,
        }
    }
}
