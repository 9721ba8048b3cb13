//! One simulator run: read sources, build tables, drive the trace, write output.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use interrupt_core::{
    ConfigMismatch, DeviceDelayTable, DispatchTables, RunStats, ServiceSplitter, Timeline,
    TraceDriver, TraceError, VectorDirectory,
};
use tracing::info;

use crate::config::{OutputTarget, SimConfig};
use crate::errors::SimError;
use crate::source::{
    parse_delay_source, parse_trace, parse_vector_source, RejectedToken, TraceLine,
};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// The full timeline.
    pub timeline: Timeline,
    /// Run diagnostics.
    pub stats: RunStats,
    /// Seed the splitter used.
    pub seed: u64,
    /// Vector count mismatch, if any.
    pub vector_mismatch: Option<ConfigMismatch>,
    /// Vector token that ended reading early, if any.
    pub vector_rejected: Option<RejectedToken>,
}

/// Source texts for one run, paired with the paths used in error messages.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    /// Vector source text.
    pub vectors: &'a str,
    /// Delay source text.
    pub delays: &'a str,
    /// Delay source path.
    pub delays_path: &'a Path,
    /// Trace text.
    pub trace: &'a str,
    /// Trace path.
    pub trace_path: &'a Path,
}

fn read_source(path: &Path) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|source| SimError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Seed derived from the current time, for runs without an explicit seed.
#[must_use]
pub fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            elapsed.as_secs().wrapping_mul(1_000_000_007) ^ u64::from(elapsed.subsec_nanos())
        })
}

/// Feeds parsed trace lines into `driver`, skipping malformed ones.
///
/// # Errors
///
/// Returns the first [`TraceError`]; later lines are not processed.
pub fn drive<S: ServiceSplitter>(
    driver: &mut TraceDriver<S>,
    lines: &[TraceLine],
) -> Result<(), TraceError> {
    for line in lines {
        match line {
            TraceLine::Record(record) => driver.feed(record)?,
            TraceLine::Malformed { line, reason } => driver.skip(*line, reason),
        }
    }
    Ok(())
}

/// Runs a simulation over in-memory sources.
///
/// # Errors
///
/// Returns [`SimError::Source`] for a bad delay source and
/// [`SimError::Trace`] when a record cannot be expanded.
pub fn simulate_sources<S: ServiceSplitter>(
    sources: &Sources<'_>,
    config: &SimConfig,
    splitter: S,
    seed: u64,
) -> Result<SimulationReport, SimError> {
    let vector_source = parse_vector_source(sources.vectors);
    let delays = parse_delay_source(sources.delays).map_err(|source| SimError::Source {
        path: sources.delays_path.to_path_buf(),
        source,
    })?;

    let vectors = VectorDirectory::build(&vector_source.targets);
    let vector_mismatch = vectors.mismatch();
    let tables = DispatchTables::new(vectors, DeviceDelayTable::build(delays));
    info!(
        vectors = tables.vectors.len(),
        devices = tables.delays.len(),
        "built dispatch tables"
    );

    let mut driver = TraceDriver::new(tables, config.timing, splitter);
    drive(&mut driver, &parse_trace(sources.trace)).map_err(|source| SimError::Trace {
        path: sources.trace_path.to_path_buf(),
        source,
    })?;

    let (timeline, stats) = driver.finish();
    info!(
        records = stats.records(),
        skipped = stats.skipped_lines,
        steps = timeline.len(),
        end = timeline.end_time(),
        "trace simulated"
    );

    Ok(SimulationReport {
        timeline,
        stats,
        seed,
        vector_mismatch,
        vector_rejected: vector_source.rejected,
    })
}

/// Reads every source named in `config` and runs the simulation.
///
/// # Errors
///
/// Returns [`SimError`] for unreadable inputs and for any failure from
/// [`simulate_sources`].
pub fn simulate(config: &SimConfig) -> Result<SimulationReport, SimError> {
    let vectors = read_source(&config.vectors)?;
    let delays = read_source(&config.delays)?;
    let trace = read_source(&config.trace)?;

    let seed = config.seed.unwrap_or_else(wall_clock_seed);
    info!(seed, split = %config.split, "seeded service-time splitter");

    let sources = Sources {
        vectors: &vectors,
        delays: &delays,
        delays_path: &config.delays,
        trace: &trace,
        trace_path: &config.trace,
    };
    simulate_sources(&sources, config, config.split.splitter(seed), seed)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("timeline"), ToOwned::to_owned);
    name.push(".partial");
    path.with_file_name(name)
}

/// Writes `path` through a sibling staging file that is renamed into place
/// only after `write` succeeds. On failure the staging file is removed and
/// `path` is left as it was.
fn replace_file<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let staging = staging_path(path);
    let result = File::create(&staging)
        .and_then(|file| write(&mut BufWriter::new(file)))
        .and_then(|()| fs::rename(&staging, path));
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

/// Writes the timeline to its destination.
///
/// # Errors
///
/// Returns [`SimError::Write`] when the destination cannot be created or
/// written. A failed file write leaves no partial timeline behind.
pub fn write_timeline(target: &OutputTarget, timeline: &Timeline) -> Result<(), SimError> {
    match target {
        OutputTarget::Stdout => {
            timeline
                .write_to(io::stdout().lock())
                .map_err(|source| SimError::Write {
                    path: PathBuf::from("-"),
                    source,
                })
        }
        OutputTarget::File(path) => {
            replace_file(path, |writer| timeline.write_to(writer)).map_err(|source| {
                SimError::Write {
                    path: path.clone(),
                    source,
                }
            })
        }
    }
}
