//! Errors that end a simulator run.
//!
//! Everything here is fatal. Recoverable conditions (vector count mismatch,
//! malformed trace lines) are logged where they happen and never reach this
//! type. Errors tied to a source line format as `file:line: error: message`.

use std::io;
use std::path::PathBuf;

use interrupt_core::{ErrorClass, TraceError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::source::SourceError;

/// A fatal simulator error.
#[derive(Debug, Error)]
pub enum SimError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Input path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The timeline could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Output path, `-` for stdout.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Config file problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A table source could not be parsed.
    #[error("{}:{}: {source}", path.display(), source.line())]
    Source {
        /// Source path.
        path: PathBuf,
        /// Parse failure.
        source: SourceError,
    },
    /// A trace record could not be expanded.
    #[error("{}:{}: {}", path.display(), source.line, source.source)]
    Trace {
        /// Trace path.
        path: PathBuf,
        /// Expansion failure with its line.
        source: TraceError,
    },
}

impl SimError {
    /// Dispatch error class, for errors raised while expanding the trace.
    #[must_use]
    pub const fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::Trace { source, .. } => Some(source.source.class()),
            _ => None,
        }
    }

    /// Formats the error for stderr output.
    #[must_use]
    pub fn format_for_stderr(&self) -> String {
        match self {
            Self::Source { path, source } => {
                format!("{}:{}: error: {source}", path.display(), source.line())
            }
            Self::Trace { path, source } => format!(
                "{}:{}: error: {}",
                path.display(),
                source.line,
                source.source
            ),
            _ => format!("error: {self}"),
        }
    }
}
