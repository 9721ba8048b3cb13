//! Interrupt dispatch simulator front end: input sources, configuration and
//! the run pipeline behind the `interrupt-sim` binary.

/// Command-line arguments.
pub mod cli;
/// Config file and resolved run settings.
pub mod config;
/// Fatal run errors.
pub mod errors;
/// Tracing subscriber setup.
pub mod logging;
/// Source loading, simulation and output.
pub mod run;
/// Vector, delay and trace tokenizers.
pub mod source;
