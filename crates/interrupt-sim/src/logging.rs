//! Tracing subscriber setup. Logs go to stderr so `-o -` output stays clean.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `default_level`; an unparsable `default_level`
/// falls back to `warn`.
///
/// # Errors
///
/// Returns an error when a global subscriber is already installed.
pub fn init_tracing(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::init_tracing;

    #[test]
    fn second_install_is_rejected() {
        // The first call may lose to another test; either way one is installed.
        let _ = init_tracing("not a level ===");
        assert!(init_tracing("info").is_err());
    }
}
