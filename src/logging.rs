//! Tracing subscriber setup for the binary
//!
//! Log lines go to stderr so command output on stdout stays clean.

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Filter directive for a verbosity level and the configured default level
pub fn filter_directive(verbosity: Verbosity, level: &str) -> String {
    match verbosity {
        Verbosity::Quiet => "scoperag=error".to_string(),
        Verbosity::Normal => format!("scoperag={}", level),
        Verbosity::Verbose => "scoperag=debug".to_string(),
        Verbosity::VeryVerbose => "scoperag=trace".to_string(),
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins at normal verbosity; `-v`/`-q` override it.
pub fn init_tracing(verbosity: Verbosity, level: &str) {
    let directive = filter_directive(verbosity, level);
    let filter = if verbosity == Verbosity::Normal {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive))
    } else {
        EnvFilter::new(&directive)
    };

    // A subscriber may already be installed (tests, embedding callers)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
