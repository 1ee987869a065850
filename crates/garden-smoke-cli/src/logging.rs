//! Diagnostic logging to stderr.
//!
//! The progress report goes to stdout; everything logged through `tracing`
//! goes here. `RUST_LOG` wins over the verbosity flags.

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber (a second call is a no-op)
pub fn init(verbosity: Verbosity, use_color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(use_color)
        .with_target(false)
        .try_init();
}
