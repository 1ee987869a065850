//! garden-smoke CLI library
//!
//! Command-line surface for the garden-smoke checks: argument parsing,
//! configuration layering, logging setup and the run loop.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, RunArgs, TargetArgs};
pub use config::{apply_run_flags, resolve_harness_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult, STARTUP_FAILURE_EXIT_CODE};
pub use output::{error_line, render_catalogue};
pub use runner::{build_harness, SmokeRunner};
