//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// garden-smoke: end-to-end smoke checks for the space-dan garden site
#[derive(Parser, Debug)]
#[command(name = "garden-smoke")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the smoke scenarios against a running site
    Run(RunArgs),

    /// List the scenarios and the routes they start from
    List(ListArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Where the configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Application root (overrides the file)
    #[arg(long, value_name = "URL", env = "GARDEN_SMOKE_BASE_URL")]
    pub base_url: Option<String>,

    /// Evidence directory (overrides the file)
    #[arg(long, value_name = "DIR", env = "GARDEN_SMOKE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Configuration sources
    #[command(flatten)]
    pub target: TargetArgs,

    /// Only run scenarios whose name matches this regex
    #[arg(long, value_name = "REGEX")]
    pub only: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable
    #[arg(long, value_name = "PATH")]
    pub chromium: Option<PathBuf>,

    /// Disable the Chromium sandbox (needed in some containers)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug, Clone, Default)]
pub struct ListArgs {
    /// Configuration sources
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration sources
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
