//! garden-smoke: smoke checks for the space-dan garden site
//!
//! ## Usage
//!
//! ```bash
//! garden-smoke run                                   # all scenarios against localhost:5173
//! garden-smoke run --base-url http://127.0.0.1:4173  # another server
//! garden-smoke run --only 'games|mobile'             # a subset
//! garden-smoke list                                  # scenario catalogue
//! garden-smoke config --config smoke.yaml            # effective configuration
//! ```
//!
//! Exit status: 0 when every check passed, 1 when any failed, 2 when the
//! run could not start.

use clap::Parser;
use garden_smoke_cli::{
    apply_run_flags, build_harness, error_line, logging, render_catalogue,
    resolve_harness_config, Cli, CliConfig, CliResult, ColorChoice, Commands, SmokeRunner,
    Verbosity,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(config.verbosity, config.color.should_color());

    match run(cli, config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{}", error_line(&e.to_string(), config.color.should_color()));
            ExitCode::from(e.exit_code())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}

async fn run(cli: Cli, config: CliConfig) -> CliResult<u8> {
    match cli.command {
        Commands::Run(args) => {
            let harness = build_harness(args.only.as_deref())?;
            let harness_config = apply_run_flags(resolve_harness_config(&args.target)?, &args);
            let summary = SmokeRunner::new(config, harness_config, harness)
                .run()
                .await?;
            Ok(summary.exit_code() as u8)
        }
        Commands::List(args) => {
            let harness_config = resolve_harness_config(&args.target)?;
            let harness = build_harness(None)?;
            print!(
                "{}",
                render_catalogue(
                    &harness.all(),
                    &harness_config.contract,
                    config.color.should_color()
                )
            );
            Ok(0)
        }
        Commands::Config(args) => {
            let harness_config = resolve_harness_config(&args.target)?;
            print!("{}", harness_config.to_yaml()?);
            Ok(0)
        }
    }
}
