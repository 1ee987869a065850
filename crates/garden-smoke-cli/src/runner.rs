//! The `run` command: bring up Chromium, run the scenarios, tear down.

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use garden_smoke::{
    BrowserSession, ContextProvider, EvidenceCapturer, Harness, HarnessConfig, Recorder,
    RunSummary, ScenarioContext, SmokeError, View,
};
use regex::Regex;

/// Select scenarios by an optional name pattern
pub fn build_harness(only: Option<&str>) -> CliResult<Harness> {
    let harness = Harness::standard();
    let Some(pattern) = only else {
        return Ok(harness);
    };
    let filter = Regex::new(pattern)
        .map_err(|e| CliError::invalid_argument(format!("--only {pattern:?}: {e}")))?;
    let harness = harness.with_filter(filter);
    if harness.selected().is_empty() {
        return Err(CliError::invalid_argument(format!(
            "--only {pattern:?} matches no scenario"
        )));
    }
    Ok(harness)
}

/// Smoke test runner
#[derive(Debug)]
pub struct SmokeRunner {
    cli: CliConfig,
    config: HarnessConfig,
    harness: Harness,
}

impl SmokeRunner {
    /// Create a runner
    #[must_use]
    pub fn new(cli: CliConfig, config: HarnessConfig, harness: Harness) -> Self {
        Self {
            cli,
            config,
            harness,
        }
    }

    /// Run every selected scenario and summarize.
    ///
    /// Configuration problems and a browser that will not start are errors;
    /// failed checks are not, they show up in the returned summary.
    pub async fn run(&self) -> CliResult<RunSummary> {
        self.config.validate().map_err(|e| match e {
            SmokeError::Config { message } => CliError::Config { message },
            other => other.into(),
        })?;

        let session = BrowserSession::start(self.config.browser_config())
            .await
            .map_err(|e| CliError::startup(e.to_string()))?;

        let mut view = match session.open_view(self.config.viewports.desktop).await {
            Ok(view) => view,
            Err(e) => {
                if let Err(close_err) = session.shutdown().await {
                    tracing::warn!(error = %close_err, "browser shutdown failed");
                }
                return Err(CliError::startup(e.to_string()));
            }
        };

        let mut recorder = Recorder::new().with_color(self.cli.color.should_color());
        let evidence = EvidenceCapturer::new(&self.config.output_dir);
        {
            let mut ctx = ScenarioContext {
                view: &mut *view,
                contexts: &session,
                recorder: &mut recorder,
                evidence: &evidence,
                config: &self.config,
            };
            let reports = self.harness.run(&mut ctx).await;
            tracing::info!(
                scenarios = reports.len(),
                aborted = reports.iter().filter(|r| r.error.is_some()).count(),
                "run finished"
            );
        }

        if let Err(e) = view.close().await {
            tracing::warn!(error = %e, "desktop context close failed");
        }
        if let Err(e) = session.shutdown().await {
            tracing::warn!(error = %e, "browser shutdown failed");
        }

        Ok(recorder.summarize())
    }
}
