//! Scenario runner.
//!
//! A [`Scenario`] returns `SmokeResult<()>`: assertion outcomes go to the
//! recorder as the scenario runs, and an `Err` (or a panic) means the
//! scenario could not continue. [`ScenarioRunner::run`] turns that into
//! exactly one failure named after the scenario, and [`Harness::run`] folds
//! the runner over the selected scenarios in declaration order.

use crate::config::{HarnessConfig, Timing};
use crate::contract::DomContract;
use crate::evidence::EvidenceCapturer;
use crate::reporter::{Recorder, ScenarioOutcome};
use crate::result::{SmokeError, SmokeResult};
use crate::view::{ContextProvider, View};
use crate::wait::LoadState;
use async_trait::async_trait;
use futures::FutureExt;
use regex::Regex;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// One self-contained check of an application surface
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Position in the catalogue (1-based)
    fn id(&self) -> u8;

    /// Label used for the scenario-level failure
    fn name(&self) -> &'static str;

    /// Heading printed before the scenario runs
    fn title(&self) -> &'static str;

    /// Route the scenario starts from
    fn route(&self, contract: &DomContract) -> String;

    /// Run the checks
    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> SmokeResult<()>;
}

/// Everything a scenario may touch
pub struct ScenarioContext<'a> {
    /// Shared desktop view
    pub view: &'a mut dyn View,
    /// Opens extra isolated contexts
    pub contexts: &'a dyn ContextProvider,
    /// Outcome sink
    pub recorder: &'a mut Recorder,
    /// Screenshot writer
    pub evidence: &'a EvidenceCapturer,
    /// Run configuration
    pub config: &'a HarnessConfig,
}

impl fmt::Debug for ScenarioContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("viewport", &self.view.viewport())
            .field("scenario", &self.recorder.current_scenario())
            .field("output_dir", &self.evidence.output_dir())
            .finish_non_exhaustive()
    }
}

impl ScenarioContext<'_> {
    /// DOM contract in effect
    #[must_use]
    pub fn contract(&self) -> &DomContract {
        &self.config.contract
    }

    /// Navigate to `route` and wait for the network to go idle
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails or the page never settles
    pub async fn open(&mut self, route: &str) -> SmokeResult<()> {
        let url = self.config.url(route);
        self.view.goto(&url).await?;
        self.view.wait_for_load_state(LoadState::NetworkIdle).await
    }

    /// Pause for `ms` milliseconds
    pub async fn settle(&mut self, ms: u64) {
        self.view.wait_for_timeout(Timing::ms(ms)).await;
    }

    /// Write evidence for the current view
    ///
    /// # Errors
    ///
    /// Returns error if the screenshot cannot be taken or written
    pub async fn capture(&self, name: &str) -> SmokeResult<PathBuf> {
        self.evidence.capture(&*self.view, name).await
    }
}

/// What one scenario produced
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Outcomes recorded while it ran (including the abort failure)
    pub outcomes: Vec<ScenarioOutcome>,
    /// Error that aborted it, if any
    pub error: Option<String>,
    /// Wall time
    pub duration: Duration,
}

impl ScenarioReport {
    /// Ran to completion with every check passing
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.outcomes.iter().all(|o| o.status.is_pass())
    }

    /// Failing outcomes
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_fail()).count()
    }
}

/// Runs one scenario with failure isolation
#[derive(Debug, Clone, Copy)]
pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Run `scenario`; an error or panic is recorded once and swallowed
    pub async fn run(scenario: &dyn Scenario, ctx: &mut ScenarioContext<'_>) -> ScenarioReport {
        ctx.recorder.begin_scenario(scenario.name());
        ctx.recorder
            .section(&format!("{}. {}", scenario.id(), scenario.title()));
        let first = ctx.recorder.outcomes().len();
        let start = Instant::now();

        let error = match AssertUnwindSafe(scenario.run(ctx)).catch_unwind().await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(payload) => Some(SmokeError::Panic {
                message: panic_message(payload.as_ref()),
            }),
        };
        if let Some(ref e) = error {
            tracing::error!(scenario = scenario.name(), error = %e, "scenario aborted");
            ctx.recorder.record_fail(scenario.name(), e.to_string());
        }

        let duration = start.elapsed();
        tracing::debug!(
            scenario = scenario.name(),
            elapsed_ms = duration.as_millis() as u64,
            "scenario finished"
        );
        ScenarioReport {
            name: scenario.name().to_string(),
            outcomes: ctx.recorder.outcomes()[first..].to_vec(),
            error: error.map(|e| e.to_string()),
            duration,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scenario panicked".to_string()
    }
}

/// An ordered scenario catalogue with an optional name filter
pub struct Harness {
    scenarios: Vec<Box<dyn Scenario>>,
    filter: Option<Regex>,
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field(
                "scenarios",
                &self.scenarios.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("filter", &self.filter.as_ref().map(Regex::as_str))
            .finish()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Create an empty harness
    #[must_use]
    pub fn new() -> Self {
        Self {
            scenarios: Vec::new(),
            filter: None,
        }
    }

    /// The eight garden scenarios
    #[must_use]
    pub fn standard() -> Self {
        Self {
            scenarios: crate::scenarios::standard(),
            filter: None,
        }
    }

    /// Append a scenario
    #[must_use]
    pub fn with_scenario(mut self, scenario: Box<dyn Scenario>) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Only run scenarios whose name matches `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: Regex) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Every scenario, filtered or not
    #[must_use]
    pub fn all(&self) -> Vec<&dyn Scenario> {
        self.scenarios.iter().map(AsRef::as_ref).collect()
    }

    /// Scenarios that will run, in declaration order
    #[must_use]
    pub fn selected(&self) -> Vec<&dyn Scenario> {
        self.scenarios
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| self.filter.as_ref().map_or(true, |re| re.is_match(s.name())))
            .collect()
    }

    /// Run the selected scenarios one after another
    pub async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Vec<ScenarioReport> {
        let mut reports = Vec::new();
        for scenario in self.selected() {
            reports.push(ScenarioRunner::run(scenario, ctx).await);
        }
        reports
    }
}
