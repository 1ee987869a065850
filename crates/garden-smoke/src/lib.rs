//! garden-smoke: end-to-end smoke checks for the space-dan garden site
//!
//! Drives Chromium over the DevTools protocol through eight scenarios
//! (entry screen, navigation shell, posts, search, post detail, bulletin,
//! games, mobile) and reports every check as a pass or a failure.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────┐
//! │ Harness      │──►│ ScenarioRunner │──►│ Scenario     │
//! │ (catalogue)  │   │ (isolation)    │   │ (checks)     │
//! └──────────────┘   └────────────────┘   └──────┬───────┘
//!                                                │
//!        ┌──────────────┬─────────────────┬──────┴───────┐
//!        ▼              ▼                 ▼              ▼
//!   ┌─────────┐   ┌───────────┐   ┌──────────────┐ ┌──────────┐
//!   │ View    │   │ Assertion │   │ Evidence     │ │ Recorder │
//!   │ (CDP /  │   │ helpers   │   │ Capturer     │ │          │
//!   │  mock)  │   └───────────┘   └──────────────┘ └──────────┘
//!   └─────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use garden_smoke::{
//!     BrowserSession, ContextProvider, EvidenceCapturer, Harness, HarnessConfig,
//!     Recorder, ScenarioContext, SmokeResult, View,
//! };
//!
//! # async fn demo() -> SmokeResult<i32> {
//! let config = HarnessConfig::default();
//! let session = BrowserSession::start(config.browser_config()).await?;
//! let mut view = session.open_view(config.viewports.desktop).await?;
//! let mut recorder = Recorder::new();
//! let evidence = EvidenceCapturer::new(&config.output_dir);
//!
//! let mut ctx = ScenarioContext {
//!     view: &mut *view,
//!     contexts: &session,
//!     recorder: &mut recorder,
//!     evidence: &evidence,
//!     config: &config,
//! };
//! Harness::standard().run(&mut ctx).await;
//!
//! view.close().await?;
//! session.shutdown().await?;
//! Ok(recorder.summarize().exit_code())
//! # }
//! ```

#![warn(missing_docs)]

mod assertion;
mod browser;
mod config;
mod contract;
mod evidence;
mod harness;
mod locator;
mod reporter;
mod result;
mod view;
mod wait;

/// Scripted in-memory DOM for browserless tests
pub mod mock;

/// The garden scenario library
pub mod scenarios;

pub use assertion::{console_safe, preview, Assertion, AssertionResult};
pub use browser::{BrowserConfig, BrowserContext, BrowserSession, CdpView};
pub use config::{
    BrowserSettings, HarnessConfig, Timing, ViewportPresets, DEFAULT_BASE_URL,
    DEFAULT_OUTPUT_DIR,
};
pub use contract::{DomContract, Routes, CONTRACT_VERSION};
pub use evidence::{EvidenceCapturer, EVIDENCE_EXTENSION};
pub use harness::{Harness, Scenario, ScenarioContext, ScenarioReport, ScenarioRunner};
pub use locator::Selector;
pub use reporter::{OutcomeStatus, Recorder, RunSummary, ScenarioOutcome, SEPARATOR_WIDTH};
pub use result::{SmokeError, SmokeResult};
pub use view::{ContextProvider, View, Viewport};
pub use wait::{LoadState, WaitOptions};
