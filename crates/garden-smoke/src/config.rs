//! Harness configuration.

use crate::browser::BrowserConfig;
use crate::contract::DomContract;
use crate::result::{SmokeError, SmokeResult};
use crate::view::Viewport;
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default application root (the Vite dev server)
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

/// Default evidence directory
pub const DEFAULT_OUTPUT_DIR: &str = "test_screenshots";

/// Named viewport presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportPresets {
    /// Shared desktop context
    pub desktop: Viewport,
    /// Mobile scenario context
    pub mobile: Viewport,
}

impl Default for ViewportPresets {
    fn default() -> Self {
        Self {
            desktop: Viewport::desktop(),
            mobile: Viewport::mobile(),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a window
    pub headless: bool,
    /// Chromium executable (auto-detected when unset)
    pub chromium_path: Option<PathBuf>,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
        }
    }
}

/// Settling delays and wait bounds, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Upper bound on a network-idle wait
    pub idle_timeout_ms: u64,
    /// After typing a search query
    pub search_settle_ms: u64,
    /// Before checking the view counter
    pub view_counter_settle_ms: u64,
    /// After clicking load-more
    pub load_more_settle_ms: u64,
    /// After opening the catch-game section
    pub accordion_settle_ms: u64,
    /// Page-error observation window
    pub error_window_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 30_000,
            search_settle_ms: 300,
            view_counter_settle_ms: 1_500,
            load_more_settle_ms: 300,
            accordion_settle_ms: 800,
            error_window_ms: 500,
        }
    }
}

impl Timing {
    /// Convert a millisecond field to a [`Duration`]
    #[must_use]
    pub const fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }
}

/// Complete harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Application root
    pub base_url: String,
    /// Evidence destination
    pub output_dir: PathBuf,
    /// Viewport presets
    pub viewports: ViewportPresets,
    /// Browser launch settings
    pub browser: BrowserSettings,
    /// Delays and timeouts
    pub timing: Timing,
    /// DOM contract with the site
    pub contract: DomContract,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            viewports: ViewportPresets::default(),
            browser: BrowserSettings::default(),
            timing: Timing::default(),
            contract: DomContract::default(),
        }
    }
}

impl HarnessConfig {
    /// Create a default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not valid YAML
    pub fn from_yaml_file(path: &Path) -> SmokeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse a configuration document
    ///
    /// # Errors
    ///
    /// Returns error if the document is not valid YAML for this schema
    pub fn from_yaml_str(text: &str) -> SmokeResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> SmokeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Check the configuration before anything is launched
    ///
    /// # Errors
    ///
    /// Returns [`SmokeError::Config`] describing the first problem found
    pub fn validate(&self) -> SmokeResult<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SmokeError::config(format!(
                "base_url must start with http:// or https:// (got {url:?})"
            )));
        }
        let rest = url.split_once("://").map_or("", |(_, rest)| rest);
        if rest.trim_matches('/').is_empty() {
            return Err(SmokeError::config(format!("base_url has no host (got {url:?})")));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(SmokeError::config("output_dir must not be empty"));
        }
        for (name, vp) in [
            ("desktop", self.viewports.desktop),
            ("mobile", self.viewports.mobile),
        ] {
            if vp.width == 0 || vp.height == 0 {
                return Err(SmokeError::config(format!(
                    "{name} viewport must be non-empty (got {vp})"
                )));
            }
        }
        if self.timing.idle_timeout_ms == 0 {
            return Err(SmokeError::config("timing.idle_timeout_ms must be positive"));
        }
        Ok(())
    }

    /// Absolute URL of an application route
    #[must_use]
    pub fn url(&self, route: &str) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        if route.is_empty() || route == "/" {
            format!("{base}/")
        } else if route.starts_with('/') {
            format!("{base}{route}")
        } else {
            format!("{base}/{route}")
        }
    }

    /// Launch settings for the browser session
    #[must_use]
    pub fn browser_config(&self) -> BrowserConfig {
        let mut config = BrowserConfig::default()
            .with_headless(self.browser.headless)
            .with_window(self.viewports.desktop)
            .with_wait(WaitOptions::new().with_timeout(self.timing.idle_timeout_ms));
        if let Some(ref path) = self.browser.chromium_path {
            config = config.with_chromium_path(path.clone());
        }
        if !self.browser.sandbox {
            config = config.with_no_sandbox();
        }
        config
    }
}
