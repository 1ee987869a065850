//! Browser control over the Chrome DevTools Protocol.
//!
//! [`BrowserSession`] owns the Chromium process for the whole run. Every
//! [`View`] lives in its own CDP browser context (independent cookies and
//! storage) created by [`BrowserSession::new_context`]; closing the view
//! disposes that context. [`BrowserSession::shutdown`] closes the browser,
//! and dropping a session aborts the CDP handler task so early returns
//! still tear the connection down.
//!
//! Each [`CdpView`] also runs a small task that follows the page's CDP
//! network events, so network-idle waits know which requests are in flight.

use crate::locator::Selector;
use crate::result::{SmokeError, SmokeResult};
use crate::view::{ContextProvider, View, Viewport};
use crate::wait::{
    InflightRequests, LoadProbe, LoadState, LoadTracker, WaitOptions, LOAD_PROBE_SCRIPT,
};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, EventLoadingFailed, EventLoadingFinished,
    EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Installs `error`/`unhandledrejection` listeners that buffer messages on
/// the window; re-arming clears the buffer.
const ERROR_CAPTURE_SCRIPT: &str = r"(() => {
    if (!window.__gardenSmokeErrors) {
        window.__gardenSmokeErrors = [];
        window.addEventListener('error', (e) => {
            window.__gardenSmokeErrors.push(String(e.message || e.error || 'error'));
        });
        window.addEventListener('unhandledrejection', (e) => {
            window.__gardenSmokeErrors.push('Unhandled rejection: ' + String(e.reason));
        });
    } else {
        window.__gardenSmokeErrors.length = 0;
    }
    return JSON.stringify(true);
})()";

const ERROR_DRAIN_SCRIPT: &str = "JSON.stringify((window.__gardenSmokeErrors || []).splice(0))";

enum NetworkActivity {
    Started(String),
    Settled(String),
}

/// Follow the page's request lifecycle into `inflight` until the page goes away
async fn watch_network(
    page: &CdpPage,
    inflight: Arc<Mutex<InflightRequests>>,
) -> SmokeResult<JoinHandle<()>> {
    let listen_err = |e: chromiumoxide::error::CdpError| SmokeError::page(e.to_string());
    let started = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(listen_err)?
        .map(|e| NetworkActivity::Started(e.request_id.inner().clone()));
    let finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(listen_err)?
        .map(|e| NetworkActivity::Settled(e.request_id.inner().clone()));
    let failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(listen_err)?
        .map(|e| NetworkActivity::Settled(e.request_id.inner().clone()));

    page.execute(NetworkEnableParams::default())
        .await
        .map_err(listen_err)?;

    let mut events = Box::pin(futures::stream::select(
        started,
        futures::stream::select(finished, failed),
    ));
    Ok(tokio::spawn(async move {
        while let Some(activity) = events.next().await {
            let mut inflight = inflight.lock().await;
            match activity {
                NetworkActivity::Started(id) => inflight.started(id),
                NetworkActivity::Settled(id) => inflight.settled(&id),
            }
        }
    }))
}

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Window size of the launched browser
    pub window: Viewport,
    /// Timeouts for load-state waits
    pub wait: WaitOptions,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            window: Viewport::desktop(),
            wait: WaitOptions::default(),
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set window size
    #[must_use]
    pub const fn with_window(mut self, window: Viewport) -> Self {
        self.window = window;
        self
    }

    /// Set wait options
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }
}

/// The running browser process and its CDP connection
#[derive(Debug)]
pub struct BrowserSession {
    config: BrowserConfig,
    inner: Arc<Mutex<CdpBrowser>>,
    handle: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a new browser instance
    ///
    /// # Errors
    ///
    /// Returns [`SmokeError::BrowserLaunch`] if Chromium cannot be started
    pub async fn start(config: BrowserConfig) -> SmokeResult<Self> {
        let mut builder =
            CdpConfig::builder().window_size(config.window.width, config.window.height);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| SmokeError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| SmokeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!(error = %e, "CDP handler error");
                }
            }
        });

        tracing::info!(headless = config.headless, "browser launched");

        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Get the browser configuration
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Create an isolated browsing context
    ///
    /// # Errors
    ///
    /// Returns error if the context cannot be created
    pub async fn new_context(&self, viewport: Viewport) -> SmokeResult<BrowserContext> {
        let browser = self.inner.lock().await;
        let created = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| SmokeError::Context {
                message: e.to_string(),
            })?;
        let id = created.result.browser_context_id.clone();
        tracing::info!(%viewport, "browser context created");

        Ok(BrowserContext {
            id,
            viewport,
            wait: self.config.wait.clone(),
            browser: Arc::clone(&self.inner),
        })
    }

    /// Close the browser and every context it still holds
    ///
    /// # Errors
    ///
    /// Returns [`SmokeError::Shutdown`] if the browser does not close cleanly
    pub async fn shutdown(self) -> SmokeResult<()> {
        let mut browser = self.inner.lock().await;
        browser.close().await.map_err(|e| SmokeError::Shutdown {
            message: e.to_string(),
        })?;
        browser.wait().await.map_err(|e| SmokeError::Shutdown {
            message: e.to_string(),
        })?;
        tracing::info!("browser closed");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[async_trait]
impl ContextProvider for BrowserSession {
    async fn open_view(&self, viewport: Viewport) -> SmokeResult<Box<dyn View>> {
        let context = self.new_context(viewport).await?;
        match context.new_page().await {
            Ok(view) => Ok(Box::new(view)),
            Err(e) => {
                if let Err(close_err) = context.close().await {
                    tracing::warn!(error = %close_err, "failed to dispose context");
                }
                Err(e)
            }
        }
    }
}

/// An isolated CDP browser context
#[derive(Debug, Clone)]
pub struct BrowserContext {
    id: BrowserContextId,
    viewport: Viewport,
    wait: WaitOptions,
    browser: Arc<Mutex<CdpBrowser>>,
}

impl BrowserContext {
    /// Viewport applied to pages in this context
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Open a page inside this context
    ///
    /// The returned view owns the context and disposes it on close.
    ///
    /// # Errors
    ///
    /// Returns error if the page cannot be created
    pub async fn new_page(&self) -> SmokeResult<CdpView> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.id.clone())
            .build()
            .map_err(|message| SmokeError::Page { message })?;

        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page(params)
                .await
                .map_err(|e| SmokeError::page(e.to_string()))?
        };

        let metrics = SetDeviceMetricsOverrideParams::new(
            i64::from(self.viewport.width),
            i64::from(self.viewport.height),
            1.0,
            false,
        );
        page.execute(metrics)
            .await
            .map_err(|e| SmokeError::page(e.to_string()))?;

        let inflight = Arc::new(Mutex::new(InflightRequests::new()));
        let network_watch = watch_network(&page, Arc::clone(&inflight)).await?;

        Ok(CdpView {
            page,
            context: Some(self.clone()),
            viewport: self.viewport,
            wait: self.wait.clone(),
            url: String::from("about:blank"),
            inflight,
            network_watch,
        })
    }

    /// Dispose the context and all of its pages
    ///
    /// # Errors
    ///
    /// Returns error if the browser rejects the request
    pub async fn close(&self) -> SmokeResult<()> {
        let browser = self.browser.lock().await;
        browser
            .execute(DisposeBrowserContextParams::new(self.id.clone()))
            .await
            .map_err(|e| SmokeError::Context {
                message: e.to_string(),
            })?;
        tracing::info!(viewport = %self.viewport, "browser context disposed");
        Ok(())
    }
}

/// A browser page with a real CDP connection
#[derive(Debug)]
pub struct CdpView {
    page: CdpPage,
    context: Option<BrowserContext>,
    viewport: Viewport,
    wait: WaitOptions,
    url: String,
    inflight: Arc<Mutex<InflightRequests>>,
    network_watch: JoinHandle<()>,
}

impl CdpView {
    /// Get current URL
    #[must_use]
    pub fn current_url(&self) -> &str {
        &self.url
    }

    /// Evaluate a script that returns a JSON string and decode it
    async fn eval<T: DeserializeOwned>(&self, script: impl Into<String>) -> SmokeResult<T> {
        let json: String = self
            .page
            .evaluate_expression(EvaluateParams::new(script))
            .await
            .map_err(|e| SmokeError::script(e.to_string()))?
            .into_value()
            .map_err(|e| SmokeError::script(e.to_string()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[async_trait]
impl View for CdpView {
    async fn goto(&mut self, url: &str) -> SmokeResult<()> {
        tracing::debug!(url, "navigate");
        self.inflight.lock().await.clear();
        self.page
            .goto(url)
            .await
            .map_err(|e| SmokeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.url = url.to_string();
        Ok(())
    }

    async fn wait_for_load_state(&mut self, state: LoadState) -> SmokeResult<()> {
        let mut tracker = LoadTracker::new(state, &self.wait);
        let started = Instant::now();
        let deadline = started + self.wait.timeout();
        loop {
            let sampled: LoadProbe = self.eval(LOAD_PROBE_SCRIPT).await?;
            let probe = sampled.with_pending(self.inflight.lock().await.pending());
            let now = Instant::now();
            if tracker.observe(&probe, now) {
                tracing::debug!(%state, elapsed_ms = now.duration_since(started).as_millis() as u64, "load state reached");
                return Ok(());
            }
            if now >= deadline {
                return Err(SmokeError::Timeout {
                    ms: self.wait.timeout_ms,
                    waited_for: state.to_string(),
                });
            }
            tokio::time::sleep(self.wait.poll_interval()).await;
        }
    }

    async fn wait_for_timeout(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn count(&self, selector: &Selector) -> SmokeResult<usize> {
        let n = self.eval(selector.to_count_query()).await?;
        tracing::debug!(%selector, count = n, "count");
        Ok(n)
    }

    async fn is_visible(&self, selector: &Selector) -> SmokeResult<bool> {
        self.eval(selector.to_visible_query()).await
    }

    async fn text_content(&self, selector: &Selector) -> SmokeResult<Option<String>> {
        self.eval(selector.to_text_query()).await
    }

    async fn click(&mut self, selector: &Selector) -> SmokeResult<()> {
        let found: bool = self.eval(selector.to_click_script()).await?;
        if !found {
            return Err(SmokeError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &Selector, value: &str) -> SmokeResult<()> {
        let found: bool = self.eval(selector.to_fill_script(value)).await?;
        if !found {
            return Err(SmokeError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }

    async fn screenshot(&self) -> SmokeResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| SmokeError::Screenshot {
                message: e.to_string(),
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| SmokeError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn arm_error_capture(&mut self) -> SmokeResult<()> {
        let _: bool = self.eval(ERROR_CAPTURE_SCRIPT).await?;
        Ok(())
    }

    async fn drain_page_errors(&mut self) -> SmokeResult<Vec<String>> {
        self.eval(ERROR_DRAIN_SCRIPT).await
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    async fn close(&mut self) -> SmokeResult<()> {
        self.network_watch.abort();
        if let Some(context) = self.context.take() {
            context.close().await?;
        }
        Ok(())
    }
}

impl Drop for CdpView {
    fn drop(&mut self) {
        self.network_watch.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert!(config.chromium_path.is_none());
        assert_eq!(config.window, Viewport::desktop());
    }

    #[test]
    fn test_builders() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium")
            .with_window(Viewport::new(1024, 768))
            .with_wait(WaitOptions::new().with_timeout(5_000));
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(
            config.chromium_path.as_deref(),
            Some(std::path::Path::new("/usr/bin/chromium"))
        );
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.wait.timeout_ms, 5_000);
    }

    #[test]
    fn test_error_scripts_return_json() {
        assert!(ERROR_CAPTURE_SCRIPT.contains("JSON.stringify(true)"));
        assert!(ERROR_CAPTURE_SCRIPT.contains("unhandledrejection"));
        assert!(ERROR_DRAIN_SCRIPT.starts_with("JSON.stringify("));
    }
}
