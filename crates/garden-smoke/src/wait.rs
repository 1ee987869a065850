//! Wait mechanisms.
//!
//! Playwright-style load states plus the network-idle heuristic used after
//! every navigation. CDP has no built-in "network idle" signal, so the page
//! is sampled: it is idle once `document.readyState` is `complete`, no
//! request is in flight, and the number of resource-timing entries has not
//! changed for [`NETWORK_IDLE_THRESHOLD_MS`].
//!
//! In-flight requests come from CDP network events and are tallied by
//! [`InflightRequests`]; the resource-timing count catches requests that
//! start and finish between two samples.

use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without new requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Page probe evaluated while waiting; returns `[readyState, resourceCount]`.
///
/// Browsers stop recording resource timings after 250 entries by default,
/// so the probe raises the limit before counting.
pub const LOAD_PROBE_SCRIPT: &str = r"(() => {
    performance.setResourceTimingBufferSize(10000);
    return JSON.stringify([document.readyState, performance.getEntriesByType('resource').length]);
})()";

/// Page load states (Playwright parity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle (no requests for 500ms)
    NetworkIdle,
}

impl LoadState {
    /// Get the name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Quiet period that counts as network idle
    pub idle_threshold_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            idle_threshold_ms: NETWORK_IDLE_THRESHOLD_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// One sample of the page's loading activity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadProbe {
    ready_state: String,
    resource_count: usize,
    pending: usize,
}

impl LoadProbe {
    /// Create a probe with no requests in flight
    #[must_use]
    pub fn new(ready_state: impl Into<String>, resource_count: usize) -> Self {
        Self {
            ready_state: ready_state.into(),
            resource_count,
            pending: 0,
        }
    }

    /// Set the number of requests still in flight
    #[must_use]
    pub const fn with_pending(mut self, pending: usize) -> Self {
        self.pending = pending;
        self
    }

    /// Document ready state
    #[must_use]
    pub fn ready_state(&self) -> &str {
        &self.ready_state
    }

    /// Resource-timing entries seen so far
    #[must_use]
    pub const fn resource_count(&self) -> usize {
        self.resource_count
    }

    /// Requests started but not yet finished or failed
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.pending
    }
}

/// Decodes the `[readyState, resourceCount]` pair [`LOAD_PROBE_SCRIPT`] returns
impl<'de> Deserialize<'de> for LoadProbe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (ready_state, resource_count) = <(String, usize)>::deserialize(deserializer)?;
        Ok(Self::new(ready_state, resource_count))
    }
}

/// Requests a page has started and not yet finished, keyed by request id
#[derive(Debug, Clone, Default)]
pub struct InflightRequests {
    ids: HashSet<String>,
}

impl InflightRequests {
    /// Create an empty tally
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A request was sent (redirects reuse the id and count once)
    pub fn started(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// A request finished or failed
    pub fn settled(&mut self, id: &str) {
        self.ids.remove(id);
    }

    /// Forget everything, e.g. when the page navigates away
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Requests still in flight
    #[must_use]
    pub fn pending(&self) -> usize {
        self.ids.len()
    }
}

/// Decides when a sequence of probes satisfies a [`LoadState`].
#[derive(Debug, Clone)]
pub struct LoadTracker {
    state: LoadState,
    idle_threshold: Duration,
    last_count: Option<usize>,
    quiet_since: Option<Instant>,
}

impl LoadTracker {
    /// Create a tracker for the given state
    #[must_use]
    pub fn new(state: LoadState, options: &WaitOptions) -> Self {
        Self {
            state,
            idle_threshold: Duration::from_millis(options.idle_threshold_ms),
            last_count: None,
            quiet_since: None,
        }
    }

    /// Feed a probe taken at `now`; returns true once the state is reached
    pub fn observe(&mut self, probe: &LoadProbe, now: Instant) -> bool {
        match self.state {
            LoadState::DomContentLoaded => probe.ready_state() != "loading",
            LoadState::Load => probe.ready_state() == "complete",
            LoadState::NetworkIdle => {
                if probe.ready_state() != "complete" || probe.pending() > 0 {
                    self.last_count = None;
                    self.quiet_since = None;
                    return false;
                }
                if self.last_count != Some(probe.resource_count()) {
                    self.last_count = Some(probe.resource_count());
                    self.quiet_since = Some(now);
                    return false;
                }
                self.quiet_since
                    .is_some_and(|since| now.duration_since(since) >= self.idle_threshold)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(state: &str, count: usize) -> LoadProbe {
        LoadProbe::new(state, count)
    }

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_event_names() {
            assert_eq!(LoadState::Load.event_name(), "load");
            assert_eq!(LoadState::DomContentLoaded.event_name(), "DOMContentLoaded");
            assert_eq!(format!("{}", LoadState::NetworkIdle), "networkidle");
        }

        #[test]
        fn test_default() {
            assert_eq!(LoadState::default(), LoadState::Load);
        }
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::new();
            assert_eq!(opts.timeout(), Duration::from_secs(30));
            assert_eq!(opts.poll_interval(), Duration::from_millis(50));
            assert_eq!(opts.idle_threshold_ms, NETWORK_IDLE_THRESHOLD_MS);
        }

        #[test]
        fn test_builders() {
            let opts = WaitOptions::new().with_timeout(1000).with_poll_interval(10);
            assert_eq!(opts.timeout_ms, 1000);
            assert_eq!(opts.poll_interval_ms, 10);
        }
    }

    mod tracker_tests {
        use super::*;

        #[test]
        fn test_probe_decodes_from_json() {
            let p: LoadProbe = serde_json::from_str(r#"["interactive", 7]"#).unwrap();
            assert_eq!(p.ready_state(), "interactive");
            assert_eq!(p.resource_count(), 7);
            assert_eq!(p.pending(), 0);
        }

        #[test]
        fn test_probe_script_enlarges_timing_buffer() {
            assert!(LOAD_PROBE_SCRIPT.contains("setResourceTimingBufferSize(10000)"));
            assert!(LOAD_PROBE_SCRIPT.contains("JSON.stringify("));
        }

        #[test]
        fn test_dom_content_loaded() {
            let mut t = LoadTracker::new(LoadState::DomContentLoaded, &WaitOptions::new());
            let now = Instant::now();
            assert!(!t.observe(&probe("loading", 0), now));
            assert!(t.observe(&probe("interactive", 0), now));
        }

        #[test]
        fn test_load_requires_complete() {
            let mut t = LoadTracker::new(LoadState::Load, &WaitOptions::new());
            let now = Instant::now();
            assert!(!t.observe(&probe("interactive", 3), now));
            assert!(t.observe(&probe("complete", 3), now));
        }

        #[test]
        fn test_network_idle_needs_quiet_period() {
            let mut t = LoadTracker::new(LoadState::NetworkIdle, &WaitOptions::new());
            let start = Instant::now();
            assert!(!t.observe(&probe("complete", 4), start));
            assert!(!t.observe(&probe("complete", 4), start + Duration::from_millis(200)));
            assert!(t.observe(&probe("complete", 4), start + Duration::from_millis(500)));
        }

        #[test]
        fn test_network_idle_resets_on_new_request() {
            let mut t = LoadTracker::new(LoadState::NetworkIdle, &WaitOptions::new());
            let start = Instant::now();
            assert!(!t.observe(&probe("complete", 4), start));
            assert!(!t.observe(&probe("complete", 5), start + Duration::from_millis(450)));
            assert!(!t.observe(&probe("complete", 5), start + Duration::from_millis(900)));
            assert!(t.observe(&probe("complete", 5), start + Duration::from_millis(950)));
        }

        #[test]
        fn test_network_idle_waits_for_load() {
            let mut t = LoadTracker::new(LoadState::NetworkIdle, &WaitOptions::new());
            let start = Instant::now();
            assert!(!t.observe(&probe("interactive", 2), start));
            assert!(!t.observe(&probe("interactive", 2), start + Duration::from_secs(2)));
        }

        #[test]
        fn test_network_idle_not_reached_while_request_pending() {
            let mut t = LoadTracker::new(LoadState::NetworkIdle, &WaitOptions::new());
            let start = Instant::now();
            let stalled = probe("complete", 12).with_pending(1);
            for step in 0..40 {
                let at = start + Duration::from_millis(step * 50);
                assert!(!t.observe(&stalled, at), "idle at {}ms", step * 50);
            }
        }

        #[test]
        fn test_network_idle_quiet_period_starts_when_request_settles() {
            let mut t = LoadTracker::new(LoadState::NetworkIdle, &WaitOptions::new());
            let start = Instant::now();
            let ms = |n| start + Duration::from_millis(n);
            assert!(!t.observe(&probe("complete", 12).with_pending(1), ms(0)));
            assert!(!t.observe(&probe("complete", 12).with_pending(1), ms(1_000)));
            // finished request, but its timing entry has not landed yet
            assert!(!t.observe(&probe("complete", 12), ms(1_050)));
            assert!(!t.observe(&probe("complete", 12), ms(1_500)));
            assert!(t.observe(&probe("complete", 12), ms(1_550)));
        }
    }

    mod inflight_tests {
        use super::*;

        #[test]
        fn test_started_and_settled() {
            let mut inflight = InflightRequests::new();
            inflight.started("1000.1");
            inflight.started("1000.2");
            assert_eq!(inflight.pending(), 2);
            inflight.settled("1000.1");
            assert_eq!(inflight.pending(), 1);
        }

        #[test]
        fn test_redirect_counts_once() {
            let mut inflight = InflightRequests::new();
            inflight.started("1000.7");
            inflight.started("1000.7");
            inflight.settled("1000.7");
            assert_eq!(inflight.pending(), 0);
        }

        #[test]
        fn test_unknown_settle_is_ignored() {
            let mut inflight = InflightRequests::new();
            inflight.settled("never-started");
            inflight.started("a");
            inflight.clear();
            assert_eq!(inflight.pending(), 0);
        }
    }
}
