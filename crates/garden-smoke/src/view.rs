//! The page abstraction scenarios are written against.
//!
//! [`View`] is one navigable page inside an isolated browsing context.
//! [`CdpView`](crate::CdpView) implements it over the Chrome DevTools
//! Protocol; [`MockView`](crate::mock::MockView) implements it over a
//! scripted in-memory DOM so scenarios run in unit tests.
//!
//! [`ContextProvider`] opens additional isolated contexts (the mobile
//! scenario needs one of its own).

use crate::locator::Selector;
use crate::result::SmokeResult;
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Desktop preset (1280x800)
    #[must_use]
    pub const fn desktop() -> Self {
        Self::new(1280, 800)
    }

    /// Phone preset (390x844)
    #[must_use]
    pub const fn mobile() -> Self {
        Self::new(390, 844)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A navigable page.
///
/// Methods that may change what the page shows take `&mut self`; pure DOM
/// questions take `&self`.
#[async_trait]
pub trait View: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&mut self, url: &str) -> SmokeResult<()>;

    /// Block until the page reaches `state`
    async fn wait_for_load_state(&mut self, state: LoadState) -> SmokeResult<()>;

    /// Fixed settling delay
    async fn wait_for_timeout(&mut self, duration: Duration);

    /// Number of elements matching `selector`
    async fn count(&self, selector: &Selector) -> SmokeResult<usize>;

    /// Whether the first element matching `selector` is visible
    async fn is_visible(&self, selector: &Selector) -> SmokeResult<bool>;

    /// Raw `textContent` of the first match, `None` when nothing matches
    async fn text_content(&self, selector: &Selector) -> SmokeResult<Option<String>>;

    /// Click the first match
    async fn click(&mut self, selector: &Selector) -> SmokeResult<()>;

    /// Replace the value of the first matching input
    async fn fill(&mut self, selector: &Selector, value: &str) -> SmokeResult<()>;

    /// PNG snapshot of the visible viewport (not the full scrollable page)
    async fn screenshot(&self) -> SmokeResult<Vec<u8>>;

    /// Start recording uncaught script errors on the current document
    async fn arm_error_capture(&mut self) -> SmokeResult<()>;

    /// Uncaught script errors recorded since [`View::arm_error_capture`]
    async fn drain_page_errors(&mut self) -> SmokeResult<Vec<String>>;

    /// Viewport this view was opened with
    fn viewport(&self) -> Viewport;

    /// Release the view and the browsing context it owns
    async fn close(&mut self) -> SmokeResult<()>;
}

/// Opens isolated browsing contexts with a single page each.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Create a fresh context with `viewport` and open a page in it
    async fn open_view(&self, viewport: Viewport) -> SmokeResult<Box<dyn View>>;
}
