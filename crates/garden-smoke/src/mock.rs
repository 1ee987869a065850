//! Scripted in-memory DOM for testing scenarios without a browser.
//!
//! A [`MockView`] maps routes to [`MockPage`]s. Each page holds an ordered
//! list of [`MockElement`]s plus reactions: filling an input with a given
//! value or clicking a given selector swaps the live element list for a new
//! one, and clicks may raise page errors. Selectors that should make the DOM
//! query throw are declared with [`MockPage::broken`]; selectors that should
//! crash the driver outright with [`MockPage::panics_on`].
//!
//! ## Example
//!
//! ```rust
//! use garden_smoke::mock::{MockElement, MockPage, MockView};
//! use garden_smoke::Selector;
//!
//! let posts = MockPage::new()
//!     .element(MockElement::new(".searchInput"))
//!     .repeated(MockElement::new(".postCard"), 3)
//!     .on_fill("primer", MockPage::new().element(MockElement::new(".postCard")));
//! let view = MockView::new("http://localhost:5173").with_page("/posts", posts);
//! ```
//!
//! Element matching is by selector token: a selector list such as
//! `.sideTitle, .gardenSidebar` matches an element registered under either
//! token. The text filter follows [`Selector::text_matches`].

use crate::locator::Selector;
use crate::result::{SmokeError, SmokeResult};
use crate::view::{ContextProvider, View, Viewport};
use crate::wait::LoadState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Bytes returned by [`MockView::screenshot`] (a PNG signature)
pub const MOCK_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// One element in a scripted page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    selectors: Vec<String>,
    text: String,
    visible: bool,
}

impl MockElement {
    /// Create a visible element matched by `css`
    #[must_use]
    pub fn new(css: impl Into<String>) -> Self {
        Self {
            selectors: vec![css.into()],
            text: String::new(),
            visible: true,
        }
    }

    /// Also match `css`
    #[must_use]
    pub fn also(mut self, css: impl Into<String>) -> Self {
        self.selectors.push(css.into());
        self
    }

    /// Set text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Make the element invisible
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Whether `selector` matches this element
    #[must_use]
    pub fn matches(&self, selector: &Selector) -> bool {
        let hit = selector
            .css
            .split(',')
            .map(str::trim)
            .any(|part| self.selectors.iter().any(|s| s == part));
        hit && selector.text_matches(&self.text)
    }
}

/// A scripted route
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    elements: Vec<MockElement>,
    broken: Vec<String>,
    panicking: Vec<String>,
    on_fill: Vec<(String, Vec<MockElement>)>,
    on_click: Vec<(Selector, Vec<MockElement>)>,
    click_errors: Vec<(Selector, Vec<String>)>,
}

impl MockPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element
    #[must_use]
    pub fn element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Append `n` copies of an element
    #[must_use]
    pub fn repeated(mut self, element: MockElement, n: usize) -> Self {
        self.elements
            .extend(std::iter::repeat(element).take(n));
        self
    }

    /// Queries using exactly this CSS throw
    #[must_use]
    pub fn broken(mut self, css: impl Into<String>) -> Self {
        self.broken.push(css.into());
        self
    }

    /// Queries using exactly this CSS panic
    #[must_use]
    pub fn panics_on(mut self, css: impl Into<String>) -> Self {
        self.panicking.push(css.into());
        self
    }

    /// After filling any input with `value`, show `next`'s elements
    #[must_use]
    pub fn on_fill(mut self, value: impl Into<String>, next: MockPage) -> Self {
        self.on_fill.push((value.into(), next.elements));
        self
    }

    /// After clicking `selector`, show `next`'s elements
    #[must_use]
    pub fn on_click(mut self, selector: Selector, next: MockPage) -> Self {
        self.on_click.push((selector, next.elements));
        self
    }

    /// Clicking `selector` raises uncaught page errors
    #[must_use]
    pub fn errors_on_click(mut self, selector: Selector, errors: Vec<String>) -> Self {
        self.click_errors.push((selector, errors));
        self
    }
}

/// In-memory [`View`]
#[derive(Debug, Clone)]
pub struct MockView {
    base_url: String,
    pages: HashMap<String, MockPage>,
    failing_routes: Vec<String>,
    current: Option<String>,
    live: Vec<MockElement>,
    viewport: Viewport,
    armed: bool,
    errors: Vec<String>,
    visited: Vec<String>,
    waited: Duration,
    closed: bool,
    closes: Arc<AtomicUsize>,
}

impl MockView {
    /// Create a view of a site rooted at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pages: HashMap::new(),
            failing_routes: Vec::new(),
            current: None,
            live: Vec::new(),
            viewport: Viewport::desktop(),
            armed: false,
            errors: Vec::new(),
            visited: Vec::new(),
            waited: Duration::ZERO,
            closed: false,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Serve `page` at `route`
    #[must_use]
    pub fn with_page(mut self, route: impl Into<String>, page: MockPage) -> Self {
        self.pages.insert(route.into(), page);
        self
    }

    /// Set viewport
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Navigating to `route` fails
    #[must_use]
    pub fn failing_route(mut self, route: impl Into<String>) -> Self {
        self.failing_routes.push(route.into());
        self
    }

    /// Copy of this site with fresh navigation state and close counter
    #[must_use]
    pub fn detached(&self) -> Self {
        let mut view = Self::new(self.base_url.clone()).with_viewport(self.viewport);
        view.pages = self.pages.clone();
        view.failing_routes = self.failing_routes.clone();
        view
    }

    /// Show `route` without going through [`View::goto`]
    pub fn set_current(&mut self, route: &str) {
        self.live = self
            .pages
            .get(route)
            .map(|p| p.elements.clone())
            .unwrap_or_default();
        self.current = Some(route.to_string());
    }

    /// Routes navigated to, in order
    #[must_use]
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Total settling time requested
    #[must_use]
    pub fn waited(&self) -> Duration {
        self.waited
    }

    /// Counter incremented by every [`View::close`] on this view or its clones
    #[must_use]
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    /// Number of close calls
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn route_of(&self, url: &str) -> String {
        match url.strip_prefix(&self.base_url) {
            Some("") => "/".to_string(),
            Some(rest) => rest.to_string(),
            None => url.to_string(),
        }
    }

    fn page(&self) -> MockPage {
        self.current
            .as_ref()
            .and_then(|route| self.pages.get(route))
            .cloned()
            .unwrap_or_default()
    }

    fn ensure_open(&self) -> SmokeResult<()> {
        if self.closed {
            Err(SmokeError::page("view is closed"))
        } else {
            Ok(())
        }
    }

    fn find(&self, selector: &Selector) -> SmokeResult<Vec<&MockElement>> {
        self.ensure_open()?;
        let page = self
            .current
            .as_ref()
            .and_then(|route| self.pages.get(route));
        if page.is_some_and(|p| p.panicking.contains(&selector.css)) {
            panic!("driver crashed querying {}", selector.css);
        }
        if page.is_some_and(|p| p.broken.contains(&selector.css)) {
            return Err(SmokeError::script(format!(
                "SyntaxError: '{}' is not a valid selector",
                selector.css
            )));
        }
        Ok(self.live.iter().filter(|e| e.matches(selector)).collect())
    }

    fn require(&self, selector: &Selector) -> SmokeResult<()> {
        if self.find(selector)?.is_empty() {
            Err(SmokeError::ElementNotFound {
                selector: selector.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl View for MockView {
    async fn goto(&mut self, url: &str) -> SmokeResult<()> {
        self.ensure_open()?;
        let route = self.route_of(url);
        self.visited.push(route.clone());
        if self.failing_routes.contains(&route) {
            return Err(SmokeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        self.set_current(&route);
        self.armed = false;
        self.errors.clear();
        Ok(())
    }

    async fn wait_for_load_state(&mut self, _state: LoadState) -> SmokeResult<()> {
        self.ensure_open()
    }

    async fn wait_for_timeout(&mut self, duration: Duration) {
        self.waited += duration;
    }

    async fn count(&self, selector: &Selector) -> SmokeResult<usize> {
        Ok(self.find(selector)?.len())
    }

    async fn is_visible(&self, selector: &Selector) -> SmokeResult<bool> {
        Ok(self.find(selector)?.first().is_some_and(|e| e.visible))
    }

    async fn text_content(&self, selector: &Selector) -> SmokeResult<Option<String>> {
        Ok(self.find(selector)?.first().map(|e| e.text.clone()))
    }

    async fn click(&mut self, selector: &Selector) -> SmokeResult<()> {
        self.require(selector)?;
        let page = self.page();
        if self.armed {
            for (target, errors) in &page.click_errors {
                if target == selector {
                    self.errors.extend(errors.iter().cloned());
                }
            }
        }
        if let Some((_, next)) = page.on_click.iter().find(|(target, _)| target == selector) {
            self.live = next.clone();
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &Selector, value: &str) -> SmokeResult<()> {
        self.require(selector)?;
        let page = self.page();
        if let Some((_, next)) = page.on_fill.iter().find(|(v, _)| v == value) {
            self.live = next.clone();
        }
        Ok(())
    }

    async fn screenshot(&self) -> SmokeResult<Vec<u8>> {
        self.ensure_open()?;
        Ok(MOCK_PNG.to_vec())
    }

    async fn arm_error_capture(&mut self) -> SmokeResult<()> {
        self.ensure_open()?;
        self.armed = true;
        Ok(())
    }

    async fn drain_page_errors(&mut self) -> SmokeResult<Vec<String>> {
        self.ensure_open()?;
        Ok(std::mem::take(&mut self.errors))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    async fn close(&mut self) -> SmokeResult<()> {
        self.closed = true;
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// [`ContextProvider`] handing out detached copies of a template view
#[derive(Debug, Clone)]
pub struct MockContexts {
    template: MockView,
    opens: Arc<AtomicUsize>,
    fail_open: bool,
}

impl MockContexts {
    /// Serve copies of `template`; all copies share one close counter
    #[must_use]
    pub fn new(template: &MockView) -> Self {
        Self {
            template: template.detached(),
            opens: Arc::new(AtomicUsize::new(0)),
            fail_open: false,
        }
    }

    /// Every open fails
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Contexts opened so far
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Close calls across every view handed out
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.template.close_count()
    }
}

#[async_trait]
impl ContextProvider for MockContexts {
    async fn open_view(&self, viewport: Viewport) -> SmokeResult<Box<dyn View>> {
        if self.fail_open {
            return Err(SmokeError::Context {
                message: format!("could not create {viewport} context"),
            });
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.template.clone().with_viewport(viewport)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://garden.test";

    fn posts() -> MockPage {
        MockPage::new()
            .element(MockElement::new(".searchInput"))
            .repeated(MockElement::new(".postCard"), 3)
            .on_fill(
                "primer",
                MockPage::new()
                    .element(MockElement::new(".searchInput"))
                    .element(MockElement::new(".postCard")),
            )
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_selector_list_matches_any_token() {
            let el = MockElement::new(".gardenSidebar");
            assert!(el.matches(&Selector::css(".sideTitle, .gardenSidebar")));
            assert!(!el.matches(&Selector::css(".sideTitle")));
        }

        #[test]
        fn test_text_filter() {
            let el = MockElement::new("button").text("Entrar al jardín");
            assert!(el.matches(&Selector::css("button").with_text("entrar")));
            assert!(!el.matches(&Selector::css("button").with_text("salir")));
        }
    }

    mod view_tests {
        use super::*;

        #[tokio::test]
        async fn test_goto_resolves_route() {
            let mut view = MockView::new(BASE).with_page("/posts", posts());
            view.goto("http://garden.test/posts").await.unwrap();
            assert_eq!(view.count(&Selector::css(".postCard")).await.unwrap(), 3);
            view.goto("http://garden.test").await.unwrap();
            assert_eq!(view.visited(), ["/posts", "/"]);
            assert_eq!(view.count(&Selector::css(".postCard")).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_fill_swaps_elements() {
            let mut view = MockView::new(BASE).with_page("/posts", posts());
            view.goto("http://garden.test/posts").await.unwrap();
            view.fill(&Selector::css(".searchInput"), "primer").await.unwrap();
            assert_eq!(view.count(&Selector::css(".postCard")).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_click_missing_element() {
            let mut view = MockView::new(BASE).with_page("/posts", posts());
            view.goto("http://garden.test/posts").await.unwrap();
            let err = view.click(&Selector::css(".loadMoreBtn")).await.unwrap_err();
            assert!(matches!(err, SmokeError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_errors_only_when_armed() {
            let header = Selector::css(".shHeader");
            let page = MockPage::new()
                .element(MockElement::new(".shHeader"))
                .errors_on_click(header.clone(), vec!["boom".to_string()]);
            let mut view = MockView::new(BASE).with_page("/games", page);
            view.goto("http://garden.test/games").await.unwrap();

            view.click(&header).await.unwrap();
            assert!(view.drain_page_errors().await.unwrap().is_empty());

            view.arm_error_capture().await.unwrap();
            view.click(&header).await.unwrap();
            assert_eq!(view.drain_page_errors().await.unwrap(), vec!["boom"]);
            assert!(view.drain_page_errors().await.unwrap().is_empty());
        }

        #[tokio::test]
        #[should_panic(expected = "driver crashed querying .postCard")]
        async fn test_panicking_selector() {
            let mut view = MockView::new(BASE).with_page("/posts", posts().panics_on(".postCard"));
            view.goto("http://garden.test/posts").await.unwrap();
            let _ = view.count(&Selector::css(".postCard")).await;
        }

        #[tokio::test]
        async fn test_failing_route() {
            let mut view = MockView::new(BASE).failing_route("/bulletin");
            let err = view.goto("http://garden.test/bulletin").await.unwrap_err();
            assert!(matches!(err, SmokeError::Navigation { .. }));
        }

        #[tokio::test]
        async fn test_closed_view_rejects_queries() {
            let mut view = MockView::new(BASE).with_page("/posts", posts());
            view.close().await.unwrap();
            assert_eq!(view.close_count(), 1);
            assert!(view.count(&Selector::css(".postCard")).await.is_err());
        }

        #[tokio::test]
        async fn test_waits_accumulate() {
            let mut view = MockView::new(BASE);
            view.wait_for_timeout(Duration::from_millis(300)).await;
            view.wait_for_timeout(Duration::from_millis(800)).await;
            assert_eq!(view.waited(), Duration::from_millis(1_100));
        }
    }

    mod contexts_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_and_close_are_counted() {
            let site = MockView::new(BASE).with_page("/posts", posts());
            let contexts = MockContexts::new(&site);

            let mut view = contexts.open_view(Viewport::mobile()).await.unwrap();
            assert_eq!(view.viewport(), Viewport::mobile());
            view.close().await.unwrap();

            assert_eq!(contexts.open_count(), 1);
            assert_eq!(contexts.close_count(), 1);
            assert_eq!(site.close_count(), 0);
        }

        #[tokio::test]
        async fn test_failing_provider() {
            let contexts = MockContexts::new(&MockView::new(BASE)).failing();
            assert!(contexts.open_view(Viewport::mobile()).await.is_err());
            assert_eq!(contexts.open_count(), 0);
        }
    }
}
