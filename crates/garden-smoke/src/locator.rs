//! Selectors and the DOM queries they compile to.
//!
//! A [`Selector`] is a CSS selector with an optional visible-text filter,
//! the same shape as `page.locator("button").filter(has_text = "...")`.
//! Every query the harness runs against a live page is generated here so
//! that matching rules live in one place:
//!
//! - the text filter is a case-insensitive substring match on the
//!   whitespace-normalised `textContent`;
//! - single-element questions (visibility, text, click, fill) address the
//!   first match in document order;
//! - an element is visible when its bounding box is non-empty and its
//!   computed `visibility` is not `hidden`.
//!
//! Each script evaluates to a JSON string so the caller can decode it
//! without caring how the remote object was serialized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    /// CSS selector (e.g. `.postCard`, `.sideTitle, .gardenSidebar`)
    pub css: String,
    /// Text content the element must contain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            css: selector.into(),
            has_text: None,
        }
    }

    /// Filter by text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    /// Whether an element's text satisfies the text filter.
    ///
    /// Mirrors the in-page rule so non-browser views agree with Chromium.
    #[must_use]
    pub fn text_matches(&self, text: &str) -> bool {
        match self.has_text {
            None => true,
            Some(ref needle) => normalize(text).contains(&normalize(needle)),
        }
    }

    /// Query evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        self.wrap("return JSON.stringify(matches.length);")
    }

    /// Query evaluating to whether the first match is visible
    #[must_use]
    pub fn to_visible_query(&self) -> String {
        self.wrap(
            "const el = matches[0]; \
             if (!el) { return JSON.stringify(false); } \
             const rect = el.getBoundingClientRect(); \
             const style = window.getComputedStyle(el); \
             return JSON.stringify(rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden');",
        )
    }

    /// Query evaluating to the first match's `textContent` (or null)
    #[must_use]
    pub fn to_text_query(&self) -> String {
        self.wrap("return JSON.stringify(matches[0] ? matches[0].textContent : null);")
    }

    /// Script clicking the first match; evaluates to whether one was found
    #[must_use]
    pub fn to_click_script(&self) -> String {
        self.wrap(
            "const el = matches[0]; \
             if (!el) { return JSON.stringify(false); } \
             el.scrollIntoView({ block: 'center' }); \
             el.click(); \
             return JSON.stringify(true);",
        )
    }

    /// Script replacing the first match's value and firing `input`/`change`.
    ///
    /// Uses the prototype's native setter so framework-controlled inputs
    /// observe the change.
    #[must_use]
    pub fn to_fill_script(&self, value: &str) -> String {
        self.wrap(&format!(
            "const el = matches[0]; \
             if (!el) {{ return JSON.stringify(false); }} \
             el.focus(); \
             const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
             const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
             setter.call(el, {value}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return JSON.stringify(true);",
            value = js_string(value)
        ))
    }

    fn wrap(&self, body: &str) -> String {
        let text = self
            .has_text
            .as_deref()
            .map_or_else(|| "null".to_string(), js_string);
        format!(
            "(() => {{ \
             const norm = (s) => (s || '').replace(/\\s+/g, ' ').trim().toLowerCase(); \
             const text = {text}; \
             const all = Array.from(document.querySelectorAll({css})); \
             const matches = text === null ? all : all.filter((el) => norm(el.textContent).includes(norm(text))); \
             {body} \
             }})()",
            css = js_string(&self.css),
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.has_text {
            Some(ref text) => write!(f, "{} (has text {:?})", self.css, text),
            None => write!(f, "{}", self.css),
        }
    }
}

/// Encode a Rust string as a JavaScript string literal
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_selector() {
            let sel = Selector::css(".postCard");
            assert_eq!(sel.css, ".postCard");
            assert!(sel.has_text.is_none());
        }

        #[test]
        fn test_with_text() {
            let sel = Selector::css("button").with_text("entrar");
            assert_eq!(sel.has_text.as_deref(), Some("entrar"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css(".likeBtn").to_string(), ".likeBtn");
            assert_eq!(
                Selector::css(".shHeader").with_text("catch game").to_string(),
                ".shHeader (has text \"catch game\")"
            );
        }
    }

    mod text_match_tests {
        use super::*;

        #[test]
        fn test_no_filter_matches_everything() {
            assert!(Selector::css("p").text_matches(""));
        }

        #[test]
        fn test_case_insensitive() {
            let sel = Selector::css(".shHeader").with_text("catch game");
            assert!(sel.text_matches("▸ Catch Game"));
            assert!(!sel.text_matches("snake"));
        }

        #[test]
        fn test_whitespace_normalised() {
            let sel = Selector::css(".shHeader").with_text("catch game");
            assert!(sel.text_matches("  CATCH\n    game  "));
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_count_query_embeds_selector() {
            let q = Selector::css(".bulletinEntry").to_count_query();
            assert!(q.contains("querySelectorAll(\".bulletinEntry\")"));
            assert!(q.contains("matches.length"));
            assert!(q.contains("const text = null;"));
        }

        #[test]
        fn test_text_filter_is_encoded() {
            let q = Selector::css(".tinyText")
                .with_text("coincidan")
                .to_count_query();
            assert!(q.contains("const text = \"coincidan\";"));
        }

        #[test]
        fn test_quotes_are_escaped() {
            let q = Selector::css("a[title=\"x\"]").to_visible_query();
            assert!(q.contains(r#"querySelectorAll("a[title=\"x\"]")"#));
        }

        #[test]
        fn test_visible_query_checks_box_and_style() {
            let q = Selector::css("canvas").to_visible_query();
            assert!(q.contains("getBoundingClientRect"));
            assert!(q.contains("visibility !== 'hidden'"));
        }

        #[test]
        fn test_fill_script_encodes_value() {
            let q = Selector::css(".searchInput").to_fill_script("it's \"primer\"");
            assert!(q.contains(r#"setter.call(el, "it's \"primer\"");"#));
            assert!(q.contains("new Event('input'"));
        }

        #[test]
        fn test_click_script_targets_first_match() {
            let q = Selector::css(".loadMoreBtn").to_click_script();
            assert!(q.contains("matches[0]"));
            assert!(q.contains("el.click()"));
        }

        #[test]
        fn test_queries_are_iife() {
            let q = Selector::css(".postViews").to_text_query();
            assert!(q.starts_with("(() => {"));
            assert!(q.ends_with("})()"));
        }
    }
}
