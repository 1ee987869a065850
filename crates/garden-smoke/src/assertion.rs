//! Assertions for scenario checks.
//!
//! DOM predicates evaluated against a [`View`] plus the pure comparisons
//! scenarios turn into pass/fail outcomes. A DOM predicate only fails when
//! the view itself is unreachable; that error belongs to the scenario.

use crate::locator::Selector;
use crate::result::SmokeResult;
use crate::view::View;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Failure reason (empty when passed)
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

/// Assertion helpers shared by every scenario
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Number of elements matching `selector`
    ///
    /// # Errors
    ///
    /// Returns error if the view cannot be queried
    pub async fn count(view: &dyn View, selector: &Selector) -> SmokeResult<usize> {
        view.count(selector).await
    }

    /// Whether the first match is visible (false when nothing matches)
    ///
    /// # Errors
    ///
    /// Returns error if the view cannot be queried
    pub async fn is_visible(view: &dyn View, selector: &Selector) -> SmokeResult<bool> {
        view.is_visible(selector).await
    }

    /// At least one match exists and the first one is visible
    ///
    /// # Errors
    ///
    /// Returns error if the view cannot be queried
    pub async fn is_present_and_visible(view: &dyn View, selector: &Selector) -> SmokeResult<bool> {
        Ok(view.count(selector).await? > 0 && view.is_visible(selector).await?)
    }

    /// Trimmed, console-safe text of the first match
    ///
    /// # Errors
    ///
    /// Returns error if the view cannot be queried
    pub async fn text_content(view: &dyn View, selector: &Selector) -> SmokeResult<Option<String>> {
        Ok(view
            .text_content(selector)
            .await?
            .map(|text| console_safe(text.trim())))
    }

    /// `count` reaches `min`
    #[must_use]
    pub fn at_least(count: usize, min: usize) -> AssertionResult {
        if count >= min {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("only {count} found (expected >= {min})"))
        }
    }

    /// `after` is strictly greater than `before`
    #[must_use]
    pub fn increased(before: usize, after: usize) -> AssertionResult {
        if after > before {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("count didn't increase ({before})"))
        }
    }

    /// No uncaught page errors; reports at most the first two
    #[must_use]
    pub fn no_page_errors(errors: &[String]) -> AssertionResult {
        if errors.is_empty() {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(
                errors
                    .iter()
                    .take(2)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        }
    }
}

/// Replace every non-ASCII character with `?`
#[must_use]
pub fn console_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}

/// First `max_chars` characters of `text`
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage, MockView};
    use crate::result::SmokeError;

    mod text_tests {
        use super::*;

        #[test]
        fn test_console_safe() {
            assert_eq!(console_safe("12 vistas"), "12 vistas");
            assert_eq!(console_safe("👁 12"), "? 12");
            assert_eq!(console_safe("jardín"), "jard?n");
        }

        #[test]
        fn test_preview_counts_chars() {
            assert_eq!(preview("abc", 30), "abc");
            assert_eq!(preview("ñandú", 3), "ñan");
            assert_eq!(preview(&"x".repeat(40), 30).len(), 30);
        }
    }

    mod comparison_tests {
        use super::*;

        #[test]
        fn test_at_least_boundary() {
            assert!(Assertion::at_least(20, 20).passed);
            let r = Assertion::at_least(19, 20);
            assert!(!r.passed);
            assert_eq!(r.message, "only 19 found (expected >= 20)");
        }

        #[test]
        fn test_increased_is_strict() {
            assert!(Assertion::increased(10, 20).passed);
            let r = Assertion::increased(10, 10);
            assert_eq!(r.message, "count didn't increase (10)");
        }

        #[test]
        fn test_page_errors_first_two() {
            assert!(Assertion::no_page_errors(&[]).passed);
            let errors = vec!["a".to_string(), "b".to_string(), "c".to_string()];
            assert_eq!(Assertion::no_page_errors(&errors).message, "a; b");
        }
    }

    mod dom_tests {
        use super::*;

        fn view() -> MockView {
            let page = MockPage::new()
                .element(MockElement::new(".postCard").text("uno"))
                .element(MockElement::new(".postCard").text("dos"))
                .element(MockElement::new(".archiveWidget").hidden())
                .element(MockElement::new(".postViews").text("  👁 42 vistas \n"))
                .broken(".broken[");
            let mut view = MockView::new("http://garden.test").with_page("/posts", page);
            view.set_current("/posts");
            view
        }

        #[tokio::test]
        async fn test_count_and_visibility() {
            let v = view();
            assert_eq!(Assertion::count(&v, &Selector::css(".postCard")).await.unwrap(), 2);
            assert!(Assertion::is_present_and_visible(&v, &Selector::css(".postCard"))
                .await
                .unwrap());
            assert!(!Assertion::is_present_and_visible(&v, &Selector::css(".archiveWidget"))
                .await
                .unwrap());
            assert!(!Assertion::is_present_and_visible(&v, &Selector::css(".missing"))
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_text_filter() {
            let v = view();
            let sel = Selector::css(".postCard").with_text("DOS");
            assert_eq!(Assertion::count(&v, &sel).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_text_content_is_trimmed_and_safe() {
            let v = view();
            let text = Assertion::text_content(&v, &Selector::css(".postViews"))
                .await
                .unwrap();
            assert_eq!(text.as_deref(), Some("? 42 vistas"));
            assert!(Assertion::text_content(&v, &Selector::css(".nope"))
                .await
                .unwrap()
                .is_none());
        }

        #[tokio::test]
        async fn test_broken_selector_is_an_error() {
            let v = view();
            let err = Assertion::count(&v, &Selector::css(".broken[")).await.unwrap_err();
            assert!(matches!(err, SmokeError::Script { .. }));
        }
    }
}
