//! Reporter - pass/fail bookkeeping for a smoke run.
//!
//! The [`Recorder`] keeps every outcome in insertion order and never
//! mutates or removes one. Each outcome is echoed to standard output as it
//! is recorded; [`Recorder::summarize`] prints the closing block and
//! [`Recorder::exit_code`] turns the run into a process status.
//!
//! ```text
//!   [OK]  posts: search input rendered
//!   [FAIL] posts: archive widget: not found
//!
//! ======================================================
//!   PASSED: 1   FAILED: 1
//! ======================================================
//!
//! Failed tests:
//!   * posts: archive widget: not found
//! ```

use console::{style, Term};
use serde::{Deserialize, Serialize};

/// Width of the summary separator line
pub const SEPARATOR_WIDTH: usize = 54;

/// Outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    /// Check passed
    Pass,
    /// Check failed
    Fail,
}

impl OutcomeStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail)
    }
}

/// One recorded check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario the check belongs to
    pub scenario: String,
    /// Human-readable label
    pub name: String,
    /// Pass or fail
    pub status: OutcomeStatus,
    /// Present iff the check failed
    pub reason: Option<String>,
}

impl ScenarioOutcome {
    /// Create a passing outcome
    #[must_use]
    pub fn pass(scenario: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            name: name.into(),
            status: OutcomeStatus::Pass,
            reason: None,
        }
    }

    /// Create a failing outcome
    #[must_use]
    pub fn fail(
        scenario: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            scenario: scenario.into(),
            name: name.into(),
            status: OutcomeStatus::Fail,
            reason: Some(reason.into()),
        }
    }
}

/// Counts and failures derived from a recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Passing outcomes
    pub passed: usize,
    /// Failing outcomes
    pub failed: usize,
    /// Failing outcomes in recording order
    pub failures: Vec<ScenarioOutcome>,
}

impl RunSummary {
    /// Total outcomes
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Whether nothing failed
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Process exit status: 0 when nothing failed, 1 otherwise
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// Render the closing block
    #[must_use]
    pub fn render(&self) -> String {
        let sep = "=".repeat(SEPARATOR_WIDTH);
        let mut out = format!(
            "\n{sep}\n  PASSED: {}   FAILED: {}\n{sep}\n",
            self.passed, self.failed
        );
        if !self.failures.is_empty() {
            out.push_str("\nFailed tests:\n");
            for failure in &self.failures {
                out.push_str(&format!(
                    "  * {}: {}\n",
                    failure.name,
                    failure.reason.as_deref().unwrap_or_default()
                ));
            }
            out.push('\n');
        }
        out
    }
}

/// Accumulates outcomes for a run
#[derive(Debug)]
pub struct Recorder {
    outcomes: Vec<ScenarioOutcome>,
    current_scenario: String,
    echo: bool,
    use_color: bool,
    term: Term,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// Create a recorder that echoes to standard output
    #[must_use]
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            current_scenario: String::new(),
            echo: true,
            use_color: false,
            term: Term::stdout(),
        }
    }

    /// Create a recorder that prints nothing
    #[must_use]
    pub fn silent() -> Self {
        Self::new().with_echo(false)
    }

    /// Enable or disable echoing
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Enable or disable colored markers
    #[must_use]
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Attribute subsequent outcomes to `scenario`
    pub fn begin_scenario(&mut self, scenario: impl Into<String>) {
        self.current_scenario = scenario.into();
    }

    /// Scenario outcomes are currently attributed to
    #[must_use]
    pub fn current_scenario(&self) -> &str {
        &self.current_scenario
    }

    /// Print a scenario heading
    pub fn section(&self, title: &str) {
        let heading = if self.use_color {
            style(format!("-- {title} --")).bold().to_string()
        } else {
            format!("-- {title} --")
        };
        self.emit(&format!("\n{heading}"));
    }

    /// Print an informational line that is not an outcome
    pub fn note(&self, message: &str) {
        self.emit(&format!("         {message}"));
    }

    /// Record a passing check
    pub fn record_pass(&mut self, name: impl Into<String>) {
        let outcome = ScenarioOutcome::pass(self.current_scenario.clone(), name);
        let marker = if self.use_color {
            style("[OK]").green().bold().to_string()
        } else {
            "[OK]".to_string()
        };
        self.emit(&format!("  {marker}  {}", outcome.name));
        self.outcomes.push(outcome);
    }

    /// Record a failing check
    pub fn record_fail(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        let outcome = ScenarioOutcome::fail(self.current_scenario.clone(), name, reason);
        let marker = if self.use_color {
            style("[FAIL]").red().bold().to_string()
        } else {
            "[FAIL]".to_string()
        };
        self.emit(&format!(
            "  {marker} {}: {}",
            outcome.name,
            outcome.reason.as_deref().unwrap_or_default()
        ));
        self.outcomes.push(outcome);
    }

    /// Record `pass_name` when `passed`, otherwise `fail_name` with `reason`
    pub fn check(
        &mut self,
        passed: bool,
        pass_name: impl Into<String>,
        fail_name: impl Into<String>,
        reason: impl Into<String>,
    ) {
        if passed {
            self.record_pass(pass_name);
        } else {
            self.record_fail(fail_name, reason);
        }
    }

    /// All outcomes in recording order
    #[must_use]
    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    /// Outcomes recorded for one scenario
    #[must_use]
    pub fn outcomes_for(&self, scenario: &str) -> Vec<&ScenarioOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.scenario == scenario)
            .collect()
    }

    /// Number of passing outcomes
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_pass()).count()
    }

    /// Number of failing outcomes
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_fail()).count()
    }

    /// Derive the summary without printing
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            passed: self.passed_count(),
            failed: self.failed_count(),
            failures: self
                .outcomes
                .iter()
                .filter(|o| o.status.is_fail())
                .cloned()
                .collect(),
        }
    }

    /// Print the closing block and return the summary
    pub fn summarize(&self) -> RunSummary {
        let summary = self.summary();
        if self.echo {
            let _ = self.term.write_str(&summary.render());
        }
        summary
    }

    /// 0 if no failures were recorded, 1 otherwise
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.failed_count() == 0 {
            0
        } else {
            1
        }
    }

    fn emit(&self, line: &str) {
        if self.echo {
            let _ = self.term.write_line(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod outcome_tests {
        use super::*;

        #[test]
        fn test_pass_has_no_reason() {
            let o = ScenarioOutcome::pass("posts page", "posts: search input rendered");
            assert_eq!(o.status, OutcomeStatus::Pass);
            assert!(o.reason.is_none());
        }

        #[test]
        fn test_fail_carries_reason() {
            let o = ScenarioOutcome::fail("posts page", "posts: tag pills", "none found");
            assert!(o.status.is_fail());
            assert_eq!(o.reason.as_deref(), Some("none found"));
        }
    }

    mod recorder_tests {
        use super::*;

        #[test]
        fn test_empty_recorder_exits_zero() {
            let rec = Recorder::silent();
            assert_eq!(rec.exit_code(), 0);
            assert_eq!(rec.summary().total(), 0);
        }

        #[test]
        fn test_outcomes_are_attributed() {
            let mut rec = Recorder::silent();
            rec.begin_scenario("welcome page");
            rec.record_pass("welcome page renders with enter button");
            rec.begin_scenario("main layout");
            rec.record_fail("main layout", "sidebar not found after entering");

            assert_eq!(rec.outcomes_for("welcome page").len(), 1);
            assert_eq!(rec.outcomes_for("main layout").len(), 1);
            assert_eq!(rec.outcomes()[1].scenario, "main layout");
            assert_eq!(rec.current_scenario(), "main layout");
        }

        #[test]
        fn test_check_records_exactly_one() {
            let mut rec = Recorder::silent();
            rec.check(true, "ok label", "fail label", "reason");
            rec.check(false, "ok label", "fail label", "reason");
            assert_eq!(rec.outcomes().len(), 2);
            assert_eq!(rec.outcomes()[0].name, "ok label");
            assert_eq!(rec.outcomes()[1].name, "fail label");
            assert_eq!(rec.outcomes()[1].reason.as_deref(), Some("reason"));
        }

        #[test]
        fn test_one_failure_means_exit_one() {
            let mut rec = Recorder::silent();
            rec.record_pass("a");
            rec.record_pass("b");
            rec.record_fail("c", "broken");
            assert_eq!(rec.exit_code(), 1);
            assert_eq!(rec.passed_count(), 2);
            assert_eq!(rec.failed_count(), 1);
        }

        #[test]
        fn test_summarize_is_idempotent() {
            let mut rec = Recorder::silent();
            rec.record_pass("a");
            rec.record_fail("b", "nope");
            assert_eq!(rec.summarize(), rec.summarize());
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_render_without_failures() {
            let summary = RunSummary {
                passed: 3,
                failed: 0,
                failures: vec![],
            };
            let sep = "=".repeat(54);
            assert_eq!(
                summary.render(),
                format!("\n{sep}\n  PASSED: 3   FAILED: 0\n{sep}\n")
            );
        }

        #[test]
        fn test_render_lists_failures_in_order() {
            let mut rec = Recorder::silent();
            rec.record_fail("games: accordion sections", "only 12 found (expected >= 20)");
            rec.record_pass("x");
            rec.record_fail("bulletin: load more", "count didn't increase (10)");
            let text = rec.summary().render();
            assert!(text.contains("  PASSED: 1   FAILED: 2"));
            assert!(text.contains("\nFailed tests:\n"));
            let first = text
                .find("  * games: accordion sections: only 12 found (expected >= 20)")
                .unwrap();
            let second = text
                .find("  * bulletin: load more: count didn't increase (10)")
                .unwrap();
            assert!(first < second);
            assert!(text.ends_with("\n\n"));
        }
    }

    proptest! {
        #[test]
        fn prop_exit_code_iff_failure(checks in proptest::collection::vec(proptest::option::of("[a-z]{1,8}"), 0..40)) {
            let mut rec = Recorder::silent();
            for (i, reason) in checks.iter().enumerate() {
                match reason {
                    Some(r) => rec.record_fail(format!("check {i}"), r.clone()),
                    None => rec.record_pass(format!("check {i}")),
                }
            }
            let any_fail = checks.iter().any(Option::is_some);
            prop_assert_eq!(rec.exit_code(), i32::from(any_fail));
            prop_assert_eq!(rec.summary().exit_code(), rec.exit_code());
            prop_assert_eq!(rec.outcomes().len(), checks.len());
        }

        #[test]
        fn prop_insertion_order_preserved(n in 0usize..30) {
            let mut rec = Recorder::silent();
            for i in 0..n {
                if i % 3 == 0 {
                    rec.record_fail(format!("c{i}"), "r");
                } else {
                    rec.record_pass(format!("c{i}"));
                }
            }
            let names: Vec<String> = rec.outcomes().iter().map(|o| o.name.clone()).collect();
            let expected: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
            prop_assert_eq!(names, expected);
            let s1 = rec.summary();
            let s2 = rec.summary();
            prop_assert_eq!(s1.total(), n);
            prop_assert_eq!(s1, s2);
        }
    }
}
