//! Output formatting for `list` and error lines

use console::style;
use garden_smoke::{DomContract, Scenario};

/// Render the scenario catalogue, one line per scenario
#[must_use]
pub fn render_catalogue(scenarios: &[&dyn Scenario], contract: &DomContract, use_color: bool) -> String {
    let width = scenarios
        .iter()
        .map(|s| s.name().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for scenario in scenarios {
        let name = format!("{:<width$}", scenario.name());
        let route = scenario.route(contract);
        let line = if use_color {
            format!(
                "{:>2}. {}  {}",
                scenario.id(),
                style(name).bold(),
                style(route).dim()
            )
        } else {
            format!("{:>2}. {name}  {route}", scenario.id())
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Format an error for stderr
#[must_use]
pub fn error_line(message: &str, use_color: bool) -> String {
    if use_color {
        format!("{} {message}", style("Error:").red().bold())
    } else {
        format!("Error: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_smoke::Harness;

    #[test]
    fn test_catalogue_lists_every_scenario() {
        let harness = Harness::standard();
        let text = render_catalogue(&harness.all(), &DomContract::default(), false);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with(" 1. welcome page"));
        assert!(lines[0].ends_with("  /"));
        assert!(lines[4].contains("post detail page"));
        assert!(lines[4].ends_with("/posts/1"));
        assert!(lines[7].starts_with(" 8. mobile"));
    }

    #[test]
    fn test_error_line_plain() {
        assert_eq!(error_line("boom", false), "Error: boom");
    }
}
