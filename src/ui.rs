use colored::{ColoredString, Colorize};
use declarative::{Action, AttributeChange, DiffSummary, ExecuteSummary};
use serde_json::Value;

/// Widest attribute value shown in a plan before it is shortened
const MAX_VALUE_WIDTH: usize = 60;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

// ============================================================================
// Plan Rendering
// ============================================================================

/// Symbol shown in front of a planned change
pub fn action_symbol(action: &Action) -> ColoredString {
    match action {
        Action::Create => "+".green().bold(),
        Action::Update { .. } => "~".yellow().bold(),
        Action::Replace { .. } => "-/+".magenta().bold(),
        Action::Delete => "-".red().bold(),
        Action::NoOp => " ".normal(),
    }
}

/// Print one planned change with its attribute changes
pub fn planned_change(address: &str, action: &Action, replace_fields: &[&str]) {
    println!(
        "  {} {} {}",
        action_symbol(action),
        address.bold(),
        format!("({action})").dimmed()
    );
    for change in action.changes() {
        attribute_change(change, replace_fields.contains(&change.attribute.as_str()));
    }
}

fn attribute_change(change: &AttributeChange, forces_replace: bool) {
    let note = if forces_replace {
        format!(" {}", "# forces replacement".magenta())
    } else {
        String::new()
    };
    println!(
        "      {}: {} → {}{}",
        change.attribute,
        display_value(&change.before).dimmed(),
        display_value(&change.after),
        note
    );
}

/// Render an attribute value on one line
///
/// Strings print unquoted and anything wider than the plan column is
/// shortened from the end.
pub fn display_value(value: &Value) -> String {
    let text = match value {
        Value::Null => "(unset)".to_string(),
        Value::String(s) if s.is_empty() => "\"\"".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate(&text, MAX_VALUE_WIDTH)
}

/// Shorten text to `max_len` characters, keeping the start
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = text.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// One-line plan summary
pub fn plan_summary_line(summary: &DiffSummary) -> String {
    format!(
        "Plan: {} to add, {} to change, {} to replace, {} to destroy.",
        summary.additions, summary.modifications, summary.replacements, summary.removals
    )
}

/// Print the outcome of an apply
pub fn execute_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Apply complete!", "✓".green().bold());
    } else {
        println!("  {} Apply finished with errors", "⚠".yellow().bold());
    }

    let counts = [
        (summary.created, "created"),
        (summary.modified, "updated"),
        (summary.replaced, "replaced"),
        (summary.removed, "destroyed"),
        (summary.skipped, "skipped"),
    ];
    for (count, label) in counts {
        if count > 0 {
            println!("    • {count} {label}");
        }
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&Value::Null), "(unset)");
        assert_eq!(display_value(&json!("")), "\"\"");
        assert_eq!(display_value(&json!("platform")), "platform");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(["a", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_long_value_is_shortened() {
        let long = "x".repeat(200);
        let shown = display_value(&json!(long));
        assert_eq!(shown.chars().count(), MAX_VALUE_WIDTH);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_truncate_edge_cases() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exact", 5), "exact");
        assert_eq!(truncate("test", 3), "...");
        assert_eq!(truncate("équipe plateforme", 9), "équipe...");
    }

    #[test]
    fn test_plan_summary_line() {
        let summary = DiffSummary {
            additions: 2,
            modifications: 1,
            replacements: 0,
            removals: 3,
        };
        assert_eq!(
            plan_summary_line(&summary),
            "Plan: 2 to add, 1 to change, 0 to replace, 3 to destroy."
        );
    }
}
