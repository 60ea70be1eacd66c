//! Attribute-level diff between persisted state and desired configuration

use crate::planner::Action;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One attribute whose desired value differs from state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Attribute name
    pub attribute: String,
    /// Value in state (null when unset)
    pub before: Value,
    /// Desired value
    pub after: Value,
}

/// Compute per-attribute changes
///
/// Only attributes the desired configuration sets (non-null) are compared.
/// Attributes present only in state are computed values and never diff.
/// Nested objects follow the same rule, key by key.
pub fn attribute_diff(prior: &Value, desired: &Value) -> Vec<AttributeChange> {
    let Some(desired) = desired.as_object() else {
        return Vec::new();
    };

    desired
        .iter()
        .filter(|(_, after)| !after.is_null())
        .filter_map(|(attribute, after)| {
            let before = prior.get(attribute).cloned().unwrap_or(Value::Null);
            (!satisfies(&before, after)).then(|| AttributeChange {
                attribute: attribute.clone(),
                before,
                after: after.clone(),
            })
        })
        .collect()
}

/// Whether a state value already matches a desired value
///
/// Objects match when every non-null key of `desired` matches in `prior`.
/// Any other value must be equal.
pub fn satisfies(prior: &Value, desired: &Value) -> bool {
    match (prior, desired) {
        (Value::Object(prior), Value::Object(desired)) => desired
            .iter()
            .filter(|(_, value)| !value.is_null())
            .all(|(key, value)| prior.get(key).is_some_and(|p| satisfies(p, value))),
        _ => prior == desired,
    }
}

/// Overlay the desired configuration onto the prior state
///
/// Computed attributes keep their state values; configured attributes take
/// the desired values. This is the plan handed to an in-place update.
pub fn merged_plan(prior: &Value, desired: &Value) -> Value {
    let mut plan = prior.clone();
    overlay(&mut plan, desired);
    plan
}

fn overlay(target: &mut Value, desired: &Value) {
    match (target, desired) {
        (Value::Object(target), Value::Object(desired)) => {
            for (key, value) in desired {
                if value.is_null() {
                    continue;
                }
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        overlay(existing, value);
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, desired) => *target = desired.clone(),
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Number of resources to create
    pub additions: usize,
    /// Number of resources to update in place
    pub modifications: usize,
    /// Number of resources to destroy and recreate
    pub replacements: usize,
    /// Number of resources to remove
    pub removals: usize,
}

impl DiffSummary {
    /// Create a summary from planned actions
    pub fn from_actions<'a>(actions: impl IntoIterator<Item = &'a Action>) -> Self {
        let mut summary = Self::default();
        for action in actions {
            match action {
                Action::Create => summary.additions += 1,
                Action::Update { .. } => summary.modifications += 1,
                Action::Replace { .. } => summary.replacements += 1,
                Action::Delete => summary.removals += 1,
                Action::NoOp => {}
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.replacements + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_diff_ignores_computed_and_null() {
        let prior = json!({"id": "t1", "name": "Platform", "description": "old"});
        let desired = json!({"name": "Platform", "description": "new", "display_name": null});

        let changes = attribute_diff(&prior, &desired);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].attribute, "description");
        assert_eq!(changes[0].before, json!("old"));
        assert_eq!(changes[0].after, json!("new"));
    }

    #[test]
    fn test_attribute_diff_unset_in_state() {
        let changes = attribute_diff(&json!({"id": "x"}), &json!({"tier": "critical"}));
        assert_eq!(changes[0].before, Value::Null);
    }

    #[test]
    fn test_attribute_diff_keeps_desired_order() {
        let changes = attribute_diff(&json!({}), &json!({"b": 1, "a": 2}));
        let names: Vec<_> = changes.iter().map(|c| c.attribute.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_merged_plan_keeps_computed() {
        let prior = json!({"id": "t1", "name": "Old", "created_at": "2024"});
        let desired = json!({"name": "New", "description": null});

        let plan = merged_plan(&prior, &desired);
        assert_eq!(plan, json!({"id": "t1", "name": "New", "created_at": "2024"}));
    }

    #[test]
    fn test_nested_object_compares_set_keys_only() {
        let prior = json!({"announcement": {"enabled": true, "message": "hi", "updated_at": "2024"}});
        assert!(attribute_diff(&prior, &json!({"announcement": {"enabled": true, "message": "hi"}})).is_empty());

        let changes = attribute_diff(&prior, &json!({"announcement": {"message": "bye"}}));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].attribute, "announcement");
    }

    #[test]
    fn test_merged_plan_overlays_nested() {
        let prior = json!({"announcement": {"message": "hi", "updated_at": "2024"}});
        let plan = merged_plan(&prior, &json!({"announcement": {"message": "bye"}}));
        assert_eq!(plan, json!({"announcement": {"message": "bye", "updated_at": "2024"}}));
    }

    #[test]
    fn test_satisfies_arrays_are_exact() {
        assert!(satisfies(&json!(["a", "b"]), &json!(["a", "b"])));
        assert!(!satisfies(&json!(["a", "b"]), &json!(["b", "a"])));
        assert!(!satisfies(&Value::Null, &json!({"a": 1})));
    }

    #[test]
    fn test_summary_from_actions() {
        let actions = [
            Action::Create,
            Action::NoOp,
            Action::Delete,
            Action::Replace { changed: vec![] },
        ];
        let summary = DiffSummary::from_actions(&actions);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.replacements, 1);
        assert!(summary.has_changes());
    }
}
