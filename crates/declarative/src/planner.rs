//! Execution planner - decides what each instance needs

use crate::diff::{AttributeChange, DiffSummary, attribute_diff};
use serde_json::Value;
use std::fmt;

/// What convergence requires for one instance
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create,
    NoOp,
    /// In-place update of the changed attributes
    Update { changed: Vec<AttributeChange> },
    /// A replace field changed: destroy, then create
    Replace { changed: Vec<AttributeChange> },
    Delete,
}

impl Action {
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    /// Attributes driving this action, if any
    pub fn changes(&self) -> &[AttributeChange] {
        match self {
            Self::Update { changed } | Self::Replace { changed } => changed,
            _ => &[],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::NoOp => "no-op",
            Self::Update { .. } => "update",
            Self::Replace { .. } => "replace",
            Self::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// Plan one instance from its state and desired configuration
///
/// Returns `None` when the instance is neither in state nor configured.
pub fn plan_action(
    prior: Option<&Value>,
    desired: Option<&Value>,
    replace_fields: &[&str],
) -> Option<Action> {
    match (prior, desired) {
        (None, None) => None,
        (None, Some(_)) => Some(Action::Create),
        (Some(_), None) => Some(Action::Delete),
        (Some(prior), Some(desired)) => {
            let changed = attribute_diff(prior, desired);
            if changed.is_empty() {
                Some(Action::NoOp)
            } else if changed
                .iter()
                .any(|c| replace_fields.contains(&c.attribute.as_str()))
            {
                Some(Action::Replace { changed })
            } else {
                Some(Action::Update { changed })
            }
        }
    }
}

/// One planned change, addressed as `type.name`
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub address: String,
    pub type_name: String,
    pub action: Action,
    pub prior: Option<Value>,
    pub desired: Option<Value>,
}

/// An ordered list of planned changes
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub changes: Vec<PlannedChange>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: PlannedChange) {
        self.changes.push(change);
    }

    /// Changes that actually do something
    pub fn pending(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes.iter().filter(|c| c.action.is_change())
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_actions(self.changes.iter().map(|c| &c.action))
    }

    /// Check if the plan changes nothing
    pub fn is_empty(&self) -> bool {
        self.pending().next().is_none()
    }

    /// Filter plan to only include changes matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (type_name, name) = parse_target(t);
                Self {
                    changes: self
                        .changes
                        .into_iter()
                        .filter(|c| matches_filter(&c.address, type_name, name))
                        .collect(),
                }
            }
        }
    }
}

/// Split an address `type.name` into its parts
pub fn parse_address(address: &str) -> Option<(&str, &str)> {
    address
        .split_once('.')
        .filter(|(type_name, name)| !type_name.is_empty() && !name.is_empty())
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('.') {
        Some((type_name, name)) => (type_name, Some(name)),
        None => (target, None),
    }
}

/// Check if an address matches the filter criteria
fn matches_filter(address: &str, type_name: &str, name: Option<&str>) -> bool {
    let Some((address_type, address_name)) = parse_address(address) else {
        return false;
    };

    // Allow the provider prefix to be omitted: "team" matches "shoehorn_team"
    let matches_type =
        address_type == type_name || address_type.strip_prefix("shoehorn_") == Some(type_name);
    if !matches_type {
        return false;
    }

    name.is_none_or(|n| address_name == n)
}
