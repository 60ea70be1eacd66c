//! Team membership diff

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shoehornkit::AddMemberRequest;
use std::collections::HashMap;

/// A member as persisted in state. An empty role is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    pub user_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
}

impl Member {
    fn to_request(&self) -> AddMemberRequest {
        AddMemberRequest {
            user_id: self.user_id.clone(),
            role: (!self.role.is_empty()).then(|| self.role.clone()),
        }
    }
}

/// Parse a members attribute; an absent attribute is an empty list.
pub fn parse_members(text: Option<&str>) -> Result<Vec<Member>> {
    match text {
        None => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text).context("Failed to parse members JSON"),
    }
}

/// Membership changes needed to go from `current` to `desired`
///
/// Adds every desired member that is new or whose role changed (the server
/// treats an add as an upsert). Removes every current user id that is no
/// longer desired. Order follows the input lists.
pub fn compute_member_diff(
    current: &[Member],
    desired: &[Member],
) -> (Vec<AddMemberRequest>, Vec<String>) {
    let current_roles: HashMap<&str, &str> = current
        .iter()
        .map(|m| (m.user_id.as_str(), m.role.as_str()))
        .collect();
    let desired_ids: HashMap<&str, &str> = desired
        .iter()
        .map(|m| (m.user_id.as_str(), m.role.as_str()))
        .collect();

    let add = desired
        .iter()
        .filter(|m| current_roles.get(m.user_id.as_str()) != Some(&m.role.as_str()))
        .map(Member::to_request)
        .collect();

    let remove = current
        .iter()
        .filter(|m| !desired_ids.contains_key(m.user_id.as_str()))
        .map(|m| m.user_id.clone())
        .collect();

    (add, remove)
}
