//! Directory groups and their role mappings under `/api/v1/groups`.
//!
//! Group names come from the identity provider and may contain spaces or
//! slashes, so every path segment is escaped.

use crate::api::escape;
use crate::error::Result;
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

const GROUPS_PATH: &str = "/api/v1/groups";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub path: String,
    pub member_count: u64,
    pub sub_groups: Vec<String>,
    pub roles: Vec<GroupRoleInfo>,
}

/// A role mapped onto a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupRoleInfo {
    pub role_name: String,
    pub bundle_display_name: Option<String>,
    pub bundle_color: Option<String>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRoleRequest {
    pub role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroupList {
    items: Vec<Group>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroupRoleList {
    roles: Vec<GroupRoleInfo>,
}

fn group_roles_path(group: &str) -> String {
    format!("{GROUPS_PATH}/{}/roles", escape(group))
}

impl Client {
    pub fn list_groups(&self) -> Result<Vec<Group>> {
        let body = self.get(GROUPS_PATH)?;
        let list: GroupList = decode(&body, "groups response")?;
        Ok(list.items)
    }

    pub fn get_group_roles(&self, group: &str) -> Result<Vec<GroupRoleInfo>> {
        let body = self.get(&group_roles_path(group))?;
        let list: GroupRoleList = decode(&body, "group roles response")?;
        Ok(list.roles)
    }

    pub fn assign_group_role(&self, group: &str, request: &GroupRoleRequest) -> Result<()> {
        self.post(&group_roles_path(group), request)?;
        Ok(())
    }

    pub fn remove_group_role(&self, group: &str, role: &str) -> Result<()> {
        self.delete(&format!("{}/{}", group_roles_path(group), escape(role)))
    }
}
