//! User role assignments under `/api/v1/roles`.

use crate::api::escape;
use crate::error::{Error, Result};
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

const ROLES_PATH: &str = "/api/v1/roles";

/// One user-to-role assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRole {
    pub user_id: String,
    pub email: Option<String>,
    pub role: String,
}

/// Body for role add and remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RoleList {
    roles: Vec<UserRole>,
    #[allow(dead_code)]
    count: u64,
}

fn user_roles_path(user_id: &str) -> String {
    format!("{ROLES_PATH}/users/{}/roles", escape(user_id))
}

impl Client {
    pub fn list_user_roles(&self) -> Result<Vec<UserRole>> {
        let body = self.get(ROLES_PATH)?;
        let list: RoleList = decode(&body, "roles response")?;
        Ok(list.roles)
    }

    /// Find one assignment in the full listing.
    pub fn get_user_role(&self, user_id: &str, role: &str) -> Result<UserRole> {
        self.list_user_roles()?
            .into_iter()
            .find(|r| r.user_id == user_id && r.role == role)
            .ok_or_else(|| Error::not_found("user role", format!("{user_id}:{role}")))
    }

    pub fn add_user_role(&self, user_id: &str, role: &str) -> Result<()> {
        let request = RoleRequest {
            role: role.to_string(),
        };
        self.post(&user_roles_path(user_id), &request)?;
        Ok(())
    }

    /// Remove an assignment. The role travels in the DELETE body.
    pub fn remove_user_role(&self, user_id: &str, role: &str) -> Result<()> {
        let request = RoleRequest {
            role: role.to_string(),
        };
        self.delete_with_body(&user_roles_path(user_id), &request)
    }
}
