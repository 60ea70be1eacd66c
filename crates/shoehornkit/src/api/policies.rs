//! Platform policies under `/api/v1/admin/policies`.
//!
//! Policies are seeded by the server. Clients can only toggle `enabled`
//! and change `enforcement`.

use crate::api::escape;
use crate::error::{Error, Result};
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

const POLICIES_PATH: &str = "/api/v1/admin/policies";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformPolicy {
    pub id: String,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub enabled: bool,
    pub enforcement: String,
    pub affected_users: u64,
    pub system: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePolicyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforcement: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PolicyList {
    policies: Vec<PlatformPolicy>,
}

impl Client {
    pub fn list_policies(&self) -> Result<Vec<PlatformPolicy>> {
        let body = self.get(POLICIES_PATH)?;
        let list: PolicyList = decode(&body, "policies response")?;
        Ok(list.policies)
    }

    /// Find a policy by key in the full listing.
    pub fn get_policy(&self, key: &str) -> Result<PlatformPolicy> {
        self.list_policies()?
            .into_iter()
            .find(|policy| policy.key == key)
            .ok_or_else(|| Error::not_found("policy", key))
    }

    /// Update a policy by its server id (not its key).
    pub fn update_policy(&self, id: &str, request: &UpdatePolicyRequest) -> Result<PlatformPolicy> {
        let body = self.put(&format!("{POLICIES_PATH}/{}", escape(id)), request)?;
        decode(&body, "update policy response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_client;
    use crate::transport::MockReply;
    use serde_json::json;

    #[test]
    fn test_get_policy_by_key() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"policies": [
                {"id": "p1", "key": "require-owner", "name": "Require owner", "enabled": false, "enforcement": "warn", "system": true}
            ]}),
        ));

        let policy = client.get_policy("require-owner").unwrap();
        assert_eq!(policy.id, "p1");
        assert!(policy.system);
    }

    #[test]
    fn test_get_policy_missing() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &json!({"policies": []})));
        let err = client.get_policy("x").unwrap_err();
        assert_eq!(err.to_string(), r#"policy "x" not found"#);
    }

    #[test]
    fn test_update_policy_uses_id() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"id": "p1", "key": "require-owner", "enabled": true, "enforcement": "block"}),
        ));

        let updated = client
            .update_policy(
                "p1",
                &UpdatePolicyRequest {
                    enabled: Some(true),
                    enforcement: Some("block".to_string()),
                },
            )
            .unwrap();
        assert_eq!(updated.enforcement, "block");

        let req = mock.last_request().unwrap();
        assert_eq!(req.path(), "/api/v1/admin/policies/p1");
        assert_eq!(
            req.json_body().unwrap(),
            json!({"enabled": true, "enforcement": "block"})
        );
    }
}
