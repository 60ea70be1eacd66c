//! Directory users under `/api/v1/users`.

use crate::api::escape;
use crate::error::Result;
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryUser {
    pub id: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub enabled: bool,
    pub git_provider: Option<String>,
    pub provider: Option<String>,
    pub bundles: Vec<BundleSummary>,
}

/// A role bundle granted to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleSummary {
    pub id: String,
    pub name: String,
    pub display_name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserList {
    items: Vec<DirectoryUser>,
    #[allow(dead_code)]
    provider: Option<String>,
}

impl Client {
    pub fn list_users(&self) -> Result<Vec<DirectoryUser>> {
        let body = self.get("/api/v1/users")?;
        let list: UserList = decode(&body, "users response")?;
        Ok(list.items)
    }

    pub fn get_user(&self, id: &str) -> Result<DirectoryUser> {
        let body = self.get(&format!("/api/v1/users/{}", escape(id)))?;
        decode(&body, "user response")
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::mock_client;
    use crate::transport::MockReply;
    use serde_json::json;

    #[test]
    fn test_list_users_mixed_case_fields() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"items": [{
                "id": "u1", "username": "ada", "firstName": "Ada", "enabled": true,
                "git_provider": "github",
                "bundles": [{"id": "b1", "name": "dev", "displayName": "Developer"}]
            }], "provider": "keycloak"}),
        ));

        let users = client.list_users().unwrap();
        assert_eq!(users[0].first_name.as_deref(), Some("Ada"));
        assert_eq!(users[0].git_provider.as_deref(), Some("github"));
        assert_eq!(users[0].bundles[0].display_name.as_deref(), Some("Developer"));
    }

    #[test]
    fn test_get_user_escapes_id() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &json!({"id": "a b", "username": "ab"})));

        client.get_user("a b").unwrap();
        assert_eq!(mock.last_request().unwrap().path(), "/api/v1/users/a%20b");
    }

    #[test]
    fn test_get_user_not_found_is_api_error() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(404, ""));
        let err = client.get_user("ghost").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "API error (HTTP 404): Not Found");
    }
}
