//! User-to-role binding, identified as `user_id:role`

use crate::resource::{non_empty_opt, split_import_id};
use anyhow::{Context, Result, bail};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::Client;

/// Persisted attributes of `shoehorn_user_role`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRoleModel {
    pub id: Option<String>,
    pub user_id: String,
    pub role: String,
    pub email: Option<String>,
}

impl UserRoleModel {
    fn binding_id(&self) -> String {
        format!("{}:{}", self.user_id, self.role)
    }
}

/// `shoehorn_user_role`
pub struct UserRoleResource;

impl Resource<Client> for UserRoleResource {
    type Model = UserRoleModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_user_role"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["user_id", "role"]
    }

    fn create(&self, client: &Client, plan: &UserRoleModel) -> Result<UserRoleModel> {
        let (user, role) = (&plan.user_id, &plan.role);
        client
            .add_user_role(user, role)
            .with_context(|| format!("Could not add role {role} to user {user}"))?;

        let mut state = plan.clone();
        state.id = Some(plan.binding_id());
        match client.get_user_role(user, role) {
            Ok(binding) => {
                if let Some(email) = non_empty_opt(binding.email.as_ref()) {
                    state.email = Some(email);
                }
            }
            Err(e) => log::debug!("Email lookup for {user} failed: {e}"),
        }
        Ok(state)
    }

    fn read(&self, client: &Client, state: &UserRoleModel) -> Result<ReadOutcome<UserRoleModel>> {
        let binding = match client.get_user_role(&state.user_id, &state.role) {
            Ok(binding) => binding,
            Err(e) if e.is_not_found() => {
                log::debug!("Role {} is no longer bound to {}", state.role, state.user_id);
                return Ok(ReadOutcome::Gone);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Could not read roles of user {}", state.user_id));
            }
        };

        let mut fresh = state.clone();
        fresh.id = Some(state.binding_id());
        if let Some(email) = non_empty_opt(binding.email.as_ref()) {
            fresh.email = Some(email);
        }
        Ok(ReadOutcome::Present(fresh))
    }

    fn update(&self, _client: &Client, _plan: &UserRoleModel, _prior: &UserRoleModel) -> Result<UserRoleModel> {
        bail!("Update Not Supported: User role assignments cannot be updated. Changes require replacement.")
    }

    fn delete(&self, client: &Client, state: &UserRoleModel) -> Result<()> {
        let (user, role) = (&state.user_id, &state.role);
        client
            .remove_user_role(user, role)
            .with_context(|| format!("Could not remove role {role} from user {user}"))
    }

    fn import_seed(&self, id: &str) -> Result<UserRoleModel> {
        let (user_id, role) = split_import_id(id, "user_id:role")?;
        Ok(UserRoleModel {
            id: Some(id.to_string()),
            user_id,
            role,
            email: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::mock_client;
    use serde_json::json;
    use shoehornkit::transport::{Method, MockReply};

    fn plan() -> UserRoleModel {
        UserRoleModel {
            user_id: "u-42".to_string(),
            role: "admin".to_string(),
            ..Default::default()
        }
    }

    fn roles() -> serde_json::Value {
        json!({"roles": [
            {"user_id": "u-7", "role": "admin"},
            {"user_id": "u-42", "email": "ana@example.com", "role": "admin"}
        ]})
    }

    #[test]
    fn test_create_looks_up_email() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(201, "{}"));
        mock.push(MockReply::json(200, &roles()));

        let state = UserRoleResource.create(&client, &plan()).unwrap();
        assert_eq!(state.id.as_deref(), Some("u-42:admin"));
        assert_eq!(state.email.as_deref(), Some("ana@example.com"));

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path(), "/api/v1/roles/users/u-42/roles");
        assert_eq!(requests[0].json_body().unwrap(), json!({"role": "admin"}));
    }

    #[test]
    fn test_create_tolerates_failed_lookup() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(201, "{}"));
        mock.push(MockReply::status(403, r#"{"message":"forbidden"}"#));

        let state = UserRoleResource.create(&client, &plan()).unwrap();
        assert_eq!(state.email, None);
    }

    #[test]
    fn test_read_missing_binding_is_gone() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &json!({"roles": [{"user_id": "u-42", "role": "viewer"}]})));

        assert_eq!(UserRoleResource.read(&client, &plan()).unwrap(), ReadOutcome::Gone);
    }

    #[test]
    fn test_import_parses_id() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &roles()));

        let state = UserRoleResource.import(&client, "u-42:admin").unwrap();
        assert_eq!(state.user_id, "u-42");
        assert_eq!(state.email.as_deref(), Some("ana@example.com"));

        let err = UserRoleResource.import(&client, "u-42").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid Import ID: Expected import ID in format 'user_id:role', got: u-42"
        );
    }

    #[test]
    fn test_delete_sends_role_in_body() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(204, ""));

        UserRoleResource.delete(&client, &plan()).unwrap();
        let req = mock.last_request().unwrap();
        assert_eq!(req.method, Method::Delete);
        assert_eq!(req.json_body().unwrap(), json!({"role": "admin"}));
    }
}
