//! Team resource
//!
//! The server models membership as incremental adds and removes, so an
//! update sends the member diff between state and plan rather than the
//! full list. Members and metadata are persisted as JSON text.

use crate::reconcile::{self, Member};
use crate::resource::non_empty_opt;
use anyhow::{Context, Result};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{Client, CreateTeamRequest, JsonMap, Team, UpdateTeamRequest};

/// Persisted attributes of `shoehorn_team`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamModel {
    pub id: Option<String>,
    pub name: String,
    pub display_name: Option<String>,
    pub slug: String,
    pub description: Option<String>,
    /// JSON object text
    pub metadata: Option<String>,
    /// JSON text: `[{user_id, role?}]`
    pub members: Option<String>,
    pub is_active: Option<bool>,
    pub member_count: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl TeamModel {
    fn team_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .context("Team has no id in state")
    }

    fn parsed_metadata(&self) -> Result<Option<JsonMap>> {
        self.metadata
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("Invalid Metadata: Failed to parse metadata JSON")
    }

    fn parsed_members(&self) -> Result<Vec<Member>> {
        reconcile::parse_members(self.members.as_deref()).context("Invalid Members")
    }

    /// Overlay a team from the server. Empty optional fields keep their
    /// previous values.
    fn apply_team(&mut self, team: &Team) {
        self.id = Some(team.id.clone());
        self.name = team.name.clone();
        self.slug = team.slug.clone();
        self.is_active = Some(team.is_active);
        self.member_count = Some(team.member_count);

        if let Some(display_name) = non_empty_opt(team.display_name.as_ref()) {
            self.display_name = Some(display_name);
        }
        if let Some(description) = non_empty_opt(team.description.as_ref()) {
            self.description = Some(description);
        }
        if let Some(at) = non_empty_opt(team.created_at.as_ref()) {
            self.created_at = Some(at);
        }
        if let Some(at) = non_empty_opt(team.updated_at.as_ref()) {
            self.updated_at = Some(at);
        }

        if let Some(metadata) = team.metadata.as_ref().filter(|m| !m.is_empty()) {
            if let Some(text) = reconcile::to_json_text(metadata) {
                self.metadata = Some(text);
            }
        }

        if !team.members.is_empty() {
            let members: Vec<Member> = team
                .members
                .iter()
                .map(|m| Member {
                    user_id: m.user_id.clone(),
                    role: m.role.clone(),
                })
                .collect();
            if let Some(text) = reconcile::to_json_text(&members) {
                self.members = Some(text);
            }
        }
    }

    /// Overlay `team`, keeping `previous` JSON text where it is equivalent.
    fn reconciled(mut self, team: &Team, previous: &Self) -> Self {
        self.apply_team(team);
        self.members = reconcile::preserve_if_equivalent(
            "members",
            previous.members.as_ref(),
            self.members.take(),
            reconcile::members_equivalent,
        );
        self.metadata = reconcile::preserve_if_equivalent(
            "metadata",
            previous.metadata.as_ref(),
            self.metadata.take(),
            reconcile::objects_equivalent,
        );
        self
    }
}

/// `shoehorn_team`
pub struct TeamResource;

impl Resource<Client> for TeamResource {
    type Model = TeamModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_team"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["slug"]
    }

    fn create(&self, client: &Client, plan: &TeamModel) -> Result<TeamModel> {
        let request = CreateTeamRequest {
            name: plan.name.clone(),
            display_name: plan.display_name.clone(),
            slug: plan.slug.clone(),
            description: plan.description.clone(),
            metadata: plan.parsed_metadata()?,
        };
        let members = plan.parsed_members()?;

        let mut team = client.create_team(&request).context("Could not create team")?;
        log::info!("Created team {} ({})", team.slug, team.id);

        if !members.is_empty() {
            let (add_members, _) = reconcile::compute_member_diff(&[], &members);
            let request = UpdateTeamRequest {
                name: Some(team.name.clone()),
                add_members,
                ..Default::default()
            };
            team = client
                .update_team(&team.id, &request)
                .context("Could not add members to team")?;
        }

        Ok(plan.clone().reconciled(&team, plan))
    }

    fn read(&self, client: &Client, state: &TeamModel) -> Result<ReadOutcome<TeamModel>> {
        let id = state.team_id()?;
        let team = client
            .get_team(id)
            .with_context(|| format!("Could not read team {id}"))?;
        Ok(ReadOutcome::Present(state.clone().reconciled(&team, state)))
    }

    fn update(&self, client: &Client, plan: &TeamModel, prior: &TeamModel) -> Result<TeamModel> {
        let id = prior.team_id()?;
        let (add_members, remove_members) =
            reconcile::compute_member_diff(&prior.parsed_members()?, &plan.parsed_members()?);
        log::debug!(
            "Team {id}: adding {} member(s), removing {}",
            add_members.len(),
            remove_members.len()
        );

        let request = UpdateTeamRequest {
            name: Some(plan.name.clone()),
            display_name: plan.display_name.clone(),
            description: plan.description.clone(),
            metadata: plan.parsed_metadata()?,
            add_members,
            remove_members,
            ..Default::default()
        };
        let team = client
            .update_team(id, &request)
            .with_context(|| format!("Could not update team {id}"))?;

        let mut state = plan.clone().reconciled(&team, plan);
        state.id = Some(id.to_string());
        Ok(state)
    }

    fn delete(&self, client: &Client, state: &TeamModel) -> Result<()> {
        let id = state.team_id()?;
        client
            .delete_team(id)
            .with_context(|| format!("Could not delete team {id}"))
    }

    fn import_seed(&self, id: &str) -> Result<TeamModel> {
        Ok(TeamModel {
            id: Some(id.to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::mock_client;
    use serde_json::{Value, json};
    use shoehornkit::transport::{Method, MockReply};

    fn team_json(members: Value) -> Value {
        json!({
            "id": "t-1",
            "name": "Platform",
            "display_name": "Platform Team",
            "slug": "platform",
            "is_active": true,
            "member_count": members.as_array().map_or(0, Vec::len),
            "metadata": {"slack": "#platform", "cost_center": "42"},
            "members": members,
            "created_at": "2026-01-01T00:00:00Z"
        })
    }

    fn plan() -> TeamModel {
        TeamModel {
            name: "Platform".to_string(),
            slug: "platform".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_without_members_is_one_call() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(201, &json!({"team": team_json(json!([]))})));

        let state = TeamResource.create(&client, &plan()).unwrap();
        assert_eq!(state.id.as_deref(), Some("t-1"));
        assert_eq!(state.is_active, Some(true));
        assert_eq!(state.member_count, Some(0));
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_create_adds_initial_members_through_update() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(201, &json!({"team": team_json(json!([]))})));
        mock.push(MockReply::json(
            200,
            &json!({"team": team_json(json!([
                {"user_id": "u2", "role": ""},
                {"user_id": "u1", "role": "admin"}
            ]))}),
        ));

        let mut desired = plan();
        desired.members = Some(r#"[{"user_id":"u1","role":"admin"},{"user_id":"u2"}]"#.to_string());
        desired.metadata = Some(r##"{"cost_center":"42","slack":"#platform"}"##.to_string());
        let state = TeamResource.create(&client, &desired).unwrap();

        assert_eq!(state.members, desired.members);
        assert_eq!(state.metadata, desired.metadata);
        assert_eq!(state.member_count, Some(2));

        let requests = mock.requests();
        assert_eq!(
            requests[0].json_body().unwrap(),
            json!({"name": "Platform", "slug": "platform", "metadata": {"cost_center": "42", "slack": "#platform"}})
        );
        assert_eq!(requests[1].method, Method::Put);
        assert_eq!(requests[1].path(), "/api/v1/admin/teams/t-1");
        assert_eq!(
            requests[1].json_body().unwrap(),
            json!({"name": "Platform", "add_members": [{"user_id": "u1", "role": "admin"}, {"user_id": "u2"}]})
        );
    }

    #[test]
    fn test_create_rejects_bad_members_before_any_call() {
        let (client, mock) = mock_client();
        let mut desired = plan();
        desired.members = Some("[{".to_string());

        let err = TeamResource.create(&client, &desired).unwrap_err();
        assert!(err.to_string().starts_with("Invalid Members"));
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn test_read_keeps_reordered_members() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"team": team_json(json!([{"user_id": "u2", "role": "member"}, {"user_id": "u1", "role": "admin"}]))}),
        ));

        let mut state = plan();
        state.id = Some("t-1".to_string());
        state.members =
            Some(r#"[{"user_id":"u1","role":"admin"},{"user_id":"u2","role":"member"}]"#.to_string());

        let fresh = TeamResource.read(&client, &state).unwrap().into_option().unwrap();
        assert_eq!(fresh.members, state.members);
        assert_eq!(fresh.display_name.as_deref(), Some("Platform Team"));
        assert_eq!(fresh.metadata.as_deref(), Some(r##"{"slack":"#platform","cost_center":"42"}"##));
    }

    #[test]
    fn test_read_reports_changed_role() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"team": team_json(json!([{"user_id": "u1", "role": "member"}]))}),
        ));

        let mut state = plan();
        state.id = Some("t-1".to_string());
        state.members = Some(r#"[{"user_id":"u1","role":"admin"}]"#.to_string());

        let fresh = TeamResource.read(&client, &state).unwrap().into_option().unwrap();
        assert_eq!(fresh.members.as_deref(), Some(r#"[{"user_id":"u1","role":"member"}]"#));
    }

    #[test]
    fn test_update_sends_member_diff() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"team": team_json(json!([{"user_id": "u1", "role": "member"}, {"user_id": "u3", "role": ""}]))}),
        ));

        let mut prior = plan();
        prior.id = Some("t-1".to_string());
        prior.members =
            Some(r#"[{"user_id":"u1","role":"admin"},{"user_id":"u2","role":"member"}]"#.to_string());
        let mut desired = prior.clone();
        desired.description = Some("Runs the platform".to_string());
        desired.members = Some(r#"[{"user_id":"u1","role":"member"},{"user_id":"u3"}]"#.to_string());

        let state = TeamResource.update(&client, &desired, &prior).unwrap();
        assert_eq!(state.members, desired.members);
        assert_eq!(state.id.as_deref(), Some("t-1"));

        let body = mock.last_request().unwrap().json_body().unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Platform",
                "description": "Runs the platform",
                "add_members": [{"user_id": "u1", "role": "member"}, {"user_id": "u3"}],
                "remove_members": ["u2"]
            })
        );
    }

    #[test]
    fn test_delete_and_import() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(204, ""));
        mock.push(MockReply::json(200, &json!({"team": team_json(json!([]))})));

        let mut state = plan();
        state.id = Some("t-1".to_string());
        TeamResource.delete(&client, &state).unwrap();

        let imported = TeamResource.import(&client, "t-1").unwrap();
        assert_eq!(imported.slug, "platform");

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[0].path(), "/api/v1/admin/teams/t-1");
        assert_eq!(requests[1].path(), "/api/v1/admin/teams/t-1");
    }
}
