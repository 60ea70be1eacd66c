//! Teams under `/api/v1/admin/teams`.

use crate::api::escape;
use crate::error::Result;
use crate::types::JsonMap;
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

const TEAMS_PATH: &str = "/api/v1/admin/teams";

/// A team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub id: String,
    pub tenant_id: Option<String>,
    pub name: String,
    pub display_name: Option<String>,
    pub slug: String,
    pub source: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<JsonMap>,
    pub is_active: bool,
    pub member_count: u64,
    pub members: Vec<TeamMember>,
    pub parent_team_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A team membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    pub id: Option<String>,
    pub team_id: Option<String>,
    pub user_id: String,
    pub role: String,
    pub created_at: Option<String>,
    pub created_by: Option<String>,
}

/// Body for `POST /api/v1/admin/teams`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
}

/// A member to add in an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Body for `PUT /api/v1/admin/teams/{id}`.
///
/// Unset fields are left alone by the server. Membership changes are
/// expressed as a diff through `add_members` and `remove_members`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTeamRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_team_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_members: Vec<AddMemberRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_members: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TeamList {
    teams: Vec<Team>,
    #[allow(dead_code)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct TeamDetail {
    team: Team,
    #[serde(default)]
    members: Vec<TeamMember>,
}

#[derive(Debug, Deserialize)]
struct TeamEnvelope {
    team: Team,
}

impl Client {
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let body = self.get(TEAMS_PATH)?;
        let list: TeamList = decode(&body, "teams response")?;
        Ok(list.teams)
    }

    /// Get a team with its members.
    ///
    /// Some server versions return members beside the team rather than
    /// inside it; those are folded in when the embedded list is empty.
    pub fn get_team(&self, id: &str) -> Result<Team> {
        let body = self.get(&format!("{TEAMS_PATH}/{}", escape(id)))?;
        let detail: TeamDetail = decode(&body, "team response")?;
        let mut team = detail.team;
        if team.members.is_empty() {
            team.members = detail.members;
        }
        Ok(team)
    }

    pub fn create_team(&self, request: &CreateTeamRequest) -> Result<Team> {
        let body = self.post(TEAMS_PATH, request)?;
        let envelope: TeamEnvelope = decode(&body, "create team response")?;
        Ok(envelope.team)
    }

    pub fn update_team(&self, id: &str, request: &UpdateTeamRequest) -> Result<Team> {
        let body = self.put(&format!("{TEAMS_PATH}/{}", escape(id)), request)?;
        let envelope: TeamEnvelope = decode(&body, "update team response")?;
        Ok(envelope.team)
    }

    pub fn delete_team(&self, id: &str) -> Result<()> {
        self.delete(&format!("{TEAMS_PATH}/{}", escape(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_client;
    use crate::transport::{Method, MockReply};
    use serde_json::json;

    #[test]
    fn test_list_teams() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"teams": [{"id": "t1", "name": "Platform", "slug": "platform", "is_active": true}], "total": 1}),
        ));

        let teams = client.list_teams().unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].slug, "platform");
        assert!(teams[0].is_active);
        assert_eq!(mock.last_request().unwrap().path(), "/api/v1/admin/teams");
    }

    #[test]
    fn test_get_team_uses_top_level_members() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({
                "team": {"id": "t1", "name": "Platform", "slug": "platform"},
                "members": [{"user_id": "u1", "role": "owner"}]
            }),
        ));

        let team = client.get_team("t1").unwrap();
        assert_eq!(team.members.len(), 1);
        assert_eq!(team.members[0].user_id, "u1");
    }

    #[test]
    fn test_get_team_prefers_embedded_members() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({
                "team": {"id": "t1", "name": "P", "slug": "p", "members": [{"user_id": "u2", "role": "member"}]},
                "members": [{"user_id": "u1", "role": "owner"}]
            }),
        ));

        let team = client.get_team("t1").unwrap();
        assert_eq!(team.members.len(), 1);
        assert_eq!(team.members[0].user_id, "u2");
    }

    #[test]
    fn test_create_team_omits_unset_fields() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            201,
            &json!({"team": {"id": "t9", "name": "Data", "slug": "data"}}),
        ));

        let team = client
            .create_team(&CreateTeamRequest {
                name: "Data".to_string(),
                slug: "data".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(team.id, "t9");
        assert_eq!(
            mock.last_request().unwrap().json_body().unwrap(),
            json!({"name": "Data", "slug": "data"})
        );
    }

    #[test]
    fn test_update_team_sends_member_diff() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &json!({"team": {"id": "t9", "name": "Data"}})));

        let request = UpdateTeamRequest {
            name: Some("Data".to_string()),
            add_members: vec![AddMemberRequest {
                user_id: "u3".to_string(),
                role: Some("member".to_string()),
            }],
            remove_members: vec!["u1".to_string()],
            ..Default::default()
        };
        let team = client.update_team("t9", &request).unwrap();
        assert_eq!(team.name, "Data");

        let req = mock.last_request().unwrap();
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.path(), "/api/v1/admin/teams/t9");
        assert_eq!(
            req.json_body().unwrap(),
            json!({
                "name": "Data",
                "add_members": [{"user_id": "u3", "role": "member"}],
                "remove_members": ["u1"]
            })
        );
    }

    #[test]
    fn test_delete_team() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(204, ""));
        client.delete_team("t9").unwrap();
        assert_eq!(mock.last_request().unwrap().method, Method::Delete);
    }
}
