//! Read-only data sources
//!
//! Each source lists one endpoint family and flattens it into plain
//! records. Absent strings become `""`, and a source with no results
//! still yields an empty list under its collection key.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Value, json};
use shoehornkit::Client;

/// The data sources `shoehorn list` can print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataSource {
    Entities,
    Teams,
    FeatureFlags,
    Integrations,
    ApiKeys,
    K8sAgents,
    PlatformPolicies,
    Users,
    Groups,
}

impl DataSource {
    /// Collection key of the flattened output
    pub const fn key(self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Teams => "teams",
            Self::FeatureFlags => "feature_flags",
            Self::Integrations => "integrations",
            Self::ApiKeys => "api_keys",
            Self::K8sAgents => "agents",
            Self::PlatformPolicies => "policies",
            Self::Users => "users",
            Self::Groups => "groups",
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Teams => "teams",
            Self::FeatureFlags => "feature flags",
            Self::Integrations => "integrations status",
            Self::ApiKeys => "API keys",
            Self::K8sAgents => "K8s agents",
            Self::PlatformPolicies => "platform policies",
            Self::Users => "users",
            Self::Groups => "groups",
        }
    }

    /// Fetch and flatten the source.
    pub fn read(self, client: &Client) -> Result<Value> {
        let fetched = match self {
            Self::Entities => entities(client),
            Self::Teams => teams(client),
            Self::FeatureFlags => feature_flags(client),
            Self::Integrations => return integrations(client),
            Self::ApiKeys => api_keys(client),
            Self::K8sAgents => k8s_agents(client),
            Self::PlatformPolicies => policies(client),
            Self::Users => users(client),
            Self::Groups => groups(client),
        };
        let records = fetched.with_context(|| format!("Could not list {}", self.noun()))?;
        Ok(json!({ (self.key()): records }))
    }
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}

fn records<T: Serialize>(rows: Vec<T>) -> Result<Value> {
    serde_json::to_value(rows).context("Failed to serialize records")
}

#[derive(Serialize)]
struct EntityRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    description: String,
    entity_lifecycle: String,
    tier: String,
}

fn entities(client: &Client) -> Result<Value> {
    let rows = client
        .list_entities()?
        .into_iter()
        .map(|e| EntityRecord {
            id: e.service.id,
            name: e.service.name,
            kind: e.service.kind,
            description: text(e.description),
            entity_lifecycle: text(e.lifecycle),
            tier: text(e.service.tier),
        })
        .collect();
    records::<EntityRecord>(rows)
}

#[derive(Serialize)]
struct TeamRecord {
    id: String,
    name: String,
    slug: String,
    display_name: String,
    description: String,
    member_count: u64,
}

fn teams(client: &Client) -> Result<Value> {
    let rows = client
        .list_teams()?
        .into_iter()
        .map(|t| TeamRecord {
            id: t.id,
            name: t.name,
            slug: t.slug,
            display_name: text(t.display_name),
            description: text(t.description),
            member_count: t.member_count,
        })
        .collect();
    records::<TeamRecord>(rows)
}

#[derive(Serialize)]
struct FeatureFlagRecord {
    id: String,
    key: String,
    name: String,
    description: String,
    enabled: bool,
}

fn feature_flags(client: &Client) -> Result<Value> {
    let rows = client
        .list_feature_flags()?
        .into_iter()
        .map(|f| FeatureFlagRecord {
            id: f.id,
            key: f.key,
            name: f.name,
            description: text(f.description),
            enabled: f.default_enabled,
        })
        .collect();
    records::<FeatureFlagRecord>(rows)
}

#[derive(Serialize)]
struct IntegrationRecord {
    #[serde(rename = "type")]
    kind: String,
    provider: String,
    status: String,
    config: String,
    metadata: String,
}

/// Schema-free blobs flatten to JSON text, `{}` when absent.
fn blob(value: Option<&Value>) -> String {
    value
        .filter(|v| !v.is_null())
        .map_or_else(|| "{}".to_string(), Value::to_string)
}

fn integrations(client: &Client) -> Result<Value> {
    let status = client
        .integrations_status()
        .context("Could not get integrations status")?;
    let rows: Vec<IntegrationRecord> = status
        .integrations
        .iter()
        .map(|i| IntegrationRecord {
            kind: i.kind.clone(),
            provider: i.provider.clone(),
            status: i.status.clone(),
            config: blob(i.config.as_ref()),
            metadata: blob(i.metadata.as_ref()),
        })
        .collect();
    Ok(json!({
        "integrations": records(rows)?,
        "total": status.total,
        "healthy": status.healthy,
    }))
}

#[derive(Serialize)]
struct ApiKeyRecord {
    id: String,
    name: String,
    prefix: String,
    status: &'static str,
    expires_at: String,
    created_at: String,
}

fn api_keys(client: &Client) -> Result<Value> {
    let rows = client
        .list_api_keys()?
        .into_iter()
        .map(|k| ApiKeyRecord {
            status: if k.is_revoked() { "revoked" } else { "active" },
            id: k.id,
            name: k.name,
            prefix: k.key_prefix,
            expires_at: text(k.expires_at),
            created_at: text(k.created_at),
        })
        .collect();
    records::<ApiKeyRecord>(rows)
}

#[derive(Serialize)]
struct K8sAgentRecord {
    cluster_id: String,
    name: String,
    status: String,
    token_prefix: String,
    expires_at: String,
    created_at: String,
}

fn k8s_agents(client: &Client) -> Result<Value> {
    let rows = client
        .list_k8s_agents()?
        .into_iter()
        .map(|a| K8sAgentRecord {
            cluster_id: a.cluster_id,
            name: a.name,
            status: a.status,
            token_prefix: a.token_prefix,
            expires_at: text(a.expires_at),
            created_at: text(a.created_at),
        })
        .collect();
    records::<K8sAgentRecord>(rows)
}

#[derive(Serialize)]
struct PolicyRecord {
    id: String,
    key: String,
    name: String,
    description: String,
    category: String,
    enabled: bool,
    enforcement: String,
    system: bool,
}

fn policies(client: &Client) -> Result<Value> {
    let rows = client
        .list_policies()?
        .into_iter()
        .map(|p| PolicyRecord {
            id: p.id,
            key: p.key,
            name: p.name,
            description: text(p.description),
            category: text(p.category),
            enabled: p.enabled,
            enforcement: p.enforcement,
            system: p.system,
        })
        .collect();
    records::<PolicyRecord>(rows)
}

#[derive(Serialize)]
struct BundleRecord {
    id: String,
    name: String,
    display_name: String,
    color: String,
}

#[derive(Serialize)]
struct UserRecord {
    id: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    enabled: bool,
    git_provider: String,
    bundles: Vec<BundleRecord>,
}

fn users(client: &Client) -> Result<Value> {
    let rows = client
        .list_users()?
        .into_iter()
        .map(|u| UserRecord {
            id: u.id,
            username: u.username,
            first_name: text(u.first_name),
            last_name: text(u.last_name),
            email: text(u.email),
            enabled: u.enabled,
            git_provider: text(u.git_provider),
            bundles: u
                .bundles
                .into_iter()
                .map(|b| BundleRecord {
                    id: b.id,
                    name: b.name,
                    display_name: text(b.display_name),
                    color: text(b.color),
                })
                .collect(),
        })
        .collect();
    records::<UserRecord>(rows)
}

#[derive(Serialize)]
struct GroupRoleRecord {
    role_name: String,
    bundle_display_name: String,
    provider: String,
}

#[derive(Serialize)]
struct GroupRecord {
    id: String,
    name: String,
    path: String,
    member_count: u64,
    roles: Vec<GroupRoleRecord>,
}

fn groups(client: &Client) -> Result<Value> {
    let rows = client
        .list_groups()?
        .into_iter()
        .map(|g| GroupRecord {
            id: g.id,
            name: g.name,
            path: g.path,
            member_count: g.member_count,
            roles: g
                .roles
                .into_iter()
                .map(|r| GroupRoleRecord {
                    role_name: r.role_name,
                    bundle_display_name: text(r.bundle_display_name),
                    provider: text(r.provider),
                })
                .collect(),
        })
        .collect();
    records::<GroupRecord>(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::mock_client;
    use shoehornkit::transport::MockReply;

    #[test]
    fn test_empty_listing_is_empty_array() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &json!({"flags": []})));

        let out = DataSource::FeatureFlags.read(&client).unwrap();
        assert_eq!(out, json!({"feature_flags": []}));
    }

    #[test]
    fn test_api_key_status_flattened() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"keys": [
                {"id": "k1", "name": "ci", "key_prefix": "shp_a"},
                {"id": "k2", "name": "old", "key_prefix": "shp_b", "revoked_at": "2026-01-01T00:00:00Z"}
            ]}),
        ));

        let out = DataSource::ApiKeys.read(&client).unwrap();
        assert_eq!(out["api_keys"][0]["status"], "active");
        assert_eq!(out["api_keys"][0]["expires_at"], "");
        assert_eq!(out["api_keys"][1]["status"], "revoked");
    }

    #[test]
    fn test_integrations_summary() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({
                "integrations": [
                    {"type": "scm", "provider": "github", "status": "healthy", "config": {"org": "acme"}},
                    {"type": "chat", "provider": "slack", "status": "degraded"}
                ],
                "total": 2,
                "healthy": 1
            }),
        ));

        let out = DataSource::Integrations.read(&client).unwrap();
        assert_eq!(out["total"], 2);
        assert_eq!(out["healthy"], 1);
        assert_eq!(out["integrations"][0]["config"], r#"{"org":"acme"}"#);
        assert_eq!(out["integrations"][1]["metadata"], "{}");
    }

    #[test]
    fn test_groups_keep_empty_roles() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"items": [{"id": "g1", "name": "Ops", "path": "/Ops", "memberCount": 4}]}),
        ));

        let out = DataSource::Groups.read(&client).unwrap();
        assert_eq!(out["groups"][0]["member_count"], 4);
        assert_eq!(out["groups"][0]["roles"], json!([]));
    }

    #[test]
    fn test_list_failure_names_source() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(403, r#"{"message":"forbidden"}"#));

        let err = DataSource::K8sAgents.read(&client).unwrap_err();
        assert_eq!(err.to_string(), "Could not list K8s agents");
    }
}
