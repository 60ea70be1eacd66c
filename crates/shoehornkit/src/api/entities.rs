//! Catalog entities.
//!
//! Entities are read through `/api/v1/entities` and written as YAML
//! manifests through `/api/v1/manifests/entities`. The manifest text is
//! opaque here; rendering it is the caller's job.
//!
//! # Pagination
//!
//! [`Client::list_entities`] follows `page.nextCursor` until the server
//! returns an empty or missing cursor, accumulating every page in order.

use crate::api::escape;
use crate::error::Result;
use crate::types::JsonMap;
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

/// Page size requested when listing entities.
const PAGE_LIMIT: u32 = 100;

/// A catalog entity as returned by `GET /api/v1/entities/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Entity {
    pub service: EntityService,
    pub description: Option<String>,
    pub owner: Vec<OwnerInfo>,
    pub lifecycle: Option<String>,
    pub tags: Vec<String>,
    pub links: Vec<LinkInfo>,
    pub relations: Vec<RelationInfo>,
    pub integrations: Option<EntityIntegrations>,
    pub interfaces: Option<JsonMap>,
    pub repository_path: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// The `service` block of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityService {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

/// An owner reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// A link attached to an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkInfo {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
}

/// A relation in the server's split form: `targetType` + `targetId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelationInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub target_type: String,
    pub target_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub via: String,
}

impl RelationInfo {
    /// Target in the joined `targetType:targetId` form used by manifests.
    pub fn target(&self) -> String {
        format!("{}:{}", self.target_type, self.target_id)
    }
}

/// The `integrations` block of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityIntegrations {
    pub changelog: Option<ChangelogIntegration>,
    pub licenses: Vec<LicenseInfo>,
}

/// Changelog integration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogIntegration {
    pub path: String,
}

/// A software license entry.
///
/// Empty fields and zero seats are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseInfo {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vendor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub purchased: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expires: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub seats: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cost: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contract: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Request body for manifest create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRequest {
    /// Manifest YAML
    pub content: String,
    /// Origin tag recorded by the server
    pub source: String,
}

/// Entity summary returned by manifest create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestEntity {
    pub id: i64,
    pub service_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub lifecycle: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Response of manifest create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestEntityResponse {
    pub success: bool,
    pub entity: ManifestEntity,
}

/// An entity as it appears in the list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityListItem {
    pub service: EntityService,
    pub description: Option<String>,
    pub owner: Vec<OwnerInfo>,
    pub lifecycle: Option<String>,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntityEnvelope {
    entity: Entity,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EntityPage {
    entities: Vec<EntityListItem>,
    page: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PageInfo {
    #[allow(dead_code)]
    total: u64,
    #[allow(dead_code)]
    limit: u64,
    next_cursor: Option<String>,
}

fn entities_page_path(cursor: Option<&str>) -> String {
    match cursor {
        Some(c) => format!("/api/v1/entities?limit={PAGE_LIMIT}&cursor={}", escape(c)),
        None => format!("/api/v1/entities?limit={PAGE_LIMIT}"),
    }
}

impl Client {
    /// List every entity, following the cursor chain.
    pub fn list_entities(&self) -> Result<Vec<EntityListItem>> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = self.get(&entities_page_path(cursor.as_deref()))?;
            let page: EntityPage = decode(&body, "entities list response")?;
            all.extend(page.entities);

            match page.page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        log::debug!("Listed {} entities", all.len());
        Ok(all)
    }

    /// Get an entity by service id.
    pub fn get_entity(&self, service_id: &str) -> Result<Entity> {
        let body = self.get(&format!("/api/v1/entities/{}", escape(service_id)))?;
        let envelope: EntityEnvelope = decode(&body, "entity response")?;
        Ok(envelope.entity)
    }

    /// Create an entity from a manifest.
    pub fn create_entity(&self, request: &ManifestRequest) -> Result<ManifestEntityResponse> {
        let body = self.post("/api/v1/manifests/entities", request)?;
        decode(&body, "create entity response")
    }

    /// Replace an entity's manifest.
    pub fn update_entity(
        &self,
        service_id: &str,
        request: &ManifestRequest,
    ) -> Result<ManifestEntityResponse> {
        let path = format!("/api/v1/manifests/entities/{}", escape(service_id));
        let body = self.put(&path, request)?;
        decode(&body, "update entity response")
    }

    /// Delete an entity.
    ///
    /// The server side of this endpoint has not been verified against a
    /// live deployment; a 404 or 405 here means it is still missing.
    pub fn delete_entity(&self, service_id: &str) -> Result<()> {
        self.delete(&format!("/api/v1/manifests/entities/{}", escape(service_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_client;
    use crate::transport::{Method, MockReply};
    use serde_json::json;

    fn page(ids: &[&str], next: Option<&str>) -> serde_json::Value {
        let entities: Vec<_> = ids
            .iter()
            .map(|id| json!({"service": {"id": id, "name": id, "type": "service"}}))
            .collect();
        json!({"entities": entities, "page": {"total": 5, "limit": 100, "nextCursor": next}})
    }

    #[test]
    fn test_list_entities_follows_cursor() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &page(&["a", "b"], Some("c1"))));
        mock.push(MockReply::json(200, &page(&["c", "d"], Some("c2"))));
        mock.push(MockReply::json(200, &page(&["e"], None)));

        let all = client.list_entities().unwrap();
        let ids: Vec<_> = all.iter().map(|e| e.service.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);

        let paths: Vec<_> = mock.requests().iter().map(|r| r.path().to_string()).collect();
        assert_eq!(
            paths,
            [
                "/api/v1/entities?limit=100",
                "/api/v1/entities?limit=100&cursor=c1",
                "/api/v1/entities?limit=100&cursor=c2",
            ]
        );
    }

    #[test]
    fn test_list_entities_empty_cursor_stops() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &page(&["a"], Some(""))));

        assert_eq!(client.list_entities().unwrap().len(), 1);
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_get_entity_decodes_relations_and_interfaces() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"entity": {
                "service": {"id": "api-gateway", "name": "api-gateway", "type": "service", "tier": "critical"},
                "lifecycle": "production",
                "owner": [{"type": "team", "id": "platform"}],
                "relations": [{"type": "depends_on", "targetType": "service", "targetId": "auth"}],
                "interfaces": {"http": {"baseUrl": "https://api"}},
                "integrations": {"licenses": [{"title": "Ent", "seats": 10}]}
            }}),
        ));

        let entity = client.get_entity("api-gateway").unwrap();
        assert_eq!(entity.service.tier.as_deref(), Some("critical"));
        assert_eq!(entity.relations[0].target(), "service:auth");
        assert_eq!(entity.owner[0].id, "platform");
        assert!(entity.interfaces.unwrap().contains_key("http"));
        assert_eq!(entity.integrations.unwrap().licenses[0].seats, 10);
        assert_eq!(
            mock.last_request().unwrap().path(),
            "/api/v1/entities/api-gateway"
        );
    }

    #[test]
    fn test_create_entity_posts_manifest() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            201,
            &json!({"success": true, "entity": {"id": 7, "serviceId": "api-gateway", "lifecycle": "experimental"}}),
        ));

        let request = ManifestRequest {
            content: "schemaVersion: 1\n".to_string(),
            source: "terraform".to_string(),
        };
        let resp = client.create_entity(&request).unwrap();
        assert!(resp.success);
        assert_eq!(resp.entity.service_id, "api-gateway");

        let req = mock.last_request().unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path(), "/api/v1/manifests/entities");
        assert_eq!(
            req.json_body().unwrap(),
            json!({"content": "schemaVersion: 1\n", "source": "terraform"})
        );
    }

    #[test]
    fn test_update_and_delete_paths() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &json!({"success": true, "entity": {}})));
        mock.push(MockReply::status(204, ""));

        let request = ManifestRequest {
            content: String::new(),
            source: "terraform".to_string(),
        };
        client.update_entity("svc", &request).unwrap();
        client.delete_entity("svc").unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].path(), "/api/v1/manifests/entities/svc");
        assert_eq!(requests[1].method, Method::Delete);
        assert_eq!(requests[1].path(), "/api/v1/manifests/entities/svc");
    }

    #[test]
    fn test_decode_error_names_payload() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(200, "not json"));
        let err = client.get_entity("x").unwrap_err();
        assert!(err.to_string().starts_with("unmarshal entity response"));
    }

    #[test]
    fn test_license_serialization_omits_empty_fields() {
        let license = LicenseInfo {
            title: "Ent".to_string(),
            seats: 0,
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&license).unwrap(), r#"{"title":"Ent"}"#);
    }
}
