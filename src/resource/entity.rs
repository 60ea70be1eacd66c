//! Catalog entity resource
//!
//! Entities are written as YAML manifests (see [`crate::manifest`]) and
//! read back from the entity endpoint. The read keeps the previously
//! persisted relations, links, licenses and interfaces text whenever the
//! server's version is equivalent, so reordering on the server side never
//! shows up as drift.

use crate::manifest::render_manifest;
use crate::reconcile::{self, Relation};
use crate::resource::{non_empty, non_empty_opt};
use anyhow::{Context, Result};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{Client, Entity, ManifestEntity, ManifestRequest};

/// Origin tag recorded on manifests written by this provider
const MANIFEST_SOURCE: &str = "terraform";

/// Persisted attributes of `shoehorn_entity`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityModel {
    /// Service id assigned by the server (the entity name)
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub lifecycle: Option<String>,
    pub tier: Option<String>,
    /// Owning team id
    pub owner: Option<String>,
    pub tags: Option<Vec<String>>,
    /// JSON text: `[{name, url, icon?}]`
    pub links: Option<String>,
    /// JSON text: `[{type, target, via?}]`
    pub relations: Option<String>,
    /// JSON text: `[{title, vendor?, ...}]`
    pub licenses: Option<String>,
    pub changelog_path: Option<String>,
    /// JSON text: `{http?, grpc?}`
    pub interfaces: Option<String>,
    pub repository_path: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl EntityModel {
    fn service_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .context("Entity has no id in state")
    }

    /// Fill computed attributes from a manifest write response.
    fn with_written(mut self, written: ManifestEntity) -> Self {
        self.created_at = non_empty_opt(written.created_at.as_ref());
        self.updated_at = non_empty_opt(written.updated_at.as_ref());
        if self.lifecycle.is_none() {
            self.lifecycle = written.lifecycle;
        }
        self
    }

    /// Overlay a fetched entity. Attributes the server leaves empty keep
    /// their previous values.
    fn apply_entity(&mut self, entity: &Entity) {
        self.id = Some(entity.service.id.clone());
        self.name = entity.service.name.clone();
        self.kind = entity.service.kind.clone();

        if let Some(tier) = non_empty_opt(entity.service.tier.as_ref()) {
            self.tier = Some(tier);
        }
        if let Some(description) = non_empty_opt(entity.description.as_ref()) {
            self.description = Some(description);
        }
        if let Some(lifecycle) = non_empty_opt(entity.lifecycle.as_ref()) {
            self.lifecycle = Some(lifecycle);
        }
        if let Some(owner) = entity.owner.first() {
            self.owner = Some(owner.id.clone());
        }
        if !entity.tags.is_empty() {
            self.tags = Some(entity.tags.clone());
        }

        if !entity.links.is_empty() {
            if let Some(text) = reconcile::to_json_text(&entity.links) {
                self.links = Some(text);
            }
        }

        if !entity.relations.is_empty() {
            let mut relations: Vec<Relation> = entity
                .relations
                .iter()
                .map(|r| Relation {
                    kind: r.kind.clone(),
                    target: r.target(),
                    via: String::new(),
                })
                .collect();
            relations.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.target.cmp(&b.target)));
            if let Some(text) = reconcile::to_json_text(&relations) {
                self.relations = Some(text);
            }
        }

        if let Some(path) = non_empty_opt(entity.repository_path.as_ref()) {
            self.repository_path = Some(path);
        }

        if let Some(interfaces) = entity.interfaces.as_ref().filter(|m| !m.is_empty()) {
            if let Some(text) = reconcile::to_json_text(interfaces) {
                self.interfaces = Some(text);
            }
        }

        if let Some(integrations) = &entity.integrations {
            if let Some(path) = integrations
                .changelog
                .as_ref()
                .and_then(|c| non_empty(&c.path))
            {
                self.changelog_path = Some(path);
            }
            if !integrations.licenses.is_empty() {
                if let Some(text) = reconcile::to_json_text(&integrations.licenses) {
                    self.licenses = Some(text);
                }
            }
        }

        if let Some(at) = non_empty_opt(entity.created_at.as_ref()) {
            self.created_at = Some(at);
        }
        if let Some(at) = non_empty_opt(entity.updated_at.as_ref()) {
            self.updated_at = Some(at);
        }
    }
}

fn manifest_request(model: &EntityModel) -> ManifestRequest {
    ManifestRequest {
        content: render_manifest(model),
        source: MANIFEST_SOURCE.to_string(),
    }
}

/// `shoehorn_entity`
pub struct EntityResource;

impl Resource<Client> for EntityResource {
    type Model = EntityModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_entity"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn create(&self, client: &Client, plan: &EntityModel) -> Result<EntityModel> {
        let response = client
            .create_entity(&manifest_request(plan))
            .context("Could not create entity")?;
        log::info!("Created entity {}", response.entity.service_id);

        let mut state = plan.clone();
        state.id = Some(response.entity.service_id.clone());
        if state.repository_path.is_none() {
            state.repository_path = Some(String::new());
        }
        Ok(state.with_written(response.entity))
    }

    fn read(&self, client: &Client, state: &EntityModel) -> Result<ReadOutcome<EntityModel>> {
        let id = state.service_id()?;
        let entity = client
            .get_entity(id)
            .with_context(|| format!("Could not read entity {id}"))?;

        let mut fresh = state.clone();
        fresh.apply_entity(&entity);

        fresh.relations = reconcile::preserve_if_equivalent(
            "relations",
            state.relations.as_ref(),
            fresh.relations.take(),
            reconcile::relations_equivalent,
        );
        fresh.links = reconcile::preserve_if_equivalent(
            "links",
            state.links.as_ref(),
            fresh.links.take(),
            reconcile::links_equivalent,
        );
        fresh.interfaces = reconcile::preserve_if_equivalent(
            "interfaces",
            state.interfaces.as_ref(),
            fresh.interfaces.take(),
            reconcile::interfaces_equivalent,
        );
        fresh.licenses = reconcile::preserve_if_equivalent(
            "licenses",
            state.licenses.as_ref(),
            fresh.licenses.take(),
            reconcile::licenses_equivalent,
        );
        if let (Some(previous), Some(current)) = (&state.tags, &fresh.tags) {
            if reconcile::same_set(previous, current) {
                fresh.tags = Some(previous.clone());
            }
        }

        Ok(ReadOutcome::Present(fresh))
    }

    fn update(&self, client: &Client, plan: &EntityModel, prior: &EntityModel) -> Result<EntityModel> {
        let id = prior.service_id()?;
        let response = client
            .update_entity(id, &manifest_request(plan))
            .with_context(|| format!("Could not update entity {id}"))?;
        log::info!("Updated entity {id}");

        let mut state = plan.clone();
        state.id = Some(id.to_string());
        if state.repository_path.is_none() {
            state.repository_path = prior.repository_path.clone();
        }
        Ok(state.with_written(response.entity))
    }

    fn delete(&self, client: &Client, state: &EntityModel) -> Result<()> {
        let id = state.service_id()?;
        client
            .delete_entity(id)
            .with_context(|| format!("Could not delete entity {id}"))
    }

    fn import_seed(&self, id: &str) -> Result<EntityModel> {
        Ok(EntityModel {
            id: Some(id.to_string()),
            ..Default::default()
        })
    }
}
