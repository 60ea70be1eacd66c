//! API key resource
//!
//! Keys cannot be edited: every configurable attribute forces a new key.
//! The raw secret is only returned by the create call, so reads carry it
//! forward from state. Deleting a key revokes it.

use crate::reconcile;
use crate::resource::non_empty_opt;
use anyhow::{Context, Result, bail};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{Client, CreateApiKeyRequest};

/// Persisted attributes of `shoehorn_api_key`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeyModel {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub scopes: Vec<String>,
    pub expires_in_days: Option<i64>,
    pub key_prefix: Option<String>,
    /// Secret, only known from the create response
    pub raw_key: Option<String>,
    pub expires_at: Option<String>,
    pub created_at: Option<String>,
}

impl ApiKeyModel {
    fn key_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .context("API key has no id in state")
    }
}

/// `shoehorn_api_key`
pub struct ApiKeyResource;

impl Resource<Client> for ApiKeyResource {
    type Model = ApiKeyModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_api_key"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["name", "description", "scopes", "expires_in_days"]
    }

    fn create(&self, client: &Client, plan: &ApiKeyModel) -> Result<ApiKeyModel> {
        let request = CreateApiKeyRequest {
            name: plan.name.clone(),
            description: plan.description.clone(),
            scopes: plan.scopes.clone(),
            expires_in_days: plan.expires_in_days,
        };
        let created = client
            .create_api_key(&request)
            .context("Could not create API key")?;
        log::info!("Created API key {} ({})", created.key.name, created.key.key_prefix);

        let mut state = plan.clone();
        state.id = Some(created.key.id);
        state.key_prefix = Some(created.key.key_prefix);
        state.raw_key = Some(created.raw_key);
        state.expires_at = non_empty_opt(created.key.expires_at.as_ref());
        state.created_at = non_empty_opt(created.key.created_at.as_ref());
        Ok(state)
    }

    fn read(&self, client: &Client, state: &ApiKeyModel) -> Result<ReadOutcome<ApiKeyModel>> {
        let id = state.key_id()?;
        let key = match client.get_api_key(id) {
            Ok(key) => key,
            Err(e) if e.is_not_found() => {
                log::debug!("API key {id} no longer exists");
                return Ok(ReadOutcome::Gone);
            }
            Err(e) => return Err(e).with_context(|| format!("Could not read API key {id}")),
        };
        if key.is_revoked() {
            log::debug!("API key {id} was revoked");
            return Ok(ReadOutcome::Gone);
        }

        let mut fresh = state.clone();
        fresh.name = key.name;
        fresh.key_prefix = Some(key.key_prefix);
        if let Some(at) = non_empty_opt(key.expires_at.as_ref()) {
            fresh.expires_at = Some(at);
        }
        if let Some(at) = non_empty_opt(key.created_at.as_ref()) {
            fresh.created_at = Some(at);
        }
        fresh.raw_key = reconcile::carry_forward("raw_key", state.raw_key.as_ref(), None);
        Ok(ReadOutcome::Present(fresh))
    }

    fn update(&self, _client: &Client, _plan: &ApiKeyModel, _prior: &ApiKeyModel) -> Result<ApiKeyModel> {
        bail!("Update Not Supported: API keys cannot be updated. Changes require creating a new key.")
    }

    fn delete(&self, client: &Client, state: &ApiKeyModel) -> Result<()> {
        let id = state.key_id()?;
        client
            .revoke_api_key(id)
            .with_context(|| format!("Could not revoke API key {id}"))
    }
}
