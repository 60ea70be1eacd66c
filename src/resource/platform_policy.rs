//! Platform policy resource
//!
//! Policies are seeded by the server and addressed by key. Creating one
//! locates it and applies the desired configuration; deleting one only
//! stops tracking it.

use crate::resource::{non_empty, non_empty_opt};
use anyhow::{Context, Result};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{Client, PlatformPolicy, UpdatePolicyRequest};

/// Persisted attributes of `shoehorn_platform_policy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformPolicyModel {
    pub id: Option<String>,
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub enabled: bool,
    pub enforcement: String,
    pub system: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl PlatformPolicyModel {
    fn request(&self) -> UpdatePolicyRequest {
        UpdatePolicyRequest {
            enabled: Some(self.enabled),
            enforcement: non_empty(&self.enforcement),
        }
    }

    fn apply_policy(mut self, policy: PlatformPolicy) -> Self {
        self.id = Some(policy.id);
        self.key = policy.key;
        self.name = Some(policy.name);
        self.enabled = policy.enabled;
        self.system = Some(policy.system);
        if let Some(enforcement) = non_empty(&policy.enforcement) {
            self.enforcement = enforcement;
        }
        if let Some(description) = non_empty_opt(policy.description.as_ref()) {
            self.description = Some(description);
        }
        if let Some(category) = non_empty_opt(policy.category.as_ref()) {
            self.category = Some(category);
        }
        if let Some(at) = non_empty_opt(policy.created_at.as_ref()) {
            self.created_at = Some(at);
        }
        if let Some(at) = non_empty_opt(policy.updated_at.as_ref()) {
            self.updated_at = Some(at);
        }
        self
    }
}

/// `shoehorn_platform_policy`
pub struct PlatformPolicyResource;

impl Resource<Client> for PlatformPolicyResource {
    type Model = PlatformPolicyModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_platform_policy"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["key"]
    }

    fn create(&self, client: &Client, plan: &PlatformPolicyModel) -> Result<PlatformPolicyModel> {
        let key = &plan.key;
        let policy = client.get_policy(key).with_context(|| {
            format!("Policy {key:?} not found. Platform policies are pre-seeded and cannot be created")
        })?;
        let updated = client
            .update_policy(&policy.id, &plan.request())
            .with_context(|| format!("Could not configure policy {key}"))?;
        Ok(plan.clone().apply_policy(updated))
    }

    fn read(
        &self,
        client: &Client,
        state: &PlatformPolicyModel,
    ) -> Result<ReadOutcome<PlatformPolicyModel>> {
        let policy = client
            .get_policy(&state.key)
            .with_context(|| format!("Could not read policy {}", state.key))?;
        Ok(ReadOutcome::Present(state.clone().apply_policy(policy)))
    }

    fn update(
        &self,
        client: &Client,
        plan: &PlatformPolicyModel,
        prior: &PlatformPolicyModel,
    ) -> Result<PlatformPolicyModel> {
        let id = plan
            .id
            .as_deref()
            .or(prior.id.as_deref())
            .with_context(|| format!("Policy {} has no id in state", plan.key))?;
        let updated = client
            .update_policy(id, &plan.request())
            .with_context(|| format!("Could not update policy {}", plan.key))?;
        Ok(plan.clone().apply_policy(updated))
    }

    fn delete(&self, _client: &Client, state: &PlatformPolicyModel) -> Result<()> {
        log::info!("Policy {} is no longer managed; it stays configured on the server", state.key);
        Ok(())
    }

    fn import_seed(&self, key: &str) -> Result<PlatformPolicyModel> {
        Ok(PlatformPolicyModel {
            key: key.to_string(),
            ..Default::default()
        })
    }
}
