//! Feature flag resource, addressed by key

use crate::resource::non_empty_opt;
use anyhow::{Context, Result};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{Client, CreateFeatureFlagRequest, FeatureFlag, UpdateFeatureFlagRequest};

/// Persisted attributes of `shoehorn_feature_flag`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlagModel {
    pub id: Option<String>,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub default_enabled: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl FeatureFlagModel {
    fn apply_flag(mut self, flag: FeatureFlag) -> Self {
        self.id = Some(flag.id);
        self.key = flag.key;
        self.name = flag.name;
        self.default_enabled = flag.default_enabled;
        if let Some(description) = non_empty_opt(flag.description.as_ref()) {
            self.description = Some(description);
        }
        if let Some(at) = non_empty_opt(flag.created_at.as_ref()) {
            self.created_at = Some(at);
        }
        if let Some(at) = non_empty_opt(flag.updated_at.as_ref()) {
            self.updated_at = Some(at);
        }
        self
    }
}

/// `shoehorn_feature_flag`
pub struct FeatureFlagResource;

impl Resource<Client> for FeatureFlagResource {
    type Model = FeatureFlagModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_feature_flag"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["key"]
    }

    fn create(&self, client: &Client, plan: &FeatureFlagModel) -> Result<FeatureFlagModel> {
        let request = CreateFeatureFlagRequest {
            key: plan.key.clone(),
            name: plan.name.clone(),
            description: plan.description.clone(),
            default_enabled: plan.default_enabled,
        };
        let flag = client
            .create_feature_flag(&request)
            .context("Could not create feature flag")?;
        Ok(plan.clone().apply_flag(flag))
    }

    fn read(
        &self,
        client: &Client,
        state: &FeatureFlagModel,
    ) -> Result<ReadOutcome<FeatureFlagModel>> {
        match client.get_feature_flag(&state.key) {
            Ok(flag) => Ok(ReadOutcome::Present(state.clone().apply_flag(flag))),
            Err(e) if e.is_not_found() => {
                log::debug!("Feature flag {} no longer exists", state.key);
                Ok(ReadOutcome::Gone)
            }
            Err(e) => Err(e).with_context(|| format!("Could not read feature flag {}", state.key)),
        }
    }

    fn update(
        &self,
        client: &Client,
        plan: &FeatureFlagModel,
        _prior: &FeatureFlagModel,
    ) -> Result<FeatureFlagModel> {
        let request = UpdateFeatureFlagRequest {
            name: Some(plan.name.clone()),
            description: plan.description.clone(),
            default_enabled: Some(plan.default_enabled),
        };
        let flag = client
            .update_feature_flag(&plan.key, &request)
            .with_context(|| format!("Could not update feature flag {}", plan.key))?;
        Ok(plan.clone().apply_flag(flag))
    }

    fn delete(&self, client: &Client, state: &FeatureFlagModel) -> Result<()> {
        client
            .delete_feature_flag(&state.key)
            .with_context(|| format!("Could not delete feature flag {}", state.key))
    }

    fn import_seed(&self, key: &str) -> Result<FeatureFlagModel> {
        Ok(FeatureFlagModel {
            key: key.to_string(),
            ..Default::default()
        })
    }
}
