//! External integration resource
//!
//! The server masks secret config values on read, so `config_json` is
//! never taken from a response; state keeps whatever was last applied.

use crate::resource::{non_empty, non_empty_opt};
use anyhow::{Context, Result};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{
    Client, CreateIntegrationRequest, Integration, JsonMap, UpdateIntegrationRequest,
};

/// Persisted attributes of `shoehorn_integration`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationModel {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: Option<String>,
    pub config_json: Option<String>,
    pub team_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl IntegrationModel {
    fn numeric_id(&self) -> Result<i64> {
        let id = self.id.as_deref().unwrap_or_default();
        id.parse()
            .with_context(|| format!("Invalid ID: Could not parse integration ID {id:?}"))
    }

    fn parsed_config(&self) -> Result<Option<JsonMap>> {
        self.config_json
            .as_deref()
            .map(|text| {
                serde_json::from_str(text)
                    .context("Invalid Config JSON: Could not parse config_json")
            })
            .transpose()
    }

    fn apply_integration(mut self, integration: Integration) -> Self {
        self.id = Some(integration.id.to_string());
        self.name = integration.name;
        self.kind = integration.kind;
        if let Some(status) = non_empty(&integration.status) {
            self.status = Some(status);
        }
        if let Some(team) = non_empty_opt(integration.team_id.as_ref()) {
            self.team_id = Some(team);
        }
        if let Some(at) = non_empty_opt(integration.created_at.as_ref()) {
            self.created_at = Some(at);
        }
        if let Some(at) = non_empty_opt(integration.updated_at.as_ref()) {
            self.updated_at = Some(at);
        }
        self
    }
}

/// `shoehorn_integration`
pub struct IntegrationResource;

impl Resource<Client> for IntegrationResource {
    type Model = IntegrationModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_integration"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["type", "team_id"]
    }

    fn create(&self, client: &Client, plan: &IntegrationModel) -> Result<IntegrationModel> {
        let request = CreateIntegrationRequest {
            name: plan.name.clone(),
            kind: plan.kind.clone(),
            config: plan.parsed_config()?.unwrap_or_default(),
            team_id: plan.team_id.clone(),
        };
        let integration = client
            .create_integration(&request)
            .context("Could not create integration")?;
        Ok(plan.clone().apply_integration(integration))
    }

    fn read(&self, client: &Client, state: &IntegrationModel) -> Result<ReadOutcome<IntegrationModel>> {
        let id = state.numeric_id()?;
        match client.get_integration(id) {
            Ok(integration) => Ok(ReadOutcome::Present(state.clone().apply_integration(integration))),
            Err(e) => {
                if !e.is_not_found() {
                    log::warn!("Dropping integration {id} after failed read: {e}");
                }
                Ok(ReadOutcome::Gone)
            }
        }
    }

    fn update(
        &self,
        client: &Client,
        plan: &IntegrationModel,
        _prior: &IntegrationModel,
    ) -> Result<IntegrationModel> {
        let id = plan.numeric_id()?;
        let request = UpdateIntegrationRequest {
            name: Some(plan.name.clone()),
            status: None,
            config: plan.parsed_config()?,
        };
        let integration = client
            .update_integration(id, &request)
            .with_context(|| format!("Could not update integration {id}"))?;
        Ok(plan.clone().apply_integration(integration))
    }

    fn delete(&self, client: &Client, state: &IntegrationModel) -> Result<()> {
        let id = state.numeric_id()?;
        client
            .delete_integration(id)
            .with_context(|| format!("Could not delete integration {id}"))
    }

    fn import_seed(&self, id: &str) -> Result<IntegrationModel> {
        Ok(IntegrationModel {
            id: Some(id.to_string()),
            ..Default::default()
        })
    }
}
