//! Integrations under `/api/v1/integrations`.
//!
//! Two views exist: the aggregated health summary at the root path, and
//! configured integration records under `/configs` and `/{id}`. Records
//! have numeric ids.

use crate::error::Result;
use crate::types::JsonMap;
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

const INTEGRATIONS_PATH: &str = "/api/v1/integrations";

/// A configured integration record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Integration {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub config: Option<JsonMap>,
    pub team_id: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub last_sync_at: Option<String>,
    pub last_error: Option<String>,
}

/// One row of the health summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationStatus {
    #[serde(rename = "type")]
    pub kind: String,
    pub provider: String,
    pub status: String,
    pub config: Option<serde_json::Value>,
    pub last_sync: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// The health summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsStatus {
    pub integrations: Vec<IntegrationStatus>,
    pub total: u64,
    pub healthy: u64,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateIntegrationRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub config: JsonMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateIntegrationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonMap>,
}

#[derive(Debug, Deserialize)]
struct IntegrationEnvelope {
    integration: Integration,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IntegrationList {
    integrations: Vec<Integration>,
    #[allow(dead_code)]
    count: u64,
}

impl Client {
    /// Aggregated health of all integrations.
    pub fn integrations_status(&self) -> Result<IntegrationsStatus> {
        let body = self.get(INTEGRATIONS_PATH)?;
        decode(&body, "integrations status response")
    }

    pub fn list_integrations(&self) -> Result<Vec<Integration>> {
        let body = self.get(&format!("{INTEGRATIONS_PATH}/configs"))?;
        let list: IntegrationList = decode(&body, "integrations response")?;
        Ok(list.integrations)
    }

    pub fn get_integration(&self, id: i64) -> Result<Integration> {
        let body = self.get(&format!("{INTEGRATIONS_PATH}/{id}"))?;
        let envelope: IntegrationEnvelope = decode(&body, "integration response")?;
        Ok(envelope.integration)
    }

    pub fn create_integration(&self, request: &CreateIntegrationRequest) -> Result<Integration> {
        let body = self.post(INTEGRATIONS_PATH, request)?;
        let envelope: IntegrationEnvelope = decode(&body, "create integration response")?;
        Ok(envelope.integration)
    }

    pub fn update_integration(
        &self,
        id: i64,
        request: &UpdateIntegrationRequest,
    ) -> Result<Integration> {
        let body = self.put(&format!("{INTEGRATIONS_PATH}/{id}"), request)?;
        let envelope: IntegrationEnvelope = decode(&body, "update integration response")?;
        Ok(envelope.integration)
    }

    pub fn delete_integration(&self, id: i64) -> Result<()> {
        self.delete(&format!("{INTEGRATIONS_PATH}/{id}"))
    }
}
