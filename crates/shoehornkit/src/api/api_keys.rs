//! API keys under `/api/v1/admin/api-keys`.
//!
//! The raw secret is only returned once, by [`Client::create_api_key`].
//! Keys are never deleted, only revoked.

use crate::api::escape;
use crate::error::{Error, Result};
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

const API_KEYS_PATH: &str = "/api/v1/admin/api-keys";

/// An API key's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKey {
    pub id: String,
    pub tenant_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub key_prefix: String,
    pub scopes: Vec<String>,
    pub last_used_at: Option<String>,
    pub expires_at: Option<String>,
    pub revoked_at: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ApiKey {
    /// Whether the key carries a revocation timestamp.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.as_deref().is_some_and(|at| !at.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_days: Option<i64>,
}

/// Create response: metadata plus the one-time secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateApiKeyResponse {
    pub key: ApiKey,
    pub raw_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeyList {
    keys: Vec<ApiKey>,
    #[allow(dead_code)]
    total: u64,
}

impl Client {
    pub fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
        let body = self.get(API_KEYS_PATH)?;
        let list: KeyList = decode(&body, "API keys response")?;
        Ok(list.keys)
    }

    /// Find a key by id in the full listing.
    pub fn get_api_key(&self, id: &str) -> Result<ApiKey> {
        self.list_api_keys()?
            .into_iter()
            .find(|key| key.id == id)
            .ok_or_else(|| Error::not_found("API key", id))
    }

    pub fn create_api_key(&self, request: &CreateApiKeyRequest) -> Result<CreateApiKeyResponse> {
        let body = self.post(API_KEYS_PATH, request)?;
        decode(&body, "create API key response")
    }

    pub fn revoke_api_key(&self, id: &str) -> Result<()> {
        self.post_empty(&format!("{API_KEYS_PATH}/{}/revoke", escape(id)))?;
        Ok(())
    }
}
