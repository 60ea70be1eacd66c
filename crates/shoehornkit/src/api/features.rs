//! Feature flags under `/api/v1/admin/features`.
//!
//! Flags are addressed by key. There is no single-flag GET, so
//! [`Client::get_feature_flag`] scans the full list.

use crate::api::escape;
use crate::error::{Error, Result};
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

const FEATURES_PATH: &str = "/api/v1/admin/features";

/// A feature flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlag {
    pub id: String,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub default_enabled: bool,
    pub override_count: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFeatureFlagRequest {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub default_enabled: bool,
}

/// Body for `PUT /api/v1/admin/features/{key}`.
///
/// `default_enabled: Some(false)` is sent explicitly; `None` is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFeatureFlagRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlagList {
    flags: Vec<FeatureFlag>,
}

impl Client {
    pub fn list_feature_flags(&self) -> Result<Vec<FeatureFlag>> {
        let body = self.get(FEATURES_PATH)?;
        let list: FlagList = decode(&body, "feature flags response")?;
        Ok(list.flags)
    }

    /// Find a flag by key.
    ///
    /// Returns [`Error::NotFound`] when no listed flag matches.
    pub fn get_feature_flag(&self, key: &str) -> Result<FeatureFlag> {
        self.list_feature_flags()?
            .into_iter()
            .find(|flag| flag.key == key)
            .ok_or_else(|| Error::not_found("feature flag", key))
    }

    pub fn create_feature_flag(&self, request: &CreateFeatureFlagRequest) -> Result<FeatureFlag> {
        let body = self.post(FEATURES_PATH, request)?;
        decode(&body, "create feature flag response")
    }

    pub fn update_feature_flag(
        &self,
        key: &str,
        request: &UpdateFeatureFlagRequest,
    ) -> Result<FeatureFlag> {
        let body = self.put(&format!("{FEATURES_PATH}/{}", escape(key)), request)?;
        decode(&body, "update feature flag response")
    }

    pub fn delete_feature_flag(&self, key: &str) -> Result<()> {
        self.delete(&format!("{FEATURES_PATH}/{}", escape(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_client;
    use crate::transport::{Method, MockReply};
    use serde_json::json;

    fn flags() -> serde_json::Value {
        json!({"flags": [
            {"id": "f1", "key": "new-ui", "name": "New UI", "default_enabled": true},
            {"id": "f2", "key": "beta", "name": "Beta"}
        ]})
    }

    #[test]
    fn test_get_feature_flag_scans_list() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &flags()));

        let flag = client.get_feature_flag("beta").unwrap();
        assert_eq!(flag.id, "f2");
        assert!(!flag.default_enabled);
    }

    #[test]
    fn test_get_feature_flag_missing() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &flags()));

        let err = client.get_feature_flag("gone").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), r#"feature flag "gone" not found"#);
    }

    #[test]
    fn test_create_sends_default_enabled_false() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(201, &json!({"id": "f3", "key": "k", "name": "K"})));

        client
            .create_feature_flag(&CreateFeatureFlagRequest {
                key: "k".to_string(),
                name: "K".to_string(),
                description: None,
                default_enabled: false,
            })
            .unwrap();

        assert_eq!(
            mock.last_request().unwrap().json_body().unwrap(),
            json!({"key": "k", "name": "K", "default_enabled": false})
        );
    }

    #[test]
    fn test_update_addresses_by_key() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(200, &json!({"id": "f1", "key": "new-ui", "name": "N"})));

        let request = UpdateFeatureFlagRequest {
            default_enabled: Some(false),
            ..Default::default()
        };
        client.update_feature_flag("new-ui", &request).unwrap();

        let req = mock.last_request().unwrap();
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.path(), "/api/v1/admin/features/new-ui");
        assert_eq!(req.json_body().unwrap(), json!({"default_enabled": false}));
    }
}
