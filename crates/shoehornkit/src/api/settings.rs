//! Tenant settings singleton at `/api/v1/admin/settings`.

use crate::error::Result;
use crate::{Client, decode};
use serde::{Deserialize, Serialize};

const SETTINGS_PATH: &str = "/api/v1/admin/settings";

/// The tenant's settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantSettings {
    pub id: String,
    pub tenant_id: Option<String>,
    pub appearance: AppearanceSettings,
    pub announcement: AnnouncementSettings,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Branding and theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub logo_url: String,
    pub favicon_url: String,
    pub default_theme: String,
    pub platform_name: String,
    pub platform_description: String,
    pub company_name: String,
}

/// Site-wide announcement banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncementSettings {
    pub enabled: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pinned: bool,
    pub link_url: String,
    pub link_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl AnnouncementSettings {
    /// Whether the banner carries anything worth reporting.
    pub fn is_set(&self) -> bool {
        self.enabled || !self.message.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub appearance: AppearanceSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement: Option<AnnouncementSettings>,
}

impl Client {
    pub fn get_settings(&self) -> Result<TenantSettings> {
        let body = self.get(SETTINGS_PATH)?;
        decode(&body, "settings response")
    }

    /// Replace the settings document.
    pub fn update_settings(&self, request: &UpdateSettingsRequest) -> Result<TenantSettings> {
        let body = self.put(SETTINGS_PATH, request)?;
        decode(&body, "update settings response")
    }
}
