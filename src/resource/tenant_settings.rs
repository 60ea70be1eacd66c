//! Tenant settings singleton
//!
//! Create and update both upsert the whole document. Appearance fields
//! the server leaves empty keep their previous value in state.

use crate::resource::{non_empty, non_empty_opt};
use anyhow::{Context, Result};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{
    AnnouncementSettings, AppearanceSettings, Client, TenantSettings, UpdateSettingsRequest,
};

/// Persisted attributes of `shoehorn_tenant_settings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantSettingsModel {
    pub id: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub default_theme: Option<String>,
    pub platform_name: Option<String>,
    pub platform_description: Option<String>,
    pub company_name: Option<String>,
    pub announcement: Option<AnnouncementSettings>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn overlay(field: &mut Option<String>, fresh: &str) {
    if let Some(value) = non_empty(fresh) {
        *field = Some(value);
    }
}

impl TenantSettingsModel {
    fn request(&self) -> UpdateSettingsRequest {
        let text = |field: &Option<String>| field.clone().unwrap_or_default();
        UpdateSettingsRequest {
            appearance: AppearanceSettings {
                primary_color: text(&self.primary_color),
                secondary_color: text(&self.secondary_color),
                accent_color: text(&self.accent_color),
                logo_url: text(&self.logo_url),
                favicon_url: text(&self.favicon_url),
                default_theme: text(&self.default_theme),
                platform_name: text(&self.platform_name),
                platform_description: text(&self.platform_description),
                company_name: text(&self.company_name),
            },
            announcement: self.announcement.clone().map(|mut banner| {
                banner.updated_at = None;
                banner
            }),
        }
    }

    fn apply_settings(mut self, settings: TenantSettings) -> Self {
        let look = &settings.appearance;
        self.id = Some(settings.id.clone());
        overlay(&mut self.primary_color, &look.primary_color);
        overlay(&mut self.secondary_color, &look.secondary_color);
        overlay(&mut self.accent_color, &look.accent_color);
        overlay(&mut self.logo_url, &look.logo_url);
        overlay(&mut self.favicon_url, &look.favicon_url);
        overlay(&mut self.default_theme, &look.default_theme);
        overlay(&mut self.platform_name, &look.platform_name);
        overlay(&mut self.platform_description, &look.platform_description);
        overlay(&mut self.company_name, &look.company_name);
        if settings.announcement.is_set() {
            self.announcement = Some(settings.announcement);
        }
        if let Some(at) = non_empty_opt(settings.created_at.as_ref()) {
            self.created_at = Some(at);
        }
        if let Some(at) = non_empty_opt(settings.updated_at.as_ref()) {
            self.updated_at = Some(at);
        }
        self
    }
}

/// `shoehorn_tenant_settings`
pub struct TenantSettingsResource;

impl Resource<Client> for TenantSettingsResource {
    type Model = TenantSettingsModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_tenant_settings"
    }

    fn create(&self, client: &Client, plan: &TenantSettingsModel) -> Result<TenantSettingsModel> {
        let settings = client
            .update_settings(&plan.request())
            .context("Could not create/update settings")?;
        Ok(plan.clone().apply_settings(settings))
    }

    fn read(
        &self,
        client: &Client,
        state: &TenantSettingsModel,
    ) -> Result<ReadOutcome<TenantSettingsModel>> {
        let settings = client.get_settings().context("Could not read settings")?;
        Ok(ReadOutcome::Present(state.clone().apply_settings(settings)))
    }

    fn update(
        &self,
        client: &Client,
        plan: &TenantSettingsModel,
        _prior: &TenantSettingsModel,
    ) -> Result<TenantSettingsModel> {
        let settings = client
            .update_settings(&plan.request())
            .context("Could not update settings")?;
        Ok(plan.clone().apply_settings(settings))
    }

    fn delete(&self, _client: &Client, _state: &TenantSettingsModel) -> Result<()> {
        log::info!("Tenant settings are no longer managed; the server keeps its current values");
        Ok(())
    }

    fn import_seed(&self, id: &str) -> Result<TenantSettingsModel> {
        Ok(TenantSettingsModel {
            id: Some(id.to_string()),
            ..Default::default()
        })
    }
}
