//! Resource adapters for the Shoehorn API
//!
//! Every remote object type is modeled as a [`declarative::Resource`] over
//! a [`Client`]:
//! - A serde model mirroring the persisted attributes
//! - Create/Read/Update/Delete/Import against the typed client
//! - Replace fields for attributes the server cannot change in place
//!
//! Sub-collections the server may reorder are persisted as JSON text and
//! reconciled through [`crate::reconcile`].

pub mod api_key;
pub mod entity;
pub mod feature_flag;
pub mod group_role_mapping;
pub mod integration;
pub mod k8s_agent;
pub mod platform_policy;
pub mod team;
pub mod tenant_settings;
pub mod user_role;

use anyhow::{Result, bail};
use declarative::Registry;
use shoehornkit::Client;

/// Every resource type this provider manages.
pub fn registry() -> Registry<Client> {
    let mut registry = Registry::new();
    registry.register(Box::new(entity::EntityResource));
    registry.register(Box::new(team::TeamResource));
    registry.register(Box::new(feature_flag::FeatureFlagResource));
    registry.register(Box::new(api_key::ApiKeyResource));
    registry.register(Box::new(platform_policy::PlatformPolicyResource));
    registry.register(Box::new(tenant_settings::TenantSettingsResource));
    registry.register(Box::new(integration::IntegrationResource));
    registry.register(Box::new(k8s_agent::K8sAgentResource));
    registry.register(Box::new(user_role::UserRoleResource));
    registry.register(Box::new(group_role_mapping::GroupRoleMappingResource));
    registry
}

/// Split a composite import id `left:right` at the first colon
///
/// Both halves must be non-empty; `format` names them in the error.
pub fn split_import_id(id: &str, format: &str) -> Result<(String, String)> {
    match id.split_once(':') {
        Some((left, right)) if !left.is_empty() && !right.is_empty() => {
            Ok((left.to_string(), right.to_string()))
        }
        _ => bail!("Invalid Import ID: Expected import ID in format '{format}', got: {id}"),
    }
}

/// `Some` for a non-empty string
pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// `Some` for a present, non-empty string
pub(crate) fn non_empty_opt(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}
