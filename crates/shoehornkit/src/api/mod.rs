//! Typed endpoint families of the Shoehorn API.
//!
//! Each submodule adds methods to [`Client`](crate::Client) for one family
//! and defines the request/response models it exchanges.

pub mod api_keys;
pub mod entities;
pub mod features;
pub mod groups;
pub mod integrations;
pub mod k8s_agents;
pub mod policies;
pub mod roles;
pub mod settings;
pub mod teams;
pub mod users;

pub use api_keys::{ApiKey, CreateApiKeyRequest, CreateApiKeyResponse};
pub use entities::{
    ChangelogIntegration, Entity, EntityIntegrations, EntityListItem, EntityService, LicenseInfo,
    LinkInfo, ManifestEntity, ManifestEntityResponse, ManifestRequest, OwnerInfo, RelationInfo,
};
pub use features::{CreateFeatureFlagRequest, FeatureFlag, UpdateFeatureFlagRequest};
pub use groups::{Group, GroupRoleInfo, GroupRoleRequest};
pub use integrations::{
    CreateIntegrationRequest, Integration, IntegrationStatus, IntegrationsStatus,
    UpdateIntegrationRequest,
};
pub use k8s_agents::{K8sAgent, RegisterK8sAgentRequest, RegisterK8sAgentResponse};
pub use policies::{PlatformPolicy, UpdatePolicyRequest};
pub use roles::{RoleRequest, UserRole};
pub use settings::{
    AnnouncementSettings, AppearanceSettings, TenantSettings, UpdateSettingsRequest,
};
pub use teams::{AddMemberRequest, CreateTeamRequest, Team, TeamMember, UpdateTeamRequest};
pub use users::{BundleSummary, DirectoryUser};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// RFC 3986 unreserved characters stay as they are
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single path segment or query value.
pub fn escape(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
