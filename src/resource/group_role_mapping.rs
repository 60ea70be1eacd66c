//! Directory group to role mapping, identified as `group:role`

use crate::resource::{non_empty_opt, split_import_id};
use anyhow::{Context, Result, bail};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{Client, GroupRoleRequest};

const DEFAULT_PROVIDER: &str = "default";

/// Persisted attributes of `shoehorn_group_role_mapping`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRoleMappingModel {
    pub id: Option<String>,
    pub group_name: String,
    pub role_name: String,
    pub provider: Option<String>,
    pub description: Option<String>,
}

impl GroupRoleMappingModel {
    fn mapping_id(&self) -> String {
        format!("{}:{}", self.group_name, self.role_name)
    }
}

/// `shoehorn_group_role_mapping`
pub struct GroupRoleMappingResource;

impl Resource<Client> for GroupRoleMappingResource {
    type Model = GroupRoleMappingModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_group_role_mapping"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["group_name", "role_name"]
    }

    fn create(&self, client: &Client, plan: &GroupRoleMappingModel) -> Result<GroupRoleMappingModel> {
        let (group, role) = (&plan.group_name, &plan.role_name);
        let provider = non_empty_opt(plan.provider.as_ref()).unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
        let description = plan.description.clone().unwrap_or_default();

        let request = GroupRoleRequest {
            role_name: role.clone(),
            provider: Some(provider.clone()),
            description: Some(description.clone()),
        };
        client
            .assign_group_role(group, &request)
            .with_context(|| format!("Could not assign role {role:?} to group {group:?}"))?;

        Ok(GroupRoleMappingModel {
            id: Some(plan.mapping_id()),
            provider: Some(provider),
            description: Some(description),
            ..plan.clone()
        })
    }

    fn read(
        &self,
        client: &Client,
        state: &GroupRoleMappingModel,
    ) -> Result<ReadOutcome<GroupRoleMappingModel>> {
        let group = &state.group_name;
        let roles = client
            .get_group_roles(group)
            .with_context(|| format!("Could not get roles for group {group:?}"))?;

        let Some(mapped) = roles.into_iter().find(|r| r.role_name == state.role_name) else {
            log::debug!("Role {} is no longer mapped to group {group}", state.role_name);
            return Ok(ReadOutcome::Gone);
        };

        let mut fresh = state.clone();
        fresh.id = Some(state.mapping_id());
        if let Some(provider) = non_empty_opt(mapped.provider.as_ref()) {
            fresh.provider = Some(provider);
        }
        Ok(ReadOutcome::Present(fresh))
    }

    fn update(
        &self,
        _client: &Client,
        _plan: &GroupRoleMappingModel,
        _prior: &GroupRoleMappingModel,
    ) -> Result<GroupRoleMappingModel> {
        bail!("Update Not Supported: Group role mappings cannot be updated. Changes require replacement.")
    }

    fn delete(&self, client: &Client, state: &GroupRoleMappingModel) -> Result<()> {
        let (group, role) = (&state.group_name, &state.role_name);
        client
            .remove_group_role(group, role)
            .with_context(|| format!("Could not remove role {role:?} from group {group:?}"))
    }

    fn import_seed(&self, id: &str) -> Result<GroupRoleMappingModel> {
        let (group_name, role_name) = split_import_id(id, "group_name:role_name")?;
        Ok(GroupRoleMappingModel {
            id: Some(id.to_string()),
            group_name,
            role_name,
            ..Default::default()
        })
    }
}
