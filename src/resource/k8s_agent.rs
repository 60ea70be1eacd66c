//! Kubernetes agent registration, addressed by cluster id

use crate::reconcile;
use crate::resource::{non_empty, non_empty_opt};
use anyhow::{Context, Result, bail};
use declarative::{ReadOutcome, Resource};
use serde::{Deserialize, Serialize};
use shoehornkit::{Client, RegisterK8sAgentRequest};

/// Persisted attributes of `shoehorn_k8s_agent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct K8sAgentModel {
    pub id: Option<String>,
    pub cluster_id: String,
    pub name: String,
    pub description: Option<String>,
    pub expires_in_days: Option<i64>,
    /// Registration token, only returned by the register call
    pub token: Option<String>,
    pub token_prefix: Option<String>,
    pub status: Option<String>,
    pub expires_at: Option<String>,
    pub created_at: Option<String>,
}

/// `shoehorn_k8s_agent`
pub struct K8sAgentResource;

impl Resource<Client> for K8sAgentResource {
    type Model = K8sAgentModel;

    fn type_name(&self) -> &'static str {
        "shoehorn_k8s_agent"
    }

    fn replace_fields(&self) -> &'static [&'static str] {
        &["cluster_id", "name", "description", "expires_in_days"]
    }

    fn create(&self, client: &Client, plan: &K8sAgentModel) -> Result<K8sAgentModel> {
        let request = RegisterK8sAgentRequest {
            cluster_id: plan.cluster_id.clone(),
            name: plan.name.clone(),
            description: plan.description.clone(),
            expires_in: plan.expires_in_days,
            metadata: None,
        };
        let registered = client
            .register_k8s_agent(&request)
            .context("Could not register K8s agent")?;
        log::info!("Registered K8s agent for cluster {}", registered.cluster_id);

        let mut state = plan.clone();
        state.id = Some(registered.cluster_id);
        state.token = Some(registered.token);
        state.token_prefix = Some(registered.token_prefix);
        state.status = Some("active".to_string());
        if let Some(at) = non_empty_opt(registered.expires_at.as_ref()) {
            state.expires_at = Some(at);
        }
        if let Some(at) = non_empty_opt(registered.created_at.as_ref()) {
            state.created_at = Some(at);
        }
        Ok(state)
    }

    fn read(&self, client: &Client, state: &K8sAgentModel) -> Result<ReadOutcome<K8sAgentModel>> {
        let agent = match client.get_k8s_agent(&state.cluster_id) {
            Ok(agent) => agent,
            Err(e) => {
                if !e.is_not_found() {
                    log::warn!("Dropping K8s agent {} after failed read: {e}", state.cluster_id);
                }
                return Ok(ReadOutcome::Gone);
            }
        };
        if agent.is_revoked() {
            log::debug!("K8s agent {} was revoked", state.cluster_id);
            return Ok(ReadOutcome::Gone);
        }

        let mut fresh = state.clone();
        fresh.id = Some(agent.cluster_id);
        fresh.name = agent.name;
        fresh.status = Some(agent.status);
        if let Some(prefix) = non_empty(&agent.token_prefix) {
            fresh.token_prefix = Some(prefix);
        }
        if let Some(at) = non_empty_opt(agent.expires_at.as_ref()) {
            fresh.expires_at = Some(at);
        }
        if let Some(at) = non_empty_opt(agent.created_at.as_ref()) {
            fresh.created_at = Some(at);
        }
        fresh.token = reconcile::carry_forward("token", state.token.as_ref(), None);
        Ok(ReadOutcome::Present(fresh))
    }

    fn update(&self, _client: &Client, _plan: &K8sAgentModel, _prior: &K8sAgentModel) -> Result<K8sAgentModel> {
        bail!(
            "Update Not Supported: K8s agent registrations cannot be updated. Changes require creating a new agent."
        )
    }

    fn delete(&self, client: &Client, state: &K8sAgentModel) -> Result<()> {
        let cluster = &state.cluster_id;
        if let Err(e) = client.revoke_k8s_agent(cluster) {
            log::debug!("Revoking K8s agent {cluster} failed, deleting anyway: {e}");
        }
        client
            .delete_k8s_agent(cluster)
            .with_context(|| format!("Could not delete K8s agent {cluster}"))
    }
}
