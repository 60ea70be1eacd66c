//! Kubernetes agents under `/api/v1/k8s/agents`.

use crate::api::escape;
use crate::error::Result;
use crate::types::JsonMap;
use crate::{Client, decode};
use serde::{Deserialize, Serialize};
use serde_json::json;

const AGENTS_PATH: &str = "/api/v1/k8s/agents";

/// A registered cluster agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct K8sAgent {
    pub id: i64,
    pub cluster_id: String,
    pub name: String,
    pub description: Option<String>,
    pub token_prefix: String,
    pub status: String,
    pub online_status: Option<String>,
    pub created_at: Option<String>,
    pub expires_at: Option<String>,
    pub last_heartbeat: Option<String>,
}

impl K8sAgent {
    pub fn is_revoked(&self) -> bool {
        self.status == "revoked"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterK8sAgentRequest {
    pub cluster_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Token lifetime in days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonMap>,
}

/// Registration result. `token` is only ever returned here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterK8sAgentResponse {
    pub token: String,
    pub token_prefix: String,
    pub cluster_id: String,
    pub name: String,
    pub expires_at: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AgentList {
    agents: Vec<K8sAgent>,
    #[allow(dead_code)]
    total: u64,
}

impl Client {
    pub fn list_k8s_agents(&self) -> Result<Vec<K8sAgent>> {
        let body = self.get(AGENTS_PATH)?;
        let list: AgentList = decode(&body, "k8s agents response")?;
        Ok(list.agents)
    }

    /// Get an agent by cluster id.
    pub fn get_k8s_agent(&self, cluster_id: &str) -> Result<K8sAgent> {
        let body = self.get(&format!("{AGENTS_PATH}/{}", escape(cluster_id)))?;
        decode(&body, "k8s agent response")
    }

    pub fn register_k8s_agent(
        &self,
        request: &RegisterK8sAgentRequest,
    ) -> Result<RegisterK8sAgentResponse> {
        let body = self.post(&format!("{AGENTS_PATH}/register"), request)?;
        decode(&body, "register k8s agent response")
    }

    /// Revoke an agent's token.
    pub fn revoke_k8s_agent(&self, cluster_id: &str) -> Result<()> {
        let path = format!("{AGENTS_PATH}/{}/revoke", escape(cluster_id));
        self.post(&path, &json!({}))?;
        Ok(())
    }

    pub fn delete_k8s_agent(&self, cluster_id: &str) -> Result<()> {
        self.delete(&format!("{AGENTS_PATH}/{}", escape(cluster_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock_client;
    use crate::transport::{Method, MockReply};

    #[test]
    fn test_register_camel_case_body() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            201,
            &json!({"token": "tok_secret", "tokenPrefix": "tok_", "clusterId": "prod-eu", "name": "prod"}),
        ));

        let resp = client
            .register_k8s_agent(&RegisterK8sAgentRequest {
                cluster_id: "prod-eu".to_string(),
                name: "prod".to_string(),
                expires_in: Some(90),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(resp.token, "tok_secret");

        let req = mock.last_request().unwrap();
        assert_eq!(req.path(), "/api/v1/k8s/agents/register");
        assert_eq!(
            req.json_body().unwrap(),
            json!({"clusterId": "prod-eu", "name": "prod", "expiresIn": 90})
        );
    }

    #[test]
    fn test_get_agent_by_cluster_id() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"id": 3, "clusterId": "prod-eu", "status": "revoked", "onlineStatus": "offline"}),
        ));

        let agent = client.get_k8s_agent("prod-eu").unwrap();
        assert_eq!(agent.id, 3);
        assert!(agent.is_revoked());
        assert_eq!(mock.last_request().unwrap().path(), "/api/v1/k8s/agents/prod-eu");
    }

    #[test]
    fn test_revoke_sends_empty_object_then_delete() {
        let (client, mock) = mock_client();
        mock.push(MockReply::status(200, "{}"));
        mock.push(MockReply::status(204, ""));

        client.revoke_k8s_agent("prod-eu").unwrap();
        client.delete_k8s_agent("prod-eu").unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].path(), "/api/v1/k8s/agents/prod-eu/revoke");
        assert_eq!(requests[0].json_body().unwrap(), json!({}));
        assert_eq!(requests[1].method, Method::Delete);
        assert_eq!(requests[1].path(), "/api/v1/k8s/agents/prod-eu");
    }

    #[test]
    fn test_list_agents() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"agents": [{"id": 1, "clusterId": "a"}, {"id": 2, "clusterId": "b"}], "total": 2}),
        ));
        assert_eq!(client.list_k8s_agents().unwrap().len(), 2);
    }
}
