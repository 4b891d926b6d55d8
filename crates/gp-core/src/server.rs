//! Minimal client for the workspace-management server
//!
//! Speaks JSON-RPC 2.0 over HTTP with a token issued by the supervisor. Only
//! the calls the CLI makes are implemented.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::duration::whole_minutes;
use crate::env::UserEnvVar;
use crate::error::{Error, Result};
use crate::supervisor::{SupervisorClient, WorkspaceInfo};

/// Server error code for operations that need a paid plan
pub const PLAN_PROFESSIONAL_REQUIRED: i64 = 450;
/// The snapshot being waited for does not exist
pub const SNAPSHOT_NOT_FOUND: i64 = 404;
/// Taking the snapshot failed on the server
pub const SNAPSHOT_FAILED: i64 = 630;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetWorkspaceTimeoutResult {
    pub reset_timeout_on_workspaces: Vec<String>,
    pub human_readable_duration: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

pub struct ServerClient {
    http: Client,
    endpoint: String,
    token: String,
    next_id: AtomicU64,
}

impl ServerClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Server)?;

        Ok(Self {
            http,
            endpoint: http_endpoint(&endpoint.into()),
            token: token.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Obtain a token for `scopes` from the supervisor and connect to the
    /// server named in the workspace info
    pub async fn connect(
        supervisor: &SupervisorClient,
        info: &WorkspaceInfo,
        scopes: &[String],
    ) -> Result<Self> {
        if info.gitpod_api.host.is_empty() {
            return Err(Error::MissingWorkspaceInfo("gitpod api host"));
        }
        if info.gitpod_api.endpoint.is_empty() {
            return Err(Error::MissingWorkspaceInfo("gitpod api endpoint"));
        }

        let token = supervisor
            .token("gitpod", &info.gitpod_api.host, scopes)
            .await?;
        Self::new(&info.gitpod_api.endpoint, token)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn set_workspace_timeout(
        &self,
        workspace_id: &str,
        duration: Duration,
    ) -> Result<SetWorkspaceTimeoutResult> {
        let minutes = format!("{}m", whole_minutes(duration));
        self.call("setWorkspaceTimeout", json!([workspace_id, minutes]))
            .await
    }

    /// Variables of the current user visible to this workspace
    pub async fn get_env_vars(&self) -> Result<Vec<UserEnvVar>> {
        self.call("getEnvVars", json!([])).await
    }

    pub async fn set_env_var(&self, var: &UserEnvVar) -> Result<()> {
        self.call::<Value>("setEnvVar", json!([var])).await?;
        Ok(())
    }

    pub async fn delete_env_var(&self, var: &UserEnvVar) -> Result<()> {
        self.call::<Value>("deleteEnvVar", json!([var])).await?;
        Ok(())
    }

    /// Start a snapshot without waiting for it; returns the snapshot id
    pub async fn take_snapshot(&self, workspace_id: &str) -> Result<String> {
        self.call(
            "takeSnapshot",
            json!([{ "workspaceId": workspace_id, "dontWait": true }]),
        )
        .await
    }

    pub async fn wait_for_snapshot(&self, snapshot_id: &str) -> Result<()> {
        self.call::<Value>("waitForSnapshot", json!([snapshot_id])).await?;
        Ok(())
    }

    /// Take a snapshot and poll until it is available.
    ///
    /// Only [`SNAPSHOT_NOT_FOUND`] and [`SNAPSHOT_FAILED`] end the wait early;
    /// any other failure is retried after `poll`.
    pub async fn snapshot(&self, workspace_id: &str, poll: Duration) -> Result<String> {
        let snapshot_id = self.take_snapshot(workspace_id).await?;
        loop {
            match self.wait_for_snapshot(&snapshot_id).await {
                Ok(()) => return Ok(snapshot_id),
                Err(err @ Error::Rpc { code, .. })
                    if code == SNAPSHOT_NOT_FOUND || code == SNAPSHOT_FAILED =>
                {
                    return Err(err)
                }
                Err(err) => {
                    tracing::debug!(snapshot_id = %snapshot_id, "snapshot not ready: {err}");
                    tokio::time::sleep(poll).await;
                }
            }
        }
    }

    async fn call<T>(&self, method: &str, params: Value) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(Error::Server)?;

        let body = response.bytes().await.map_err(Error::Server)?;
        let response: RpcResponse<T> = serde_json::from_slice(&body)?;

        if let Some(error) = response.error {
            return Err(Error::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or_default())
    }
}

/// The server advertises a websocket endpoint; JSON-RPC over HTTP uses the
/// matching http(s) URL
fn http_endpoint(endpoint: &str) -> String {
    if let Some(rest) = endpoint.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = endpoint.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        endpoint.to_string()
    }
}
