//! Client for the in-workspace supervisor
//!
//! Uses the supervisor's HTTP gateway for workspace metadata and token
//! issuance.

use gp_telemetry::WorkspaceIdentity;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Where the supervisor listens unless `SUPERVISOR_ADDR` says otherwise
pub const DEFAULT_SUPERVISOR_ADDR: &str = "localhost:22999";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Workspace metadata as reported by the supervisor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceInfo {
    pub workspace_id: String,
    pub instance_id: String,
    pub owner_id: String,
    pub checkout_location: String,
    pub workspace_url: String,
    pub gitpod_host: String,
    pub gitpod_api: GitpodApi,
    pub repository: Option<Repository>,
}

impl WorkspaceInfo {
    /// `owner/name` of the repository the workspace was started from
    pub fn repository_pattern(&self) -> Result<String> {
        let repository = self
            .repository
            .as_ref()
            .ok_or(Error::MissingWorkspaceInfo("repository"))?;
        if repository.owner.is_empty() {
            return Err(Error::MissingWorkspaceInfo("repository owner"));
        }
        if repository.name.is_empty() {
            return Err(Error::MissingWorkspaceInfo("repository name"));
        }
        Ok(format!("{}/{}", repository.owner, repository.name))
    }
}

/// Location of the workspace-management server API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitpodApi {
    pub endpoint: String,
    pub host: String,
}

impl From<&WorkspaceInfo> for WorkspaceIdentity {
    fn from(info: &WorkspaceInfo) -> Self {
        WorkspaceIdentity {
            workspace_id: info.workspace_id.clone(),
            instance_id: info.instance_id.clone(),
            owner_id: info.owner_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// HTTP client for the supervisor API
#[derive(Debug, Clone)]
pub struct SupervisorClient {
    http: Client,
    base_url: String,
}

impl SupervisorClient {
    /// Connect to `SUPERVISOR_ADDR`, or the default address
    pub fn from_env() -> Result<Self> {
        let addr = env::var("SUPERVISOR_ADDR")
            .ok()
            .filter(|addr| !addr.is_empty())
            .unwrap_or_else(|| DEFAULT_SUPERVISOR_ADDR.to_string());
        Self::new(&addr)
    }

    /// Connect to `host:port` (or a full `http://` URL)
    pub fn new(addr: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Supervisor)?;

        let base_url = if addr.starts_with("http://") || addr.starts_with("https://") {
            addr.trim_end_matches('/').to_string()
        } else {
            format!("http://{addr}")
        };

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Metadata of the workspace this CLI runs in
    pub async fn workspace_info(&self) -> Result<WorkspaceInfo> {
        self.get("/_supervisor/v1/info/workspace", &[]).await
    }

    /// The identity usage events are attributed to
    pub async fn identity(&self) -> Result<WorkspaceIdentity> {
        let info = self.workspace_info().await?;
        Ok(WorkspaceIdentity::from(&info))
    }

    /// Ask the supervisor for a token of `kind` valid for `host` and `scopes`
    pub async fn token(&self, kind: &str, host: &str, scopes: &[String]) -> Result<String> {
        let query: Vec<(&str, &str)> = scopes.iter().map(|s| ("scope", s.as_str())).collect();
        let path = format!("/_supervisor/v1/token/{kind}/{host}");
        let response: TokenResponse = self.get(&path, &query).await?;
        Ok(response.token)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(Error::Supervisor)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SupervisorStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.bytes().await.map_err(Error::Supervisor)?;
        Ok(serde_json::from_slice(&body)?)
    }
}
