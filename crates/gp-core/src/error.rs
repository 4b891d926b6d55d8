//! Error types for gp-core

use thiserror::Error;

/// Failures of the workspace collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// The supervisor could not be reached
    #[error("could not reach supervisor")]
    Supervisor(#[source] reqwest::Error),

    /// The supervisor answered with an error status
    #[error("supervisor returned status {status} for {path}")]
    SupervisorStatus { status: u16, path: String },

    /// The workspace server could not be reached
    #[error("could not reach workspace server")]
    Server(#[source] reqwest::Error),

    /// The workspace server answered with a JSON-RPC error
    #[error("{message} (code {code})")]
    Rpc { code: i64, message: String },

    /// A duration argument was not `<n>m`, `<n>h` or `<n>d`
    #[error("invalid duration \"{input}\": must be in the format of <n>m (minutes), <n>h (hours), or <n>d (days)")]
    InvalidDuration { input: String },

    /// An environment variable argument was not `name=value`
    #[error("{0}")]
    InvalidAssignment(String),

    /// The operation did not finish in time
    #[error("operation timed out after {0:?}")]
    TimedOut(std::time::Duration),

    /// Workspace info lacks a field the operation needs
    #[error("workspace info is missing {0}")]
    MissingWorkspaceInfo(&'static str),

    /// A response body could not be decoded
    #[error("invalid JSON response")]
    Json(#[from] serde_json::Error),

    /// The async runtime could not be started
    #[error("could not start async runtime")]
    Runtime(#[source] std::io::Error),
}

/// Result type alias for gp-core
pub type Result<T> = std::result::Result<T, Error>;
