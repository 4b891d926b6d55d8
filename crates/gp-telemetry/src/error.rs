//! Telemetry error types

use thiserror::Error;

/// Failures while delivering a usage event
///
/// None of these ever reach the user; they end up in the delivery
/// subprocess's log.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("analytics request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analytics sink rejected event with status {0}")]
    Status(u16),

    #[error("delivery timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("workspace identity unavailable: {0}")]
    Identity(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
