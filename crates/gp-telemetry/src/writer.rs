//! Analytics sink
//!
//! The writer is chosen from the environment, mirroring how the workspace
//! images are configured:
//!
//! - `GITPOD_ANALYTICS_WRITER=segment` posts to the Segment HTTP tracking API
//! - `GITPOD_ANALYTICS_WRITER=log` writes the message to the log
//! - anything else discards it

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;
use std::time::Duration;

use crate::error::{Result, TelemetryError};

/// Event name every command usage is tracked under
pub const COMMAND_EVENT_NAME: &str = "gp_command";

/// Default Segment tracking endpoint
pub const DEFAULT_SEGMENT_ENDPOINT: &str = "https://api.segment.io/v1/track";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A single `track` call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMessage {
    pub user_id: String,
    pub event: String,
    pub properties: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl TrackMessage {
    pub fn new(
        user_id: impl Into<String>,
        event: impl Into<String>,
        properties: Map<String, Value>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            event: event.into(),
            properties,
            timestamp: Utc::now(),
        }
    }
}

/// Destination for tracked events
#[derive(Debug, Clone)]
pub enum AnalyticsWriter {
    Noop,
    Log,
    Segment(SegmentWriter),
}

impl AnalyticsWriter {
    /// Build the writer described by the `GITPOD_ANALYTICS_*` variables
    pub fn from_env() -> Self {
        match env::var("GITPOD_ANALYTICS_WRITER").as_deref() {
            Ok("segment") => {
                let key = env::var("GITPOD_ANALYTICS_SEGMENT_KEY").unwrap_or_default();
                let endpoint = env::var("GITPOD_ANALYTICS_SEGMENT_ENDPOINT")
                    .ok()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| DEFAULT_SEGMENT_ENDPOINT.to_string());
                AnalyticsWriter::Segment(SegmentWriter::new(endpoint, key))
            }
            Ok("log") => AnalyticsWriter::Log,
            _ => AnalyticsWriter::Noop,
        }
    }

    /// Deliver one message. Not retried.
    pub async fn track(&self, message: TrackMessage) -> Result<()> {
        match self {
            AnalyticsWriter::Noop => Ok(()),
            AnalyticsWriter::Log => {
                let properties = Value::Object(message.properties);
                tracing::info!(
                    user_id = %message.user_id,
                    event = %message.event,
                    properties = %properties,
                    "analytics track"
                );
                Ok(())
            }
            AnalyticsWriter::Segment(writer) => writer.track(&message).await,
        }
    }
}

/// Posts track calls to a Segment-compatible endpoint
#[derive(Debug, Clone)]
pub struct SegmentWriter {
    client: Client,
    endpoint: String,
    key: String,
}

impl SegmentWriter {
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
            key: key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn track(&self, message: &TrackMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.key, None::<&str>)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::Status(status.as_u16()));
        }

        tracing::debug!(endpoint = %self.endpoint, "analytics event delivered");
        Ok(())
    }
}
