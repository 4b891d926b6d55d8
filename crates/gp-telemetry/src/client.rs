//! Delivery side of command usage reporting
//!
//! Runs inside the hidden `send-analytics` subprocess: takes the payload the
//! parent handed over, adds the workspace identity and tracks it.

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, TelemetryError};
use crate::events::CommandUsage;
use crate::writer::{AnalyticsWriter, TrackMessage, COMMAND_EVENT_NAME};

/// Upper bound for identity lookup plus delivery
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Who the event is attributed to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceIdentity {
    pub workspace_id: String,
    pub instance_id: String,
    pub owner_id: String,
}

/// Sends usage events to the configured analytics writer
pub struct TelemetryClient {
    writer: AnalyticsWriter,
    timeout: Duration,
}

impl TelemetryClient {
    pub fn new(writer: AnalyticsWriter) -> Self {
        Self {
            writer,
            timeout: DELIVERY_TIMEOUT,
        }
    }

    /// Client for the writer configured in the environment
    pub fn from_env() -> Self {
        Self::new(AnalyticsWriter::from_env())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse a payload, resolve the workspace identity and track the event.
    ///
    /// Identity lookup and delivery share one deadline.
    pub async fn deliver<F>(&self, payload: &str, identity: F) -> Result<()>
    where
        F: Future<Output = Result<WorkspaceIdentity>>,
    {
        let usage = CommandUsage::from_payload(payload)?;

        let work = async {
            let identity = identity.await?;
            self.track(usage, &identity).await
        };

        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| TelemetryError::Timeout(self.timeout))?
    }

    /// Enrich the event with the workspace identity and send it
    pub async fn track(&self, mut usage: CommandUsage, identity: &WorkspaceIdentity) -> Result<()> {
        usage.workspace_id = identity.workspace_id.clone();
        usage.instance_id = identity.instance_id.clone();

        let properties = usage.to_properties()?;
        self.writer
            .track(TrackMessage::new(
                identity.owner_id.clone(),
                COMMAND_EVENT_NAME,
                properties,
            ))
            .await
    }
}
