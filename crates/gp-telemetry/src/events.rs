//! Command usage event data structures
//!
//! One [`CommandUsage`] record is produced per CLI invocation. Its lifecycle is
//! modelled as three owned types so that an event can only move forward:
//!
//! ```text
//! AnalyticsEvent (created) -> RunningEvent -> FinishedEvent -> JSON payload
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

/// Coarse classification of how a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    UserError,
    SystemError,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::UserError => "user_error",
            Outcome::SystemError => "system_error",
        }
    }

    /// Error code reported when a failing command does not supply its own
    pub fn default_error_code(&self) -> &'static str {
        match self {
            Outcome::Success => "",
            Outcome::UserError => "user_error",
            Outcome::SystemError => "system_error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire format of a command usage event
///
/// Empty fields are left out of the JSON and missing fields read back as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandUsage {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>, // ["timeout", "set"]
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>, // long names of flags set on the command line

    #[serde(skip_serializing_if = "is_zero")]
    pub duration: u64, // milliseconds
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_code: String,

    // Only known to the delivery subprocess
    #[serde(skip_serializing_if = "String::is_empty")]
    pub workspace_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_id: String,

    #[serde(skip_serializing_if = "is_zero_i64")]
    pub timestamp: i64, // epoch milliseconds
    #[serde(skip_serializing_if = "is_zero")]
    pub image_build_duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

impl CommandUsage {
    /// Parse a payload produced by [`FinishedEvent::into_payload`]
    pub fn from_payload(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Flatten into the property map sent to the analytics sink
    pub fn to_properties(&self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

/// A freshly created event: timestamped, nothing else known yet
#[derive(Debug)]
pub struct AnalyticsEvent {
    usage: CommandUsage,
    started: Instant,
}

impl AnalyticsEvent {
    pub fn new() -> Self {
        Self {
            usage: CommandUsage {
                timestamp: Utc::now().timestamp_millis(),
                ..CommandUsage::default()
            },
            started: Instant::now(),
        }
    }

    /// Attach the resolved command path and the flags the user set
    pub fn start<I>(self, command: Vec<String>, flags: I) -> RunningEvent
    where
        I: IntoIterator<Item = String>,
    {
        let mut usage = self.usage;
        usage.command = command;
        usage.flags = flags.into_iter().collect();
        RunningEvent {
            usage,
            started: self.started,
        }
    }
}

impl Default for AnalyticsEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// An event whose command is executing
#[derive(Debug)]
pub struct RunningEvent {
    usage: CommandUsage,
    started: Instant,
}

impl RunningEvent {
    pub fn command(&self) -> &[String] {
        &self.usage.command
    }

    pub fn flags(&self) -> &BTreeSet<String> {
        &self.usage.flags
    }

    /// Record how long an image build took, for commands that build images
    pub fn record_image_build_duration(&mut self, elapsed: Duration) {
        self.usage.image_build_duration = duration_ms(elapsed);
    }

    /// Close the event with the classified outcome
    pub fn finish(self, outcome: Outcome, error_code: impl Into<String>) -> FinishedEvent {
        let mut usage = self.usage;
        usage.duration = duration_ms(self.started.elapsed());
        usage.outcome = Some(outcome);
        usage.error_code = error_code.into();
        FinishedEvent { usage }
    }
}

/// A closed event; read-only until it is turned into its payload
#[derive(Debug)]
pub struct FinishedEvent {
    usage: CommandUsage,
}

impl FinishedEvent {
    pub fn usage(&self) -> &CommandUsage {
        &self.usage
    }

    /// Serialize the event. Consumes it, so it happens once.
    pub fn into_payload(self) -> serde_json::Result<String> {
        serde_json::to_string(&self.usage)
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(outcome: Outcome, code: &str) -> FinishedEvent {
        AnalyticsEvent::new()
            .start(
                vec!["timeout".to_string(), "set".to_string()],
                vec!["json".to_string()],
            )
            .finish(outcome, code)
    }

    #[test]
    fn test_new_event_is_timestamped_and_empty() {
        let before = Utc::now().timestamp_millis();
        let event = AnalyticsEvent::new();
        assert!(event.usage.timestamp >= before);
        assert!(event.usage.command.is_empty());
        assert!(event.usage.flags.is_empty());
        assert!(event.usage.outcome.is_none());
    }

    #[test]
    fn test_start_records_command_and_flags() {
        let running = AnalyticsEvent::new().start(
            vec!["info".to_string()],
            vec!["json".to_string(), "json".to_string()],
        );
        assert_eq!(running.command(), ["info".to_string()]);
        assert_eq!(running.flags().len(), 1);
    }

    #[test]
    fn test_finish_sets_outcome_and_duration() {
        let running = AnalyticsEvent::new().start(vec!["version".to_string()], Vec::new());
        std::thread::sleep(Duration::from_millis(5));
        let event = running.finish(Outcome::UserError, "user_error");

        assert!(event.usage().duration >= 5);
        assert_eq!(event.usage().outcome, Some(Outcome::UserError));
        assert_eq!(event.usage().error_code, "user_error");
    }

    #[test]
    fn test_payload_uses_camel_case_and_omits_empty_fields() {
        let payload = finished(Outcome::SystemError, "system_error")
            .into_payload()
            .unwrap();
        let value: Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(value["command"], serde_json::json!(["timeout", "set"]));
        assert_eq!(value["flags"], serde_json::json!(["json"]));
        assert_eq!(value["errorCode"], "system_error");
        assert_eq!(value["outcome"], "system_error");
        assert!(value.get("workspaceId").is_none());
        assert!(value.get("instanceId").is_none());
        assert!(value.get("imageBuildDuration").is_none());
    }

    #[test]
    fn test_payload_reads_back_unchanged() {
        let mut running = AnalyticsEvent::new().start(
            vec!["rebuild".to_string()],
            vec!["workspace".to_string(), "debug".to_string()],
        );
        running.record_image_build_duration(Duration::from_millis(1500));
        let event = running.finish(Outcome::UserError, "rebuild_image_build_failed");
        let expected = event.usage().clone();

        let parsed = CommandUsage::from_payload(&event.into_payload().unwrap()).unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.image_build_duration, 1500);
    }

    #[test]
    fn test_success_payload_has_no_error_code() {
        let payload = finished(Outcome::Success, "").into_payload().unwrap();
        assert!(!payload.contains("errorCode"));
        assert!(payload.contains("\"outcome\":\"success\""));
    }

    #[test]
    fn test_missing_fields_default_when_parsing() {
        let usage = CommandUsage::from_payload(r#"{"command":["version"]}"#).unwrap();
        assert_eq!(usage.command, vec!["version".to_string()]);
        assert!(usage.flags.is_empty());
        assert_eq!(usage.duration, 0);
        assert!(usage.outcome.is_none());
    }

    #[test]
    fn test_properties_are_flattened() {
        let mut usage = finished(Outcome::Success, "").usage().clone();
        usage.workspace_id = "ws-123".to_string();

        let properties = usage.to_properties().unwrap();
        assert_eq!(properties["workspaceId"], "ws-123");
        assert_eq!(properties["outcome"], "success");
        assert!(properties.contains_key("timestamp"));
    }

    #[test]
    fn test_default_error_codes() {
        assert_eq!(Outcome::Success.default_error_code(), "");
        assert_eq!(Outcome::UserError.default_error_code(), "user_error");
        assert_eq!(Outcome::SystemError.default_error_code(), "system_error");
        assert_eq!(Outcome::UserError.to_string(), "user_error");
    }
}
