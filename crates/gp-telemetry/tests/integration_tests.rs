//! Integration tests for the telemetry pipeline

use gp_telemetry::{
    AnalyticsEvent, AnalyticsWriter, CommandUsage, Outcome, TelemetryClient, TelemetryError,
    WorkspaceIdentity,
};
use std::time::Duration;

fn identity() -> WorkspaceIdentity {
    WorkspaceIdentity {
        workspace_id: "amber-lobster-x1".to_string(),
        instance_id: "0b6f8e3a".to_string(),
        owner_id: "user-1".to_string(),
    }
}

#[tokio::test]
async fn test_finished_event_payload_is_deliverable() {
    let event = AnalyticsEvent::new()
        .start(vec!["info".to_string()], vec!["json".to_string()])
        .finish(Outcome::SystemError, "supervisor_unavailable");
    let payload = event.into_payload().unwrap();

    let client = TelemetryClient::new(AnalyticsWriter::Log);
    client
        .deliver(&payload, async { Ok::<_, TelemetryError>(identity()) })
        .await
        .unwrap();
}

#[test]
fn test_payload_round_trip_keeps_populated_fields() {
    let mut running = AnalyticsEvent::new().start(
        vec!["timeout".to_string(), "set".to_string()],
        vec!["workspace".to_string()],
    );
    running.record_image_build_duration(Duration::from_millis(42));
    let event = running.finish(Outcome::UserError, "timeout_invalid_duration");
    let before = event.usage().clone();

    let after = CommandUsage::from_payload(&event.into_payload().unwrap()).unwrap();

    assert_eq!(after, before);
    assert!(after.workspace_id.is_empty());
    assert!(after.instance_id.is_empty());
}

#[tokio::test]
async fn test_invalid_payload_is_reported_not_panicked() {
    let client = TelemetryClient::new(AnalyticsWriter::Noop);
    let result = client
        .deliver("{\"command\": 42}", async {
            Ok::<_, TelemetryError>(identity())
        })
        .await;
    assert!(matches!(result, Err(TelemetryError::Payload(_))));
}
