//! Hidden delivery entry point, started detached by the telemetry forwarder.
//!
//! Always succeeds: nothing here may surface to the user, so failures are
//! only logged.

use gp_core::{block_on, codes, CommandError, SupervisorClient};
use gp_telemetry::{TelemetryClient, TelemetryError};

pub fn run(data: &str) -> Result<(), CommandError> {
    let client = TelemetryClient::from_env();

    let delivered = block_on(client.deliver(data, async {
        let supervisor = SupervisorClient::from_env()
            .map_err(|e| TelemetryError::Identity(format!("{e:#}")))?;
        supervisor
            .identity()
            .await
            .map_err(|e| TelemetryError::Identity(format!("{e:#}")))
    }));

    match delivered {
        Ok(Ok(())) => tracing::debug!("analytics event sent"),
        Ok(Err(TelemetryError::Payload(e))) => {
            tracing::error!(
                error_code = codes::SEND_ANALYTICS_INVALID_PAYLOAD,
                "invalid analytics payload: {e}"
            )
        }
        Ok(Err(e)) => tracing::warn!("analytics event not sent: {e}"),
        Err(e) => tracing::warn!("analytics event not sent: {e:#}"),
    }

    Ok(())
}
