//! Hands finished events to a detached copy of the CLI
//!
//! The parent never waits for network I/O: it re-executes itself as
//! `<exe> send-analytics --data <json>` with all standard streams detached and
//! forgets about the child.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::TelemetryConfig;
use crate::events::FinishedEvent;

/// Name of the hidden subcommand that performs delivery
pub const SEND_ANALYTICS_COMMAND: &str = "send-analytics";

/// Something that takes ownership of finished events.
///
/// Implementations must not block and must not fail the caller.
pub trait Forward {
    fn forward(&self, event: FinishedEvent);
}

/// Forwards events by spawning a detached delivery process
#[derive(Debug, Clone)]
pub struct ProcessForwarder {
    config: TelemetryConfig,
    program: Option<PathBuf>,
}

impl ProcessForwarder {
    /// Forward through the currently running executable
    pub fn new(config: TelemetryConfig) -> Self {
        let program = match std::env::current_exe() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("cannot resolve current executable: {e}");
                None
            }
        };
        Self { config, program }
    }

    /// Forward through a specific program instead of the current executable
    pub fn with_program(config: TelemetryConfig, program: impl Into<PathBuf>) -> Self {
        Self {
            config,
            program: Some(program.into()),
        }
    }

    fn spawn(&self, payload: &str) -> std::io::Result<()> {
        let Some(program) = &self.program else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "current executable unknown",
            ));
        };

        let mut cmd = Command::new(program);
        cmd.arg(SEND_ANALYTICS_COMMAND)
            .arg("--data")
            .arg(payload)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group: a Ctrl-C aimed at the parent must not reach the child
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        // Dropping the handle neither waits for nor kills the child
        let child = cmd.spawn()?;
        tracing::debug!(pid = child.id(), "spawned analytics delivery");
        drop(child);
        Ok(())
    }
}

impl Forward for ProcessForwarder {
    fn forward(&self, event: FinishedEvent) {
        if event.usage().command.is_empty() || !self.config.should_forward() {
            return;
        }

        let payload = match event.into_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("could not serialize analytics event: {e}");
                return;
            }
        };

        if self.config.debug {
            // In debug mode, print instead of sending
            eprintln!("📊 Telemetry event (debug mode, not sent): {payload}");
            return;
        }

        if let Err(e) = self.spawn(&payload) {
            tracing::debug!("could not start analytics delivery: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AnalyticsEvent, Outcome};

    fn event(command: &[&str]) -> FinishedEvent {
        AnalyticsEvent::new()
            .start(command.iter().map(|c| c.to_string()).collect(), Vec::new())
            .finish(Outcome::Success, "")
    }

    fn enabled() -> TelemetryConfig {
        TelemetryConfig {
            enabled: true,
            debug: false,
        }
    }

    #[test]
    fn test_missing_program_does_not_panic() {
        let forwarder = ProcessForwarder::with_program(enabled(), "/nonexistent/gp-binary");
        forwarder.forward(event(&["version"]));
    }

    #[test]
    fn test_debug_mode_does_not_spawn() {
        let config = TelemetryConfig {
            enabled: true,
            debug: true,
        };
        let forwarder = ProcessForwarder::with_program(config, "/nonexistent/gp-binary");
        forwarder.forward(event(&["version"]));
    }

    #[cfg(unix)]
    mod spawn {
        use super::*;
        use serial_test::serial;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;
        use std::time::{Duration, Instant};
        use tempfile::TempDir;

        /// A stand-in executable that records its arguments
        fn recorder(dir: &Path) -> PathBuf {
            let script = dir.join("fake-gp");
            let args = dir.join("args.txt");
            let out = args.display();
            let body = format!(
                "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"{out}.tmp\"\nmv \"{out}.tmp\" \"{out}\"\n"
            );
            fs::write(&script, body).unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
            script
        }

        fn wait_for(path: &Path) -> Option<String> {
            let deadline = Instant::now() + Duration::from_secs(5);
            while Instant::now() < deadline {
                if let Ok(content) = fs::read_to_string(path) {
                    return Some(content);
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            None
        }

        #[test]
        #[serial]
        fn test_spawns_send_analytics_with_payload() {
            let dir = TempDir::new().unwrap();
            let forwarder = ProcessForwarder::with_program(enabled(), recorder(dir.path()));

            forwarder.forward(event(&["timeout", "set"]));

            let args = wait_for(&dir.path().join("args.txt")).expect("child did not run");
            let args: Vec<&str> = args.lines().collect();
            assert_eq!(args[0], SEND_ANALYTICS_COMMAND);
            assert_eq!(args[1], "--data");
            let usage = crate::events::CommandUsage::from_payload(args[2]).unwrap();
            assert_eq!(usage.command, vec!["timeout".to_string(), "set".to_string()]);
            assert_eq!(usage.outcome, Some(Outcome::Success));
        }

        #[test]
        #[serial]
        fn test_empty_command_is_not_forwarded() {
            let dir = TempDir::new().unwrap();
            let forwarder = ProcessForwarder::with_program(enabled(), recorder(dir.path()));

            forwarder.forward(event(&[]));

            std::thread::sleep(Duration::from_millis(300));
            assert!(!dir.path().join("args.txt").exists());
        }

        #[test]
        #[serial]
        fn test_disabled_config_is_not_forwarded() {
            let dir = TempDir::new().unwrap();
            let config = TelemetryConfig {
                enabled: false,
                debug: false,
            };
            let forwarder = ProcessForwarder::with_program(config, recorder(dir.path()));

            forwarder.forward(event(&["version"]));

            std::thread::sleep(Duration::from_millis(300));
            assert!(!dir.path().join("args.txt").exists());
        }
    }
}
