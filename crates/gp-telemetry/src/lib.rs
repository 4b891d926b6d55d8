//! # gp telemetry
//!
//! Command usage analytics for the `gp` workspace CLI.
//!
//! ## How an event travels
//!
//! 1. The dispatcher creates an [`AnalyticsEvent`] when the CLI starts, fills in
//!    the resolved command and the flags the user set, and closes it with the
//!    classified outcome.
//! 2. The [`ProcessForwarder`] serializes the closed event and re-executes the
//!    CLI as `gp send-analytics --data <json>`, detached, without waiting.
//! 3. The hidden subcommand uses [`TelemetryClient`] to add the workspace
//!    identity and hand the event to the [`AnalyticsWriter`].
//!
//! Reporting is best effort: nothing in this crate can fail or slow down the
//! command the user ran.
//!
//! ## What is collected
//!
//! - Command path and the names of flags set on the command line (no values)
//! - Outcome, error code and duration
//! - Workspace and instance id (added by the delivery process)
//!
//! ## Opt-Out
//!
//! ```bash
//! # Via environment variable
//! export GP_TELEMETRY_DISABLED=1
//!
//! # Via config file (~/.gp/config.toml)
//! [telemetry]
//! enabled = false
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod forwarder;
pub mod writer;

pub use client::{TelemetryClient, WorkspaceIdentity, DELIVERY_TIMEOUT};
pub use config::{load_telemetry_config, TelemetryConfig};
pub use error::TelemetryError;
pub use events::{AnalyticsEvent, CommandUsage, FinishedEvent, Outcome, RunningEvent};
pub use forwarder::{Forward, ProcessForwarder, SEND_ANALYTICS_COMMAND};
pub use writer::{AnalyticsWriter, SegmentWriter, TrackMessage, COMMAND_EVENT_NAME};
