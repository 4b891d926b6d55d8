mod cmd;
mod output;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use gp_core::{CommandError, Dispatcher};
use gp_telemetry::{
    load_telemetry_config, ProcessForwarder, TelemetryConfig, SEND_ANALYTICS_COMMAND,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gp",
    version,
    about = "Command line interface for Gitpod workspaces",
    subcommand_required = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prints the version of the CLI
    Version,
    /// Controls user-defined, persistent environment variables
    ///
    /// Without arguments, prints the variables for this repository. With
    /// `name=value` arguments, persists them for the next workspace on this
    /// repository; the current terminal session is not modified.
    #[command(after_help = "Examples:\n  gp env foo=bar\n  eval $(gp env -e)\n  gp env -u foo")]
    Env {
        /// name=value pairs to set, or names to unset with -u
        assignments: Vec<String>,
        /// Produce a script that can be eval'ed in Bash
        #[arg(short, long)]
        export: bool,
        /// Deletes/unsets persisted environment variables
        #[arg(short, long)]
        unset: bool,
    },
    /// Show information about the current workspace
    Info {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Take a snapshot of the current workspace
    Snapshot,
    /// Interact with the timeout of the current workspace
    Timeout {
        #[command(subcommand)]
        action: TimeoutAction,
    },
    /// Send anonymous statistics about executed gp commands
    #[command(name = "send-analytics", hide = true)]
    SendAnalytics {
        /// JSON encoded event data
        #[arg(long)]
        data: String,
    },
}

#[derive(Subcommand)]
enum TimeoutAction {
    /// Set timeout of current workspace
    ///
    /// Duration must be in the format of <n>m (minutes), <n>h (hours), or <n>d (days).
    /// For example, 30m, 1h, 2d, etc.
    #[command(after_help = "Example: gp timeout set 1h")]
    Set {
        /// <n>m, <n>h or <n>d
        duration: String,
    },
}

fn main() {
    init_logging();

    let config = load_telemetry_config().unwrap_or_else(|e| {
        tracing::warn!("using default telemetry config: {e:#}");
        TelemetryConfig::default()
    });

    let dispatcher = Dispatcher::new(Cli::command(), ProcessForwarder::new(config))
        .untracked(SEND_ANALYTICS_COMMAND);

    let code = dispatcher.dispatch(std::env::args_os(), |matches, _event| {
        let cli = Cli::from_arg_matches(matches).map_err(CommandError::from_cause)?;
        match cli.cmd {
            Command::Version => cmd::version::run(),
            Command::Env {
                assignments,
                export,
                unset,
            } => cmd::env::run(cmd::env::EnvArgs {
                assignments,
                export,
                unset,
            }),
            Command::Snapshot => cmd::snapshot::run(),
            Command::Info { json } => cmd::info::run(json),
            Command::Timeout { action } => match action {
                TimeoutAction::Set { duration } => cmd::timeout::set(&duration),
            },
            Command::SendAnalytics { data } => cmd::send_analytics::run(&data),
        }
    });

    std::process::exit(code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_analytics_is_hidden() {
        let cli = Cli::command();
        let hidden = cli
            .get_subcommands()
            .find(|c| c.get_name() == SEND_ANALYTICS_COMMAND)
            .unwrap();
        assert!(hidden.is_hide_set());
    }
}
