//! Command dispatch
//!
//! Every invocation goes through [`Dispatcher::dispatch`]:
//!
//! 1. create the usage event
//! 2. resolve the subcommand (including `gp-<name>` symlinks) and the flags set
//!    on the command line
//! 3. run the command body, turning panics into system errors
//! 4. classify the result, close the event and forward it
//! 5. print the error and hand back the exit code

use clap::parser::ValueSource;
use clap::{ArgMatches, Command};
use gp_telemetry::{AnalyticsEvent, Forward, RunningEvent};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::command_error::CommandError;
use crate::outcome::classify;

/// Binary name prefix of symlinked subcommands (`gp-version` runs `gp version`)
pub const ENTRYPOINT_PREFIX: &str = "gp-";

/// Runs commands of a clap command tree and reports their outcome
pub struct Dispatcher<F> {
    command: Command,
    forwarder: F,
    untracked: Vec<String>,
}

impl<F: Forward> Dispatcher<F> {
    pub fn new(command: Command, forwarder: F) -> Self {
        Self {
            command,
            forwarder,
            untracked: Vec::new(),
        }
    }

    /// Never report usage of this top-level subcommand
    pub fn untracked(mut self, name: impl Into<String>) -> Self {
        self.untracked.push(name.into());
        self
    }

    /// Parse `argv`, run `handler` on the result and return the exit code.
    ///
    /// Parse failures (unknown subcommand, bad usage, `--help`) are printed by
    /// clap and are not reported. Usage errors exit 1, help and version 0.
    pub fn dispatch<I, T, H>(&self, argv: I, handler: H) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        H: FnOnce(&ArgMatches, &mut RunningEvent) -> Result<(), CommandError>,
    {
        let event = AnalyticsEvent::new();
        let argv = rewrite_entrypoint(&self.command, argv.into_iter().map(Into::into).collect());

        let matches = match self.command.clone().try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(err) => {
                let _ = err.print();
                return if err.use_stderr() { 1 } else { 0 };
            }
        };

        let invocation = Invocation::resolve(&self.command, &matches);
        let tracked = invocation
            .path
            .first()
            .is_some_and(|name| !self.untracked.contains(name));
        let mut running = event.start(invocation.path, invocation.flags);

        let result = panic::catch_unwind(AssertUnwindSafe(|| handler(&matches, &mut running)))
            .unwrap_or_else(|payload| Err(CommandError::from_panic(payload)));

        let classification = classify(&result);
        tracing::debug!(
            command = ?running.command(),
            outcome = %classification.outcome,
            exit_code = classification.exit_code,
            "command finished"
        );

        let finished = running.finish(classification.outcome, classification.error_code.clone());
        if tracked {
            self.forwarder.forward(finished);
        }

        if let Err(err) = &result {
            let text = err.render();
            if !text.is_empty() {
                eprintln!("{text}");
            }
        }

        classification.exit_code
    }
}

/// Insert the subcommand named by a `gp-<name>` binary into `argv`
pub fn rewrite_entrypoint(command: &Command, mut argv: Vec<OsString>) -> Vec<OsString> {
    let entrypoint = argv
        .first()
        .and_then(|argv0| Path::new(argv0).file_name())
        .and_then(|name| name.to_str())
        .map(|name| name.strip_prefix(ENTRYPOINT_PREFIX).unwrap_or(name).to_string());

    if let Some(entrypoint) = entrypoint {
        if command
            .get_subcommands()
            .any(|sub| sub.get_name() == entrypoint)
        {
            argv.insert(1, OsString::from(entrypoint));
        }
    }
    argv
}

/// The subcommand path and the flags the user set on the command line
#[derive(Debug, Default, PartialEq, Eq)]
struct Invocation {
    path: Vec<String>,
    flags: BTreeSet<String>,
}

impl Invocation {
    fn resolve(root: &Command, root_matches: &ArgMatches) -> Self {
        let mut invocation = Invocation::default();
        let mut command = root;
        let mut matches = root_matches;

        loop {
            for arg in command.get_arguments() {
                if arg.is_positional() {
                    continue;
                }
                let id = arg.get_id().as_str();
                if matches.value_source(id) == Some(ValueSource::CommandLine) {
                    let name = arg.get_long().unwrap_or(id);
                    invocation.flags.insert(name.to_string());
                }
            }

            let Some((name, sub_matches)) = matches.subcommand() else {
                break;
            };
            invocation.path.push(name.to_string());
            match command.find_subcommand(name) {
                Some(sub) => {
                    command = sub;
                    matches = sub_matches;
                }
                None => break,
            }
        }

        invocation
    }
}
