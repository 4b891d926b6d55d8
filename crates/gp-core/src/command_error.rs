//! The error every command body returns

use gp_telemetry::Outcome;
use std::any::Any;
use std::fmt;

use crate::codes;
use crate::error::Error;

/// Tagged command failure
///
/// The dispatcher reads only the outcome, error code, exit code and the
/// silent flag; the cause is for the user's eyes.
#[derive(Debug, Default)]
pub struct CommandError {
    cause: Option<anyhow::Error>,
    message: Option<String>,
    outcome: Option<Outcome>,
    error_code: Option<String>,
    exit_code: i32,
    silent: bool,
}

impl CommandError {
    /// A failure the user can fix (bad input, missing configuration)
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            outcome: Some(Outcome::UserError),
            ..Self::default()
        }
    }

    /// An unexpected failure of the environment or infrastructure
    pub fn system(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            outcome: Some(Outcome::SystemError),
            ..Self::default()
        }
    }

    /// Wrap an error without classifying it; it counts as a system error
    pub fn from_cause(cause: impl Into<anyhow::Error>) -> Self {
        Self {
            cause: Some(cause.into()),
            ..Self::default()
        }
    }

    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Exit with this status instead of 1. Zero keeps the default.
    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Print nothing; still fail and still report
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::system(format!("unexpected failure: {detail}"))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Text shown to the user on stderr
    pub fn render(&self) -> String {
        if self.silent {
            return String::new();
        }
        match (&self.message, &self.cause) {
            (Some(message), Some(cause)) => format!("{message}: {cause:#}"),
            (Some(message), None) => message.clone(),
            (None, Some(cause)) => format!("{cause:#}"),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| &**cause as &(dyn std::error::Error + 'static))
    }
}

impl From<Error> for CommandError {
    fn from(err: Error) -> Self {
        match err {
            Error::Supervisor(_) | Error::SupervisorStatus { .. } => CommandError::from_cause(err)
                .with_outcome(Outcome::SystemError)
                .with_code(codes::SUPERVISOR_UNAVAILABLE),
            Error::InvalidDuration { .. } => CommandError::from_cause(err)
                .with_outcome(Outcome::UserError)
                .with_code(codes::TIMEOUT_INVALID_DURATION),
            Error::InvalidAssignment(_) => CommandError::from_cause(err)
                .with_outcome(Outcome::UserError)
                .with_code(codes::ENV_INVALID_ASSIGNMENT),
            other => CommandError::from_cause(other),
        }
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        CommandError::from_cause(err)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::from_cause(err)
    }
}
