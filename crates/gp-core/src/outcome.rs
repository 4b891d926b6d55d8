//! Outcome classification
//!
//! The same triple drives the process exit status and the usage event, so
//! classification must stay a pure function of the command result.

use gp_telemetry::Outcome;

use crate::command_error::CommandError;

/// What a finished command amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub outcome: Outcome,
    pub error_code: String,
    pub exit_code: i32,
}

/// Classify the result of a command body
///
/// 1. No error is `(success, "", 0)`.
/// 2. The error's outcome is used when set, otherwise `system_error`.
/// 3. The error's code is used when set, otherwise the outcome's default code.
/// 4. The error's exit code is used when nonzero, otherwise 1.
pub fn classify(result: &Result<(), CommandError>) -> Classification {
    let err = match result {
        Ok(()) => {
            return Classification {
                outcome: Outcome::Success,
                error_code: String::new(),
                exit_code: 0,
            }
        }
        Err(err) => err,
    };

    let outcome = err.outcome().unwrap_or(Outcome::SystemError);
    let error_code = err
        .error_code()
        .map(str::to_string)
        .unwrap_or_else(|| outcome.default_error_code().to_string());
    let exit_code = match err.exit_code() {
        0 => 1,
        code => code,
    };

    Classification {
        outcome,
        error_code,
        exit_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;

    #[test]
    fn test_success() {
        let c = classify(&Ok(()));
        assert_eq!(c.outcome, Outcome::Success);
        assert_eq!(c.error_code, "");
        assert_eq!(c.exit_code, 0);
    }

    #[test]
    fn test_user_error_without_code_gets_default() {
        let c = classify(&Err(CommandError::user("missing .gitpod.yml")));
        assert_eq!(c.outcome, Outcome::UserError);
        assert_eq!(c.error_code, codes::USER_ERROR);
        assert_eq!(c.exit_code, 1);
    }

    #[test]
    fn test_unclassified_error_is_system_error() {
        let c = classify(&Err(CommandError::from_cause(anyhow::anyhow!("io"))));
        assert_eq!(c.outcome, Outcome::SystemError);
        assert_eq!(c.error_code, codes::SYSTEM_ERROR);
        assert_eq!(c.exit_code, 1);
    }

    #[test]
    fn test_explicit_code_and_exit_code_win() {
        let err = CommandError::user("image build failed")
            .with_code("rebuild_image_build_failed")
            .with_exit_code(3);
        let c = classify(&Err(err));
        assert_eq!(c.outcome, Outcome::UserError);
        assert_eq!(c.error_code, "rebuild_image_build_failed");
        assert_eq!(c.exit_code, 3);
    }

    #[test]
    fn test_silent_error_still_fails() {
        let c = classify(&Err(CommandError::user("quiet").silent()));
        assert_eq!(c.exit_code, 1);
        assert_eq!(c.outcome, Outcome::UserError);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let result = Err(CommandError::system("down").with_code(codes::SUPERVISOR_UNAVAILABLE));
        assert_eq!(classify(&result), classify(&result));
    }
}
