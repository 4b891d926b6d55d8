//! Persistent user environment variables
//!
//! Variables are stored by the server per user and repository pattern and are
//! injected into the next workspace started for a matching repository.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A variable as the server stores it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserEnvVar {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub value: String,
    pub repository_pattern: String, // "owner/name", may contain "*"
}

impl UserEnvVar {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        repository_pattern: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            value: value.into(),
            repository_pattern: repository_pattern.into(),
        }
    }

    /// `NAME=value`, or `export NAME="value"` for eval'ing in a shell
    pub fn render(&self, export: bool) -> String {
        let value = self.value.replace('"', "\\\"");
        if export {
            format!("export {}=\"{}\"", self.name, value)
        } else {
            format!("{}={}", self.name, value)
        }
    }
}

/// A `name=value` argument, not yet bound to a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

impl Assignment {
    pub fn for_repository(self, repository_pattern: &str) -> UserEnvVar {
        UserEnvVar::new(self.name, self.value, repository_pattern)
    }
}

/// Parse `name=value` arguments.
///
/// The name is trimmed; the value keeps inner whitespace, loses surrounding
/// quotes and has `\ ` unescaped. Empty values are rejected: unsetting is a
/// separate operation.
pub fn parse_assignments(args: &[String]) -> Result<Vec<Assignment>> {
    args.iter().map(|arg| parse_assignment(arg)).collect()
}

fn parse_assignment(arg: &str) -> Result<Assignment> {
    let invalid = |message: String| Error::InvalidAssignment(message);

    if arg.is_empty() {
        return Err(invalid("empty string (correct format is key=value)".to_string()));
    }
    let Some((name, value)) = arg.split_once('=') else {
        return Err(invalid(format!(
            "{arg} has no equal character (correct format is {arg}=some_value)"
        )));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("variable must have a name".to_string()));
    }

    let value = value
        .trim_matches('"')
        .trim_matches('\'')
        .replace("\\ ", " ");
    if value.is_empty() {
        return Err(invalid(
            "variable must have a value; use -u to unset a variable".to_string(),
        ));
    }

    Ok(Assignment {
        name: name.to_string(),
        value,
    })
}
