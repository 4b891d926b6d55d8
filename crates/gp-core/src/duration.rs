//! Workspace timeout durations: `<n>m`, `<n>h` or `<n>d`

use std::time::Duration;

use crate::error::{Error, Result};

/// Parse a timeout such as `30m`, `1h` or `2d`
pub fn parse_timeout(input: &str) -> Result<Duration> {
    let invalid = || Error::InvalidDuration {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let unit = trimmed.chars().last().ok_or_else(invalid)?;
    let digits = &trimmed[..trimmed.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(invalid());
    }

    let unit_secs = match unit {
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

/// Whole minutes, as the server and the CLI output express timeouts
pub fn whole_minutes(duration: Duration) -> u64 {
    duration.as_secs() / 60
}
