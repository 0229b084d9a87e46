//! Time-travel evaluation of temporal claims.
//!
//! Parses time expressions (relative like "+7d" or absolute like RFC 3339)
//! into the clock that timestamp, lint and TTL checks run against.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CliError;

static RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-])(\d+)([smhdwy])$").expect("relative time pattern is valid"));

/// A parsed time target for time-travel evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTarget {
    /// The resolved absolute timestamp.
    pub timestamp: DateTime<Utc>,
    /// The original expression provided by the user.
    pub expression: String,
}

fn unit_seconds(unit: &str) -> i64 {
    match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 7 * 86_400,
        // "y"
        _ => 365 * 86_400,
    }
}

/// Parse a time-travel expression into an absolute timestamp.
///
/// Supports the following formats:
/// - `now`
/// - Relative to `now`: `+7d`, `-1h`, `+30m`, `+2w`, `+1y`, `-5s`
/// - RFC 3339: `2024-01-15T14:30:00Z`
/// - Calendar date (midnight UTC): `2024-01-15`
/// - Unix epoch seconds: `1705312200`
///
/// # Errors
///
/// Returns [`CliError::InvalidTimeExpression`] if the expression matches
/// no format or lands outside the representable range.
pub fn parse_time_expression(expression: &str, now: DateTime<Utc>) -> Result<TimeTarget, CliError> {
    let trimmed = expression.trim();
    let invalid = |reason: &str| CliError::InvalidTimeExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let timestamp = if trimmed.eq_ignore_ascii_case("now") {
        now
    } else if let Some(caps) = RELATIVE.captures(trimmed) {
        let amount: i64 = caps[2].parse().map_err(|_| invalid("offset is too large"))?;
        let seconds = amount
            .checked_mul(unit_seconds(&caps[3]))
            .ok_or_else(|| invalid("offset is too large"))?;
        let delta = TimeDelta::try_seconds(seconds).ok_or_else(|| invalid("offset is too large"))?;
        let shifted = if &caps[1] == "+" {
            now.checked_add_signed(delta)
        } else {
            now.checked_sub_signed(delta)
        };
        shifted.ok_or_else(|| invalid("offset leaves the supported date range"))?
    } else if trimmed.bytes().all(|b| b.is_ascii_digit()) && !trimmed.is_empty() {
        let seconds: i64 = trimmed.parse().map_err(|_| invalid("epoch is too large"))?;
        DateTime::from_timestamp(seconds, 0).ok_or_else(|| invalid("epoch is out of range"))?
    } else if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        parsed.with_timezone(&Utc)
    } else if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)
            .ok_or_else(|| invalid("date is out of range"))?
            .and_utc()
    } else {
        return Err(invalid(
            "expected now, a relative offset (+7d, -1h, +30m, +2w, +1y, -5s), an RFC 3339 timestamp, a date (YYYY-MM-DD) or Unix epoch seconds",
        ));
    };

    Ok(TimeTarget {
        timestamp,
        expression: trimmed.to_string(),
    })
}
