//! Claim and header analyzers.
//!
//! Every analyzer is a pure function of the parsed header and payload
//! (plus the evaluation clock) and reports its findings as
//! [`Diagnostic`](crate::core::diagnostics::Diagnostic)s. None of them can
//! fail: odd input produces diagnostics, never errors.

pub mod claims;
pub mod classifier;
pub mod header;
pub mod sensitive;
pub mod timestamps;
pub mod ttl;

use serde_json::{Map, Value};

/// Seconds in one hour.
pub(crate) const HOUR: i64 = 3_600;
/// Seconds in one day.
pub(crate) const DAY: i64 = 24 * HOUR;

/// A numeric claim as whole seconds, or `None` if absent or not a number.
pub(crate) fn numeric_claim(payload: &Map<String, Value>, name: &str) -> Option<i64> {
    payload
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .map(|v| v.floor() as i64)
}

/// Human-readable duration such as `3 days` or `1 hour`.
pub(crate) fn format_duration(seconds: i64) -> String {
    let seconds = seconds.unsigned_abs();
    let (value, unit) = if seconds >= 365 * DAY as u64 {
        (seconds / (365 * DAY as u64), "year")
    } else if seconds >= DAY as u64 {
        (seconds / DAY as u64, "day")
    } else if seconds >= HOUR as u64 {
        (seconds / HOUR as u64, "hour")
    } else if seconds >= 60 {
        (seconds / 60, "minute")
    } else {
        (seconds, "second")
    };
    format!("{value} {unit}{}", if value == 1 { "" } else { "s" })
}
