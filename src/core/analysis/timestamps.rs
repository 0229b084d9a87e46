//! Human renderings of the `exp`, `iat` and `nbf` claims.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{DAY, HOUR};

/// Where a timestamp sits relative to the evaluation clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampStatus {
    /// The instant has not arrived yet.
    Future,
    /// An `exp` that has passed.
    Expired,
    /// An `iat` or `nbf` that has passed.
    Active,
}

/// One interpreted timestamp claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampInfo {
    pub timestamp: i64,
    pub utc: String,
    pub local: String,
    pub status: TimestampStatus,
    pub relative: String,
}

/// Interpretations of the three temporal claims. A claim that is absent,
/// non-numeric, negative or out of range is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timestamps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<TimestampInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<TimestampInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<TimestampInfo>,
}

/// Interpret every temporal claim present in the payload.
pub fn interpret(payload: &Map<String, Value>, now: DateTime<Utc>) -> Timestamps {
    Timestamps {
        exp: interpret_claim(payload, "exp", now),
        iat: interpret_claim(payload, "iat", now),
        nbf: interpret_claim(payload, "nbf", now),
    }
}

fn interpret_claim(
    payload: &Map<String, Value>,
    claim: &str,
    now: DateTime<Utc>,
) -> Option<TimestampInfo> {
    let seconds = super::numeric_claim(payload, claim).filter(|s| *s >= 0)?;
    let instant = DateTime::<Utc>::from_timestamp(seconds, 0)?;

    let delta = seconds.saturating_sub(now.timestamp());
    let status = if delta > 0 {
        TimestampStatus::Future
    } else if claim == "exp" {
        TimestampStatus::Expired
    } else {
        TimestampStatus::Active
    };

    Some(TimestampInfo {
        timestamp: seconds,
        utc: instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        local: instant
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %:z")
            .to_string(),
        status,
        relative: relative_phrase(delta),
    })
}

/// "in 2 hours" / "3 days ago", rounding down to the largest whole unit.
pub fn relative_phrase(delta: i64) -> String {
    let magnitude = delta.unsigned_abs();
    let unit = |count: u64, name: &str| format!("{count} {name}{}", if count > 1 { "s" } else { "" });

    let amount = if magnitude >= DAY as u64 {
        Some(unit(magnitude / DAY as u64, "day"))
    } else if magnitude >= HOUR as u64 {
        Some(unit(magnitude / HOUR as u64, "hour"))
    } else if magnitude >= 60 {
        Some(unit(magnitude / 60, "minute"))
    } else {
        None
    };

    match (amount, delta > 0) {
        (Some(amount), true) => format!("in {amount}"),
        (Some(amount), false) => format!("{amount} ago"),
        (None, true) => "in a few seconds".to_string(),
        (None, false) => "a few seconds ago".to_string(),
    }
}
