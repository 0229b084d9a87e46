//! Token lifetime analysis against per-type expectations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::classifier::TokenKind;
use super::{DAY, HOUR, format_duration, numeric_claim};
use crate::core::diagnostics::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TtlStatus {
    Missing,
    Expired,
    Normal,
    Warning,
    Suspicious,
    Questionable,
}

/// How the lifetime was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TtlBasis {
    #[serde(rename = "exp - iat")]
    IssuedAt,
    #[serde(rename = "exp - now")]
    Now,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtlAnalysis {
    pub ttl_seconds: Option<i64>,
    pub basis: Option<TtlBasis>,
    pub status: TtlStatus,
    pub expected: &'static str,
    pub message: String,
    #[serde(rename = "warnings")]
    pub diagnostics: Vec<Diagnostic>,
}

/// `exp - iat` when `iat` is present, else `exp - now`. Saturates at the
/// `i64` bounds, so the sign is always right for extreme claims.
pub fn lifetime(payload: &Map<String, Value>, now: DateTime<Utc>) -> Option<i64> {
    measure(payload, now).map(|(ttl, _)| ttl)
}

fn measure(payload: &Map<String, Value>, now: DateTime<Utc>) -> Option<(i64, TtlBasis)> {
    let exp = numeric_claim(payload, "exp")?;
    match numeric_claim(payload, "iat") {
        Some(iat) => Some((exp.saturating_sub(iat), TtlBasis::IssuedAt)),
        None => Some((exp.saturating_sub(now.timestamp()), TtlBasis::Now)),
    }
}

fn expectation(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::RefreshToken => "1 to 90 days",
        TokenKind::CustomSession => "at most 7 days",
        _ => "at most 24 hours",
    }
}

fn grade(kind: TokenKind, ttl: i64) -> TtlStatus {
    match kind {
        TokenKind::IdToken | TokenKind::AccessToken => match ttl {
            t if t <= 24 * HOUR => TtlStatus::Normal,
            t if t <= 7 * DAY => TtlStatus::Warning,
            _ => TtlStatus::Suspicious,
        },
        TokenKind::RefreshToken => match ttl {
            t if t < DAY => TtlStatus::Questionable,
            t if t <= 90 * DAY => TtlStatus::Normal,
            t if t <= 365 * DAY => TtlStatus::Warning,
            _ => TtlStatus::Suspicious,
        },
        TokenKind::CustomSession => match ttl {
            t if t <= 7 * DAY => TtlStatus::Normal,
            t if t <= 30 * DAY => TtlStatus::Warning,
            _ => TtlStatus::Suspicious,
        },
        TokenKind::Misconfigured | TokenKind::Unknown => {
            if ttl <= 24 * HOUR {
                TtlStatus::Normal
            } else {
                TtlStatus::Questionable
            }
        }
    }
}

/// Grade the token's lifetime for its classified type.
pub fn analyze(payload: &Map<String, Value>, kind: TokenKind, now: DateTime<Utc>) -> TtlAnalysis {
    let expected = expectation(kind);

    let Some((ttl, basis)) = measure(payload, now) else {
        return TtlAnalysis {
            ttl_seconds: None,
            basis: None,
            status: TtlStatus::Missing,
            expected,
            message: "No numeric exp claim - lifetime cannot be determined".to_string(),
            diagnostics: Vec::new(),
        };
    };

    if ttl <= 0 {
        let message = match basis {
            TtlBasis::IssuedAt => "exp is not after iat - token has no valid lifetime",
            TtlBasis::Now => "Token is already expired",
        };
        return TtlAnalysis {
            ttl_seconds: Some(ttl),
            basis: Some(basis),
            status: TtlStatus::Expired,
            expected,
            message: message.to_string(),
            diagnostics: Vec::new(),
        };
    }

    let status = grade(kind, ttl);
    let duration = format_duration(ttl);
    let (message, diagnostics) = match status {
        TtlStatus::Warning | TtlStatus::Suspicious => {
            let severity = if status == TtlStatus::Suspicious {
                "far longer"
            } else {
                "longer"
            };
            let message =
                format!("{kind} lifetime of {duration} is {severity} than expected ({expected})");
            let diagnostic = Diagnostic::warning(message.clone()).with_claim("exp");
            (message, vec![diagnostic])
        }
        TtlStatus::Questionable => {
            let message = format!("{kind} lifetime of {duration} is unusual (expected {expected})");
            let diagnostic = Diagnostic::info(message.clone()).with_claim("exp");
            (message, vec![diagnostic])
        }
        _ => (
            format!("{kind} lifetime of {duration} is within the expected range ({expected})"),
            Vec::new(),
        ),
    };

    TtlAnalysis {
        ttl_seconds: Some(ttl),
        basis: Some(basis),
        status,
        expected,
        message,
        diagnostics,
    }
}
