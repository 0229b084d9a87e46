//! Registered-claim presence checks and lints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::HOUR;
use crate::core::diagnostics::{Diagnostic, Level};

/// Allowed clock skew before an `iat` counts as issued in the future.
const IAT_FUTURE_LEEWAY: i64 = 60;

const RECOMMENDED_CLAIMS: [(&str, &str, Level); 7] = [
    ("iss", "Issuer", Level::Warning),
    ("aud", "Audience", Level::Warning),
    ("exp", "Expiration", Level::Warning),
    ("iat", "Issued At", Level::Warning),
    ("nbf", "Not Before", Level::Info),
    ("jti", "JWT ID", Level::Info),
    ("sub", "Subject", Level::Info),
];

/// Which recommended claims the payload carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimPresence {
    pub present: Vec<String>,
}

/// Report which recommended claims are present and flag the missing ones.
pub fn check_presence(payload: &Map<String, Value>) -> (ClaimPresence, Vec<Diagnostic>) {
    let mut presence = ClaimPresence::default();
    let mut diagnostics = Vec::new();

    for (claim, name, level) in RECOMMENDED_CLAIMS {
        if payload.contains_key(claim) {
            presence.present.push(claim.to_string());
        } else {
            diagnostics.push(
                Diagnostic::new(level, format!("Missing recommended claim: {name} ({claim})"))
                    .with_claim(claim),
            );
        }
    }

    (presence, diagnostics)
}

/// Lint the registered claims for type errors and impossible lifetimes.
pub fn lint(payload: &Map<String, Value>, now: DateTime<Utc>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for claim in ["exp", "iat", "nbf"] {
        if let Some(value) = payload.get(claim)
            && !value.is_number()
        {
            diagnostics.push(
                Diagnostic::error(format!(
                    "{claim} should be a number (UNIX timestamp), got {}",
                    type_name(value)
                ))
                .with_claim(claim),
            );
        }
    }

    let exp = super::numeric_claim(payload, "exp");
    let iat = super::numeric_claim(payload, "iat");
    let nbf = super::numeric_claim(payload, "nbf");
    let now = now.timestamp();

    if let (Some(exp), Some(iat)) = (exp, iat) {
        if exp < iat {
            diagnostics.push(
                Diagnostic::error(
                    "exp (expiration) is earlier than iat (issued at) - token is always invalid",
                )
                .with_claim("exp"),
            );
        }
        let hours = exp.saturating_sub(iat) as f64 / HOUR as f64;
        if hours > 24.0 {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "Long TTL: {hours:.1} hours (recommended: at most 24 hours)"
                ))
                .with_claim("exp"),
            );
        }
    }

    if let (Some(nbf), Some(exp)) = (nbf, exp)
        && nbf > exp
    {
        diagnostics.push(
            Diagnostic::error(
                "nbf (not before) is later than exp (expiration) - token is always invalid",
            )
            .with_claim("nbf"),
        );
    }

    if let Some(iat) = iat
        && iat > now.saturating_add(IAT_FUTURE_LEEWAY)
    {
        diagnostics.push(
            Diagnostic::warning(
                "iat (issued at) is in the future - token issued time is ahead of the current time",
            )
            .with_claim("iat"),
        );
    }

    match exp {
        Some(exp) if exp <= now => diagnostics.push(
            Diagnostic::warning("exp (expiration) is in the past - token is expired")
                .with_claim("exp"),
        ),
        None if !payload.contains_key("exp") => diagnostics.push(
            Diagnostic::error("No expiration (exp) claim - token never expires").with_claim("exp"),
        ),
        _ => {}
    }

    if let Some(iss) = payload.get("iss")
        && !iss.is_string()
    {
        diagnostics.push(Diagnostic::warning("iss (issuer) should be a string").with_claim("iss"));
    }

    if let Some(aud) = payload.get("aud")
        && !is_audience(aud)
    {
        diagnostics.push(
            Diagnostic::warning("aud (audience) should be a string or array of strings")
                .with_claim("aud"),
        );
    }

    if let Some(sub) = payload.get("sub")
        && !sub.as_str().is_some_and(|s| !s.trim().is_empty())
    {
        diagnostics.push(
            Diagnostic::warning(
                "sub (subject) should be a non-empty string - this identifies the token bearer",
            )
            .with_claim("sub"),
        );
    }

    diagnostics
}

fn is_audience(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Array(items) => items.iter().all(Value::is_string),
        _ => false,
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
