//! Heuristic token-type classification.
//!
//! Claim names are sorted into three disjoint signal sets (identity,
//! authorization, session). The checks run in a fixed order and the first
//! match wins: refresh, ID, access, custom session, conflicting signals,
//! and finally unknown.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{DAY, format_duration, ttl};
use crate::core::diagnostics::Diagnostic;

const IDENTITY_CLAIMS: &[&str] = &[
    "nonce",
    "auth_time",
    "acr",
    "amr",
    "azp",
    "at_hash",
    "c_hash",
    "email",
    "email_verified",
    "name",
    "given_name",
    "family_name",
    "middle_name",
    "nickname",
    "preferred_username",
    "profile",
    "picture",
    "website",
    "gender",
    "birthdate",
    "zoneinfo",
    "locale",
    "updated_at",
    "phone_number",
    "phone_number_verified",
];

const AUTHORIZATION_CLAIMS: &[&str] = &[
    "scope",
    "scp",
    "permissions",
    "client_id",
    "cid",
    "entitlements",
    "authorities",
];

const SESSION_CLAIMS: &[&str] = &["sid", "session_id", "session_state", "user_id", "uid", "device_id"];

const REFRESH_MARKER_CLAIMS: &[&str] = &["token_use", "token_type", "typ"];

const OIDC_REQUIRED_CLAIMS: &[&str] = &["iss", "sub", "aud", "exp", "iat"];

/// Lifetime above which a signal-free token is taken for a refresh token.
const REFRESH_TTL_THRESHOLD: i64 = 7 * DAY;

/// The labels a token can be classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    #[serde(rename = "ID Token")]
    IdToken,
    #[serde(rename = "Access Token")]
    AccessToken,
    #[serde(rename = "Refresh Token (JWT-based)")]
    RefreshToken,
    #[serde(rename = "Custom Session Token")]
    CustomSession,
    #[serde(rename = "Misconfigured JWT")]
    Misconfigured,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::IdToken => "ID Token",
            Self::AccessToken => "Access Token",
            Self::RefreshToken => "Refresh Token (JWT-based)",
            Self::CustomSession => "Custom Session Token",
            Self::Misconfigured => "Misconfigured JWT",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// The classifier's verdict and the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub confidence: Confidence,
    pub signals: Vec<String>,
    #[serde(rename = "warnings")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Classification {
    fn new(kind: TokenKind, confidence: Confidence, signals: Vec<String>) -> Self {
        Self {
            kind,
            confidence,
            signals,
            diagnostics: Vec::new(),
        }
    }
}

fn present<'a>(payload: &Map<String, Value>, names: &[&'a str]) -> Vec<&'a str> {
    names
        .iter()
        .copied()
        .filter(|name| payload.contains_key(*name))
        .collect()
}

fn is_access_token_typ(header: &Map<String, Value>) -> bool {
    header
        .get("typ")
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case("at+jwt") || t.eq_ignore_ascii_case("application/at+jwt"))
}

fn refresh_marker(payload: &Map<String, Value>) -> Option<&'static str> {
    REFRESH_MARKER_CLAIMS.iter().copied().find(|claim| {
        payload
            .get(*claim)
            .and_then(Value::as_str)
            .is_some_and(|v| v.eq_ignore_ascii_case("refresh"))
    })
}

/// Classify a token from its header and payload.
pub fn classify(
    header: &Map<String, Value>,
    payload: &Map<String, Value>,
    now: DateTime<Utc>,
) -> Classification {
    let identity = present(payload, IDENTITY_CLAIMS);
    let authorization = present(payload, AUTHORIZATION_CLAIMS);
    let session = present(payload, SESSION_CLAIMS);
    let at_jwt = is_access_token_typ(header);
    let lifetime = ttl::lifetime(payload, now);

    if let Some(marker) = refresh_marker(payload) {
        let mut result = Classification::new(
            TokenKind::RefreshToken,
            Confidence::High,
            vec![format!("explicit refresh marker: {marker} = \"refresh\"")],
        );
        if !payload.contains_key("exp") {
            result.diagnostics.push(
                Diagnostic::warning(
                    "Refresh token has no exp claim - refresh tokens should still expire",
                )
                .with_claim("exp"),
            );
        }
        return result;
    }

    let no_signals = identity.is_empty() && authorization.is_empty() && session.is_empty() && !at_jwt;
    if no_signals && let Some(lifetime) = lifetime.filter(|l| *l > REFRESH_TTL_THRESHOLD) {
        return Classification::new(
            TokenKind::RefreshToken,
            Confidence::Medium,
            vec![format!(
                "TTL of {} with no identity, authorization or session claims",
                format_duration(lifetime)
            )],
        );
    }

    let mut authorization_signals: Vec<String> =
        authorization.iter().map(|c| (*c).to_string()).collect();
    if at_jwt {
        authorization_signals.push("typ: at+jwt".to_string());
    }

    if !identity.is_empty() && authorization_signals.is_empty() {
        let strong = identity
            .iter()
            .any(|c| matches!(*c, "nonce" | "auth_time" | "at_hash" | "c_hash" | "acr" | "amr"));
        let mut result = Classification::new(
            TokenKind::IdToken,
            if strong { Confidence::High } else { Confidence::Medium },
            vec![format!("identity claims: {}", identity.join(", "))],
        );
        for claim in OIDC_REQUIRED_CLAIMS {
            if !payload.contains_key(*claim) {
                result.diagnostics.push(
                    Diagnostic::warning(format!(
                        "ID Token is missing required OIDC claim: {claim}"
                    ))
                    .with_claim(*claim),
                );
            }
        }
        return result;
    }

    if !authorization_signals.is_empty() && identity.is_empty() {
        let confidence = if at_jwt || authorization.iter().any(|c| matches!(*c, "scope" | "scp")) {
            Confidence::High
        } else {
            Confidence::Medium
        };
        let mut result = Classification::new(
            TokenKind::AccessToken,
            confidence,
            vec![format!(
                "authorization claims: {}",
                authorization_signals.join(", ")
            )],
        );
        if !payload.contains_key("exp") {
            result.diagnostics.push(
                Diagnostic::error("Access Token has no exp claim - access tokens must expire")
                    .with_claim("exp"),
            );
        }
        if !payload.contains_key("aud") {
            result.diagnostics.push(
                Diagnostic::warning(
                    "Access Token has no aud claim - resource servers cannot check the intended audience",
                )
                .with_claim("aud"),
            );
        }
        return result;
    }

    if !session.is_empty() && identity.is_empty() && authorization_signals.is_empty() {
        let mut result = Classification::new(
            TokenKind::CustomSession,
            Confidence::Medium,
            vec![format!("session claims: {}", session.join(", "))],
        );
        if !payload.contains_key("exp") {
            result.diagnostics.push(
                Diagnostic::warning("Session token has no exp claim - sessions should expire")
                    .with_claim("exp"),
            );
        }
        return result;
    }

    if !identity.is_empty() && !authorization_signals.is_empty() {
        let mut result = Classification::new(
            TokenKind::Misconfigured,
            Confidence::Medium,
            vec![
                format!("identity claims: {}", identity.join(", ")),
                format!(
                    "authorization claims: {}",
                    authorization_signals.join(", ")
                ),
            ],
        );
        result.diagnostics.push(Diagnostic::warning(
            "Token mixes identity and authorization claims - ID Tokens must not be used as access tokens",
        ));
        return result;
    }

    Classification::new(TokenKind::Unknown, Confidence::Low, Vec::new())
}
