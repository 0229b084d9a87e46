//! Signature verification with a tri-state outcome.
//!
//! `verified` is `Some(true)` when the signature was cryptographically
//! confirmed, `Some(false)` when it was checked and rejected (or the
//! supplied key was unusable), and `None` when it could not be checked at
//! all. Callers must not treat `None` as either pass or fail.

pub mod algorithm;
mod ecdsa;
mod hmac;
pub mod keys;
mod rsa;

use serde::Serialize;

use crate::core::base64url;
use crate::core::decoder::ParsedToken;
use crate::core::diagnostics::Diagnostic;
use algorithm::Algorithm;

/// Where the verification key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    Provided,
    Jwks,
}

/// Result of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub algorithm: Option<String>,
    pub verified: Option<bool>,
    pub reason: String,
    pub key_warnings: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_source: Option<KeySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_url: Option<String>,
}

impl VerificationOutcome {
    fn with_state(algorithm: Option<String>, verified: Option<bool>, reason: String) -> Self {
        Self {
            algorithm,
            verified,
            reason,
            key_warnings: Vec::new(),
            key_source: None,
            key_id: None,
            issuer: None,
            jwks_url: None,
        }
    }

    pub(crate) fn passed(alg: &str, reason: impl Into<String>) -> Self {
        Self::with_state(Some(alg.to_string()), Some(true), reason.into())
    }

    pub(crate) fn failed(alg: &str, reason: impl Into<String>) -> Self {
        Self::with_state(Some(alg.to_string()), Some(false), reason.into())
    }

    pub(crate) fn unknown(alg: &str, reason: impl Into<String>) -> Self {
        Self::with_state(Some(alg.to_string()), None, reason.into())
    }

    pub(crate) fn with_key_warnings(mut self, warnings: Vec<Diagnostic>) -> Self {
        self.key_warnings = warnings;
        self
    }

    /// Whether a key or secret was actually used for this outcome.
    fn attempted(&self) -> bool {
        self.verified.is_some()
    }
}

/// Secret and key supplied by the caller. Empty strings count as absent.
#[derive(Clone, Copy, Default)]
pub struct KeyMaterial<'a> {
    pub secret: Option<&'a str>,
    pub public_key: Option<&'a str>,
}

impl std::fmt::Debug for KeyMaterial<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("secret", &self.secret.map(|_| "[REDACTED]"))
            .field("public_key", &self.public_key.map(|_| "[PEM]"))
            .finish()
    }
}

/// Decode the signature segment, rejecting an empty one.
fn signature_bytes(segment: &str) -> Result<Vec<u8>, String> {
    if segment.is_empty() {
        return Err("Token has no signature (the signature segment is empty)".to_string());
    }
    base64url::decode("signature", segment)
        .map_err(|e| format!("Signature segment cannot be decoded: {e}"))
}

fn none_outcome() -> VerificationOutcome {
    VerificationOutcome::failed("none", "alg: \"none\" has no signature to verify")
}

fn unsupported_outcome(name: Option<String>) -> VerificationOutcome {
    let reason = match &name {
        Some(alg) => format!(
            "{alg} verification is not supported. Supported algorithms: {}.",
            algorithm::SUPPORTED
        ),
        None => format!(
            "Token header has no \"alg\", so the signature cannot be verified. Supported algorithms: {}.",
            algorithm::SUPPORTED
        ),
    };
    VerificationOutcome::with_state(name, None, reason)
}

/// Verify a parsed token's signature with the supplied key material.
///
/// Dispatches once on the header `alg`. The token is never modified; the
/// signature is checked over the original `header.payload` segments.
pub fn verify(token: &ParsedToken, keys: &KeyMaterial<'_>) -> VerificationOutcome {
    let algorithm = Algorithm::from_header(token.algorithm());
    let signing_input = token.signing_input();
    let signature = token.segments.signature.as_str();

    let outcome = match &algorithm {
        Algorithm::Hmac(hash) => {
            let alg = format!("HS{}", hash.bits());
            hmac::verify(&alg, *hash, &signing_input, signature, keys.secret)
        }
        Algorithm::Rsa(hash) => {
            let alg = format!("RS{}", hash.bits());
            rsa::verify(&alg, *hash, &signing_input, signature, keys.public_key)
        }
        Algorithm::Ecdsa(curve) => {
            let alg = format!("ES{}", curve.hash().bits());
            ecdsa::verify(&alg, *curve, &signing_input, signature, keys.public_key)
        }
        Algorithm::None => return none_outcome(),
        Algorithm::Unsupported(name) => return unsupported_outcome(name.clone()),
    };

    if outcome.attempted() {
        VerificationOutcome {
            key_source: Some(KeySource::Provided),
            ..outcome
        }
    } else {
        outcome
    }
}

/// Outcome when the caller opted out of verification. `alg: none` is still
/// reported as a failure.
pub fn skipped(token: &ParsedToken) -> VerificationOutcome {
    match Algorithm::from_header(token.algorithm()) {
        Algorithm::None => none_outcome(),
        other => VerificationOutcome::with_state(
            other.name(),
            None,
            "Signature verification skipped".to_string(),
        ),
    }
}
