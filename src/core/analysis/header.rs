//! JOSE header security checks.

use serde_json::{Map, Value};

use super::classifier::TokenKind;
use crate::core::diagnostics::Diagnostic;

/// Headers larger than this are unusual and slow every request.
const MAX_HEADER_BYTES: usize = 512;

/// Header parameters registered by RFC 7515.
const REGISTERED_PARAMS: &[&str] = &[
    "alg", "jku", "jwk", "kid", "x5u", "x5c", "x5t", "x5t#S256", "typ", "cty", "crit",
];

/// Parameters that point the verifier at attacker-chosen key material.
const REMOTE_KEY_PARAMS: &[&str] = &["jku", "x5u", "jwk"];

const STANDARD_TYPES: &[&str] = &["JWT", "at+jwt", "application/at+jwt", "JOSE"];

fn is_asymmetric(alg: &str) -> bool {
    ["RS", "ES", "PS"].iter().any(|p| alg.starts_with(p)) || alg == "EdDSA"
}

/// Check the header for insecure or suspicious parameters.
pub fn validate(header: &Map<String, Value>, header_json: &str, kind: TokenKind) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let alg = header.get("alg").and_then(Value::as_str);

    match alg {
        None => diagnostics.push(
            Diagnostic::error("Missing \"alg\" header - JWT algorithm must be specified")
                .with_claim("alg"),
        ),
        Some(a) if a.eq_ignore_ascii_case("none") => diagnostics.push(
            Diagnostic::error(
                "CRITICAL SECURITY VULNERABILITY: \"alg\": \"none\" means the token is unsigned and can be forged by anyone. Always sign JWTs.",
            )
            .with_claim("alg"),
        ),
        Some(a) if a.starts_with("HS") => match kind {
            TokenKind::IdToken => diagnostics.push(
                Diagnostic::warning(format!(
                    "{a} with a shared secret is not recommended for ID Tokens. Use RS256 or ES256 instead."
                ))
                .with_claim("alg"),
            ),
            TokenKind::AccessToken => diagnostics.push(
                Diagnostic::info(format!(
                    "{a} requires every resource server to hold the signing secret. Consider RS256 or ES256 for access tokens."
                ))
                .with_claim("alg"),
            ),
            _ => {}
        },
        Some(_) => {}
    }

    match header.get("typ").and_then(Value::as_str) {
        None => diagnostics.push(
            Diagnostic::info("Missing \"typ\" header. Consider adding \"typ\": \"JWT\" for clarity.")
                .with_claim("typ"),
        ),
        Some(typ) if !STANDARD_TYPES.iter().any(|t| t.eq_ignore_ascii_case(typ)) => diagnostics
            .push(
                Diagnostic::warning(format!(
                    "Non-standard \"typ\": \"{typ}\". Usually \"JWT\" or \"at+jwt\"."
                ))
                .with_claim("typ"),
            ),
        Some(_) => {}
    }

    if alg.is_some_and(is_asymmetric) && !header.contains_key("kid") {
        diagnostics.push(
            Diagnostic::warning(
                "Missing \"kid\" (key ID) header for an asymmetric algorithm - verifiers cannot select the right key after rotation.",
            )
            .with_claim("kid"),
        );
    }

    for param in REMOTE_KEY_PARAMS {
        if header.contains_key(*param) {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "\"{param}\" header points to key material chosen by the token author. Never trust it without an allow-list."
                ))
                .with_claim(*param),
            );
        }
    }

    if let Some(crit) = header.get("crit") {
        let extensions = crit
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        diagnostics.push(
            Diagnostic::warning(format!(
                "\"crit\" lists extensions this decoder does not understand ({extensions}); a compliant verifier must reject the token."
            ))
            .with_claim("crit"),
        );
    }

    for key in header.keys() {
        if !REGISTERED_PARAMS.contains(&key.as_str()) {
            diagnostics.push(
                Diagnostic::info(format!("Non-standard header field: \"{key}\"")).with_claim(key.clone()),
            );
        }
    }

    if header_json.len() > MAX_HEADER_BYTES {
        diagnostics.push(Diagnostic::info(format!(
            "Header is {} bytes, larger than the usual {MAX_HEADER_BYTES} bytes",
            header_json.len()
        )));
    }

    diagnostics
}
