//! ES256/384/512 verification.
//!
//! JOSE signatures are the fixed-width `R || S` concatenation. Some
//! libraries emit ASN.1 DER instead; that form is accepted but flagged.

use super::VerificationOutcome;
use super::algorithm::Curve;
use super::keys::{self, PublicKey};
use crate::core::diagnostics::Diagnostic;
use crate::error::KeyError;

/// How the signature bytes were laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Jose,
    Der,
}

enum Check {
    Verified { valid: bool, encoding: Encoding },
    Malformed,
}

macro_rules! verify_on {
    ($curve:ident, $label:literal, $point:expr, $signature:expr, $message:expr) => {{
        use $curve::ecdsa::signature::Verifier;
        use $curve::ecdsa::{Signature, VerifyingKey};

        let key = VerifyingKey::from_sec1_bytes($point)
            .map_err(|_| KeyError::InvalidPoint { curve: $label })?;
        let (signature, encoding) = match Signature::from_slice($signature) {
            Ok(sig) => (sig, Encoding::Jose),
            Err(_) => match Signature::from_der($signature) {
                Ok(sig) => (sig, Encoding::Der),
                Err(_) => return Ok(Check::Malformed),
            },
        };
        Ok(Check::Verified {
            valid: key.verify($message, &signature).is_ok(),
            encoding,
        })
    }};
}

fn check(curve: Curve, point: &[u8], signature: &[u8], message: &[u8]) -> Result<Check, KeyError> {
    match curve {
        Curve::P256 => verify_on!(p256, "P-256", point, signature, message),
        Curve::P384 => verify_on!(p384, "P-384", point, signature, message),
        Curve::P521 => verify_on!(p521, "P-521", point, signature, message),
    }
}

/// Verify an ECDSA signature with a PEM public key whose curve must match
/// the algorithm.
pub(super) fn verify(
    alg: &str,
    curve: Curve,
    signing_input: &str,
    signature: &str,
    public_key: Option<&str>,
) -> VerificationOutcome {
    let Some(pem) = public_key.filter(|k| !k.trim().is_empty()) else {
        return VerificationOutcome::unknown(alg, "Public key not provided — cannot verify signature");
    };

    let point = match keys::parse_public_key(pem) {
        Ok(PublicKey::Ec {
            curve: Some(key_curve),
            point,
            ..
        }) if key_curve == curve => point,
        Ok(PublicKey::Ec { curve: key_curve, .. }) => {
            let found = key_curve.map_or("an unsupported curve", Curve::name);
            let reason = format!(
                "Key curve mismatch: {alg} requires {curve} but the public key uses {found}"
            );
            return VerificationOutcome::failed(alg, reason.clone())
                .with_key_warnings(vec![Diagnostic::error(reason).with_claim("crv")]);
        }
        Ok(other) => {
            let reason = format!(
                "{alg} requires an EC public key, but the PEM contains {}",
                other.describe()
            );
            return VerificationOutcome::failed(alg, reason.clone())
                .with_key_warnings(vec![Diagnostic::error(reason)]);
        }
        Err(e) => {
            return VerificationOutcome::failed(alg, format!("Failed to parse public key: {e}"));
        }
    };

    let signature_bytes = match super::signature_bytes(signature) {
        Ok(bytes) => bytes,
        Err(reason) => return VerificationOutcome::failed(alg, reason),
    };

    let check = match check(curve, &point, &signature_bytes, signing_input.as_bytes()) {
        Ok(check) => check,
        Err(e) => {
            return VerificationOutcome::failed(alg, format!("Failed to parse public key: {e}"));
        }
    };

    match check {
        Check::Malformed => VerificationOutcome::failed(
            alg,
            format!(
                "Signature is {} bytes, expected {} bytes (R || S) for {alg}. The signature is malformed.",
                signature_bytes.len(),
                curve.signature_len()
            ),
        ),
        Check::Verified { valid, encoding } => {
            let warnings = if encoding == Encoding::Der {
                vec![Diagnostic::warning(
                    "Signature is DER-encoded rather than the JOSE R || S format (not JOSE-compliant). Many verifiers will reject it.",
                )]
            } else {
                Vec::new()
            };
            let outcome = if valid {
                VerificationOutcome::passed(
                    alg,
                    format!(
                        "{alg} ({} with {curve} curve) signature matches token contents",
                        curve.hash().label()
                    ),
                )
            } else {
                VerificationOutcome::failed(
                    alg,
                    "Signature does not match. The public key does not match the private key used to sign, or the token has been tampered with.",
                )
            };
            outcome.with_key_warnings(warnings)
        }
    }
}
