//! HS256/384/512 verification by recomputing the MAC.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use super::VerificationOutcome;
use super::algorithm::HashAlg;
use crate::core::base64url;

fn compute_mac(hash: HashAlg, secret: &[u8], message: &[u8]) -> Result<Vec<u8>, String> {
    macro_rules! mac {
        ($digest:ty) => {{
            let mut mac = Hmac::<$digest>::new_from_slice(secret).map_err(|e| e.to_string())?;
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }};
    }

    Ok(match hash {
        HashAlg::Sha256 => mac!(Sha256),
        HashAlg::Sha384 => mac!(Sha384),
        HashAlg::Sha512 => mac!(Sha512),
    })
}

/// Verify an HMAC signature over `signing_input`.
///
/// The recomputed MAC is base64url-encoded and compared in constant time
/// against the signature segment as it appears in the token.
pub(super) fn verify(
    alg: &str,
    hash: HashAlg,
    signing_input: &str,
    signature: &str,
    secret: Option<&str>,
) -> VerificationOutcome {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return VerificationOutcome::unknown(alg, "Secret not provided — cannot verify signature");
    };

    let signature_bytes = match super::signature_bytes(signature) {
        Ok(bytes) => bytes,
        Err(reason) => return VerificationOutcome::failed(alg, reason),
    };
    if signature_bytes.len() != hash.output_len() {
        return VerificationOutcome::failed(
            alg,
            format!(
                "Signature is {} bytes but {alg} signatures are {} bytes. The signature is malformed or truncated.",
                signature_bytes.len(),
                hash.output_len()
            ),
        );
    }

    let expected = match compute_mac(hash, secret.as_bytes(), signing_input.as_bytes()) {
        Ok(mac) => base64url::encode(&mac),
        Err(e) => return VerificationOutcome::failed(alg, format!("Verification error: {e}")),
    };

    if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
        VerificationOutcome::passed(
            alg,
            format!(
                "Recomputed HMAC matches token signature ({alg}, {})",
                hash.label()
            ),
        )
    } else {
        VerificationOutcome::failed(
            alg,
            "Signature does not match. The secret is incorrect or the token has been tampered with.",
        )
    }
}
