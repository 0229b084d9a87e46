//! RS256/384/512 verification (RSASSA-PKCS1-v1_5).

use rsa::RsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::sha2::{Sha256, Sha384, Sha512};
use rsa::signature::Verifier;

use super::VerificationOutcome;
use super::algorithm::HashAlg;
use super::keys::{self, PublicKey};
use crate::core::diagnostics::Diagnostic;

fn verify_pkcs1v15(
    hash: HashAlg,
    key: RsaPublicKey,
    message: &[u8],
    signature: &Signature,
) -> bool {
    match hash {
        HashAlg::Sha256 => VerifyingKey::<Sha256>::new(key).verify(message, signature).is_ok(),
        HashAlg::Sha384 => VerifyingKey::<Sha384>::new(key).verify(message, signature).is_ok(),
        HashAlg::Sha512 => VerifyingKey::<Sha512>::new(key).verify(message, signature).is_ok(),
    }
}

/// Verify an RSA signature with a PEM public key.
///
/// Key-strength warnings are attached whenever the key parses, whatever
/// the verification result.
pub(super) fn verify(
    alg: &str,
    hash: HashAlg,
    signing_input: &str,
    signature: &str,
    public_key: Option<&str>,
) -> VerificationOutcome {
    let Some(pem) = public_key.filter(|k| !k.trim().is_empty()) else {
        return VerificationOutcome::unknown(alg, "Public key not provided — cannot verify signature");
    };

    let key = match keys::parse_public_key(pem) {
        Ok(PublicKey::Rsa(key)) => key,
        Ok(other) => {
            let reason = format!("{alg} requires an RSA public key, but the PEM contains {}", other.describe());
            return VerificationOutcome::failed(alg, reason.clone())
                .with_key_warnings(vec![Diagnostic::error(reason)]);
        }
        Err(e) => {
            return VerificationOutcome::failed(alg, format!("Failed to parse public key: {e}"));
        }
    };
    let warnings = keys::rsa_key_warnings(&key);

    let signature_bytes = match super::signature_bytes(signature) {
        Ok(bytes) => bytes,
        Err(reason) => return VerificationOutcome::failed(alg, reason).with_key_warnings(warnings),
    };
    let Ok(signature) = Signature::try_from(signature_bytes.as_slice()) else {
        return VerificationOutcome::failed(alg, "Signature is not a valid RSA signature encoding")
            .with_key_warnings(warnings);
    };

    let outcome = if verify_pkcs1v15(hash, key, signing_input.as_bytes(), &signature) {
        VerificationOutcome::passed(
            alg,
            format!("{alg} (RSA-SHA{}) signature matches token contents", hash.bits()),
        )
    } else {
        VerificationOutcome::failed(
            alg,
            "Signature does not match. The public key does not match the private key used to sign, or the token has been tampered with.",
        )
    };
    outcome.with_key_warnings(warnings)
}
