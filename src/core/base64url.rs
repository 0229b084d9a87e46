//! URL-safe base64 codec for JWT segments.
//!
//! Decoding is strict about the alphabet (`A-Z a-z 0-9 - _`) so that
//! errors can name the offending characters, but lenient about padding
//! and unused trailing bits, which many encoders get wrong.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::DecodeError;

const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

fn is_alphabet_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Reject any character outside the base64url alphabet.
///
/// The error lists each offending character once, in order of first
/// appearance.
pub fn check_alphabet(segment: &'static str, text: &str) -> Result<(), DecodeError> {
    let mut offending: Vec<char> = Vec::new();
    for c in text.chars().filter(|c| !is_alphabet_char(*c)) {
        if !offending.contains(&c) {
            offending.push(c);
        }
    }

    if offending.is_empty() {
        return Ok(());
    }

    let characters = offending
        .iter()
        .map(|c| c.escape_debug().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(DecodeError::InvalidAlphabet {
        segment,
        characters,
    })
}

/// Decode a base64url segment to raw bytes.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidAlphabet`] for foreign characters and
/// [`DecodeError::Base64`] when the text is not decodable (for example a
/// length of `4n + 1`).
pub fn decode(segment: &'static str, text: &str) -> Result<Vec<u8>, DecodeError> {
    check_alphabet(segment, text)?;

    let mut padded = String::with_capacity(text.len() + 3);
    padded.push_str(text);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    LENIENT_URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| DecodeError::Base64 {
            segment,
            reason: e.to_string(),
        })
}

/// Decode a base64url segment and interpret the bytes as UTF-8 text.
pub fn decode_to_string(segment: &'static str, text: &str) -> Result<String, DecodeError> {
    let bytes = decode(segment, text)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { segment })
}

/// Encode bytes as unpadded base64url.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
