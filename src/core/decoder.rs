//! Structural JWT parsing.
//!
//! Splits a raw token into its three segments, base64url-decodes the
//! header and payload, and parses both as JSON objects. Every step is a
//! fail-fast gate: the first problem found becomes the [`DecodeError`]
//! and nothing downstream runs.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::base64url;
use crate::error::DecodeError;

/// Characters of context kept on each side of a JSON parse failure.
const JSON_CONTEXT_RADIUS: usize = 20;

/// The three raw base64url segments, exactly as they appeared in the token
/// after whitespace trimming.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct RawSegments {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

/// Top-level keys that occurred more than once in the header or payload.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DuplicateKeys {
    pub header: Vec<String>,
    pub payload: Vec<String>,
}

/// A structurally valid token.
///
/// Implements a custom `Debug` that redacts the payload and signature to
/// prevent accidental leakage of sensitive claim data.
#[derive(Clone)]
pub struct ParsedToken {
    /// The parsed header object.
    pub header: Map<String, Value>,
    /// The parsed payload object (claims).
    pub payload: Map<String, Value>,
    /// Decoded header JSON text.
    pub header_json: String,
    /// Decoded payload JSON text.
    pub payload_json: String,
    /// The original segments, used verbatim for signature verification.
    pub segments: RawSegments,
    /// Duplicate top-level keys found while scanning the decoded JSON.
    pub duplicate_keys: DuplicateKeys,
}

impl ParsedToken {
    /// The exact `header.payload` byte string the signature covers.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.segments.header, self.segments.payload)
    }

    /// The header `alg` value, if it is a string.
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// The header `kid` value, if it is a string.
    pub fn key_id(&self) -> Option<&str> {
        self.header.get("kid").and_then(Value::as_str)
    }
}

impl fmt::Debug for ParsedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedToken")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .field("duplicate_keys", &self.duplicate_keys)
            .finish()
    }
}

impl fmt::Debug for RawSegments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSegments")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Parse a raw JWT string.
///
/// Outer whitespace is trimmed, as is whitespace around each dot, so a
/// token wrapped across lines still parses. Whitespace inside a segment
/// is rejected by the alphabet check.
///
/// # Errors
///
/// Returns the first structural problem found: wrong part count, empty
/// header or payload, foreign characters, undecodable base64, invalid
/// UTF-8, invalid JSON, or JSON that is not an object.
pub fn parse(token: &str) -> Result<ParsedToken, DecodeError> {
    let parts: Vec<&str> = token.trim().split('.').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(DecodeError::WrongPartCount { count: parts.len() });
    }

    let (header_seg, payload_seg, signature_seg) = (parts[0], parts[1], parts[2]);

    let missing: Vec<&'static str> = [("header", header_seg), ("payload", payload_seg)]
        .into_iter()
        .filter(|(_, seg)| seg.is_empty())
        .map(|(name, _)| name)
        .collect();
    if !missing.is_empty() {
        return Err(DecodeError::MissingParts { parts: missing });
    }

    base64url::check_alphabet("header", header_seg)?;
    base64url::check_alphabet("payload", payload_seg)?;
    base64url::check_alphabet("signature", signature_seg)?;

    let header_json = base64url::decode_to_string("header", header_seg)?;
    let payload_json = base64url::decode_to_string("payload", payload_seg)?;

    let header = parse_object("header", &header_json)?;
    let payload = parse_object("payload", &payload_json)?;

    let duplicate_keys = DuplicateKeys {
        header: find_duplicate_keys(&header_json),
        payload: find_duplicate_keys(&payload_json),
    };

    Ok(ParsedToken {
        header,
        payload,
        header_json,
        payload_json,
        segments: RawSegments {
            header: header_seg.to_string(),
            payload: payload_seg.to_string(),
            signature: signature_seg.to_string(),
        },
        duplicate_keys,
    })
}

fn parse_object(segment: &'static str, text: &str) -> Result<Map<String, Value>, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson {
        segment,
        reason: e.to_string(),
        context: error_context(text, e.line(), e.column()),
        raw: text.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAnObject {
            segment,
            found: json_type_name(&other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Text around the byte offset described by a 1-based line/column pair.
fn error_context(text: &str, line: usize, column: usize) -> String {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let offset = (line_start + column.saturating_sub(1)).min(text.len());

    let start = text.floor_char_boundary(offset.saturating_sub(JSON_CONTEXT_RADIUS));
    let end = text.ceil_char_boundary((offset + JSON_CONTEXT_RADIUS).min(text.len()));
    text[start..end].to_string()
}

/// Scan raw JSON text for top-level object keys that appear more than once.
///
/// The scan tracks nesting depth and string escapes so that keys of nested
/// objects and quoted braces do not confuse it. Keys are compared after
/// JSON unescaping, so `"a"` and `"\u0061"` collide.
pub fn find_duplicate_keys(json: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();

    let mut depth = 0usize;
    let mut expecting_key = false;
    let mut chars = json.char_indices();

    while let Some((start, c)) = chars.next() {
        match c {
            '{' | '[' => {
                depth += 1;
                expecting_key = depth == 1 && c == '{';
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                expecting_key = false;
            }
            ',' if depth == 1 => expecting_key = true,
            '"' => {
                let mut end = json.len();
                let mut escaped = false;
                for (i, sc) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if sc == '\\' {
                        escaped = true;
                    } else if sc == '"' {
                        end = i;
                        break;
                    }
                }

                if depth == 1 && expecting_key {
                    let raw = &json[start + 1..end];
                    let key = unescape_key(raw);
                    if !seen.insert(key.clone()) && !duplicates.contains(&key) {
                        duplicates.push(key);
                    }
                    expecting_key = false;
                }
            }
            _ => {}
        }
    }

    duplicates
}

fn unescape_key(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}
