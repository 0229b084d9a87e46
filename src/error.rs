//! Domain error types for jwt-lens.
//!
//! All business-logic errors are defined here using `thiserror`. The
//! library entry points never surface them directly: the decode engine
//! renders them into the `error`, `reason` or `jwksError` fields of a
//! [`DecodeResult`](crate::core::engine::DecodeResult). The CLI converts
//! [`CliError`] into user-facing messages at the process boundary.

use thiserror::Error;

/// Structural failures that reject a token before any analysis runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The token does not split into exactly three dot-separated parts.
    #[error(
        "Invalid JWT format. Expected 3 parts (header.payload.signature) separated by dots, got {count}."
    )]
    WrongPartCount {
        /// Number of parts actually found.
        count: usize,
    },

    /// The header and/or payload part is empty.
    #[error("Invalid JWT: missing {} part{}", .parts.join(", "), plural_suffix(.parts.len()))]
    MissingParts {
        /// Names of the empty parts, in token order.
        parts: Vec<&'static str>,
    },

    /// A segment contains characters outside the base64url alphabet.
    #[error(
        "Invalid JWT: {segment} contains non-base64url characters ({characters}). Base64url allows: a-z, A-Z, 0-9, hyphen (-), underscore (_)"
    )]
    InvalidAlphabet {
        /// Which segment was rejected.
        segment: &'static str,
        /// The distinct offending characters, comma separated.
        characters: String,
    },

    /// The segment uses the right alphabet but is not decodable base64.
    #[error("Failed to decode {segment}: {reason}. Check that the {segment} is valid base64url.")]
    Base64 {
        /// Which segment failed to decode.
        segment: &'static str,
        /// Underlying codec error.
        reason: String,
    },

    /// The decoded bytes are not UTF-8 text.
    #[error("Failed to decode {segment}: decoded bytes are not valid UTF-8")]
    InvalidUtf8 {
        /// Which segment failed to decode.
        segment: &'static str,
    },

    /// The decoded text is not valid JSON.
    #[error("Invalid JSON in {segment}: {reason} near: \"{context}\"")]
    InvalidJson {
        /// Which segment failed to parse.
        segment: &'static str,
        /// Parser message.
        reason: String,
        /// Text surrounding the failure offset.
        context: String,
        /// The decoded text, kept for callers that want to show it.
        raw: String,
    },

    /// The decoded JSON is valid but not an object.
    #[error("Invalid JWT: {segment} must be a JSON object, got {found}")]
    NotAnObject {
        /// Which segment was rejected.
        segment: &'static str,
        /// JSON type that was found instead.
        found: &'static str,
    },
}

fn plural_suffix(count: usize) -> &'static str {
    if count > 1 { "s" } else { "" }
}

/// Failures while turning caller-supplied key material into a usable key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// No PEM armor was found.
    #[error(
        "invalid PEM format: expected \"-----BEGIN PUBLIC KEY-----\" ... \"-----END PUBLIC KEY-----\""
    )]
    MissingPemArmor,

    /// The PEM block holds something other than a public key.
    #[error("unsupported PEM block '{label}', expected PUBLIC KEY or RSA PUBLIC KEY")]
    UnsupportedPemLabel {
        /// The label found after `-----BEGIN`.
        label: String,
    },

    /// The PEM body is not valid base64.
    #[error("PEM body is not valid base64: {reason}")]
    PemBody {
        /// Underlying codec error.
        reason: String,
    },

    /// The DER structure could not be parsed.
    #[error("malformed public key structure: {reason}")]
    Der {
        /// Underlying ASN.1 error.
        reason: String,
    },

    /// The EC point does not lie on the declared curve.
    #[error("invalid {curve} public key point")]
    InvalidPoint {
        /// Curve the point was decoded for.
        curve: &'static str,
    },
}

/// Failures of the JWKS discovery chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwksError {
    /// The payload has no usable `iss` claim.
    #[error("token has no iss claim, cannot locate a JWKS endpoint")]
    MissingIssuer,

    /// `iss` is not a parseable URL.
    #[error("issuer '{issuer}' is not a valid URL")]
    InvalidIssuer {
        /// The issuer value as found in the token.
        issuer: String,
    },

    /// `iss` uses a scheme other than HTTPS.
    #[error("issuer must use HTTPS to fetch JWKS (got scheme '{scheme}')")]
    InsecureIssuer {
        /// The rejected scheme.
        scheme: String,
    },

    /// The HTTP request could not be completed.
    #[error("failed to fetch JWKS from '{url}': {reason}")]
    Fetch {
        /// The sanitized JWKS URL.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The token header carries no `kid`.
    #[error("token header has no kid, cannot match JWKS key")]
    MissingKid,

    /// No key in the set carries the token's `kid`.
    #[error("no key with kid '{kid}' found in JWKS at '{url}'")]
    KeyNotFound {
        /// The sanitized key ID.
        kid: String,
        /// The sanitized JWKS URL.
        url: String,
    },

    /// Only RSA keys can be converted to PEM.
    #[error("JWK key type '{kty}' is not supported, only RSA keys can be converted")]
    UnsupportedKeyType {
        /// The JWK `kty` value.
        kty: String,
    },

    /// An RSA JWK lacks its modulus or exponent.
    #[error("RSA JWK is missing the '{component}' component")]
    MissingComponent {
        /// Name of the missing member.
        component: &'static str,
    },

    /// An RSA JWK component is not valid base64url.
    #[error("RSA JWK component '{component}' is not valid base64url")]
    InvalidComponent {
        /// Name of the malformed member.
        component: &'static str,
    },
}

/// Input errors raised by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// No token was provided via any input method.
    #[error("no token provided: pass a token as an argument, via --token-env, or through stdin")]
    NoTokenProvided,

    /// The specified environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVarNotFound {
        /// Name of the missing environment variable.
        name: String,
    },

    /// The environment variable name cannot be valid.
    #[error("invalid environment variable name '{name}'")]
    InvalidEnvVarName {
        /// The rejected name.
        name: String,
    },

    /// Failed to read the provided key file.
    #[error("failed to read key file '{path}': {reason}")]
    KeyFile {
        /// Path to the key file.
        path: String,
        /// Description of the read failure.
        reason: String,
    },

    /// Failed to parse a time-travel expression.
    #[error("invalid time expression '{expression}': {reason}")]
    InvalidTimeExpression {
        /// The time expression that failed to parse.
        expression: String,
        /// Description of the parsing failure.
        reason: String,
    },
}
