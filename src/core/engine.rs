//! Decode orchestration: parse, analyze, verify, and optionally discover
//! the verification key through the issuer's JWKS.
//!
//! Neither entry point returns an error. A structurally broken token
//! yields [`DecodeResult::Rejected`]; everything else yields a complete
//! [`TokenReport`], with key and discovery problems recorded inside it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::analysis::claims::{self, ClaimPresence};
use crate::core::analysis::classifier::{self, Classification};
use crate::core::analysis::sensitive::{self, SensitiveData};
use crate::core::analysis::timestamps::{self, Timestamps};
use crate::core::analysis::ttl::{self, TtlAnalysis};
use crate::core::analysis::header;
use crate::core::decoder::{self, DuplicateKeys, ParsedToken, RawSegments};
use crate::core::diagnostics::{self, Diagnostic, Issues, Summary};
use crate::core::jwks::{JwksClient, JwksFetcher};
use crate::core::verifier::algorithm::Algorithm;
use crate::core::verifier::{self, KeyMaterial, KeySource, VerificationOutcome};
use crate::error::{DecodeError, JwksError};

/// Caller-supplied decode settings.
#[derive(Clone, Default)]
pub struct DecodeOptions {
    /// HMAC secret.
    pub verification_secret: Option<Zeroizing<String>>,
    /// PEM public key for RSA and ECDSA tokens.
    pub public_key: Option<String>,
    /// Report the signature as unchecked instead of verifying it.
    pub skip_verification: bool,
    /// Evaluation clock; wall-clock time when `None`.
    pub now: Option<DateTime<Utc>>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.verification_secret = Some(Zeroizing::new(secret.into()));
        self
    }

    pub fn with_public_key(mut self, pem: impl Into<String>) -> Self {
        self.public_key = Some(pem.into());
        self
    }

    pub fn skip_verification(mut self, skip: bool) -> Self {
        self.skip_verification = skip;
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// The secret, unless it is absent or blank.
    pub fn secret(&self) -> Option<&str> {
        self.verification_secret
            .as_deref()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// The public key, unless it is absent or blank.
    pub fn key(&self) -> Option<&str> {
        self.public_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    fn clock(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn key_material(&self) -> KeyMaterial<'_> {
        KeyMaterial {
            secret: self.secret(),
            public_key: self.key(),
        }
    }
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field(
                "verification_secret",
                &self.verification_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("public_key", &self.public_key.as_ref().map(|_| "[PEM]"))
            .field("skip_verification", &self.skip_verification)
            .field("now", &self.now)
            .finish()
    }
}

/// Parsed header, payload and the signature segment.
#[derive(Clone, Serialize)]
pub struct TokenParts {
    pub header: Map<String, Value>,
    pub payload: Map<String, Value>,
    pub signature: String,
}

impl fmt::Debug for TokenParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenParts")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Decoded JSON text of header and payload, plus the signature segment.
#[derive(Clone, Serialize)]
pub struct RawText {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

impl fmt::Debug for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawText")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub header_duplicate_keys: Vec<String>,
    pub payload_duplicate_keys: Vec<String>,
}

/// Everything known about a structurally valid token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReport {
    pub token: TokenParts,
    pub raw: RawText,
    pub raw_segments: RawSegments,
    pub validation: Validation,
    pub timestamps: Timestamps,
    pub claims: ClaimPresence,
    pub token_type: Classification,
    pub ttl_analysis: TtlAnalysis,
    pub sensitive_data: SensitiveData,
    pub header_security_warnings: Vec<Diagnostic>,
    pub signature_verification: VerificationOutcome,
    pub diagnostics: Vec<Diagnostic>,
    pub issues: Issues,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_error: Option<String>,
    #[serde(skip)]
    parsed: ParsedToken,
}

impl TokenReport {
    pub fn parsed(&self) -> &ParsedToken {
        &self.parsed
    }
}

/// A token rejected at parse time.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub error: String,
    /// Decoded text of the segment whose JSON failed to parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Map<String, Value>>,
}

impl From<&DecodeError> for Rejection {
    fn from(err: &DecodeError) -> Self {
        let raw = match err {
            DecodeError::InvalidJson { segment, raw, .. } => {
                let mut map = Map::new();
                map.insert((*segment).to_string(), Value::String(raw.clone()));
                Some(map)
            }
            _ => None,
        };
        Self {
            error: err.to_string(),
            raw,
        }
    }
}

/// Outcome of a decode call. Serializes with a leading `decoded` flag.
#[derive(Debug, Clone)]
pub enum DecodeResult {
    Decoded(Box<TokenReport>),
    Rejected(Rejection),
}

impl DecodeResult {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    pub fn report(&self) -> Option<&TokenReport> {
        match self {
            Self::Decoded(report) => Some(report),
            Self::Rejected(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Decoded(_) => None,
            Self::Rejected(rejection) => Some(&rejection.error),
        }
    }

    /// The tri-state signature verdict, `None` for a rejected token.
    pub fn signature_verification(&self) -> Option<&VerificationOutcome> {
        self.report().map(|r| &r.signature_verification)
    }
}

impl Serialize for DecodeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Flagged<'a, T> {
            decoded: bool,
            #[serde(flatten)]
            body: &'a T,
        }

        match self {
            Self::Decoded(report) => Flagged {
                decoded: true,
                body: report.as_ref(),
            }
            .serialize(serializer),
            Self::Rejected(rejection) => Flagged {
                decoded: false,
                body: rejection,
            }
            .serialize(serializer),
        }
    }
}

fn duplicate_key_diagnostics(duplicates: &DuplicateKeys) -> Vec<Diagnostic> {
    let header = duplicates.header.iter().map(|key| ("header", key));
    let payload = duplicates.payload.iter().map(|key| ("payload", key));
    header
        .chain(payload)
        .map(|(segment, key)| {
            Diagnostic::warning(format!(
                "Duplicate key \"{key}\" in {segment} - JSON parsers disagree on which value wins"
            ))
            .with_claim(key.clone())
        })
        .collect()
}

/// Decode, analyze and verify a token.
///
/// Structural failures return [`DecodeResult::Rejected`] and skip every
/// analyzer; otherwise all analyzers run and the signature is verified
/// with whatever key material `options` carries.
pub fn decode(token: &str, options: &DecodeOptions) -> DecodeResult {
    let parsed = match decoder::parse(token) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "token rejected");
            return DecodeResult::Rejected(Rejection::from(&e));
        }
    };

    let now = options.clock();
    let header_map = &parsed.header;
    let payload = &parsed.payload;

    let timestamps = timestamps::interpret(payload, now);
    let (presence, presence_diagnostics) = claims::check_presence(payload);
    let lint = claims::lint(payload, now);
    let classification = classifier::classify(header_map, payload, now);
    let ttl_analysis = ttl::analyze(payload, classification.kind, now);
    let sensitive_data = sensitive::detect(payload);
    let header_warnings = header::validate(header_map, &parsed.header_json, classification.kind);

    let signature_verification = if options.skip_verification {
        verifier::skipped(&parsed)
    } else {
        verifier::verify(&parsed, &options.key_material())
    };

    let mut pooled = duplicate_key_diagnostics(&parsed.duplicate_keys);
    pooled.extend(presence_diagnostics);
    pooled.extend(lint);
    pooled.extend(classification.diagnostics.iter().cloned());
    pooled.extend(ttl_analysis.diagnostics.iter().cloned());
    pooled.extend(sensitive_data.diagnostics());
    pooled.extend(header_warnings.iter().cloned());
    let (issues, summary) = diagnostics::bucket(&pooled);

    DecodeResult::Decoded(Box::new(TokenReport {
        token: TokenParts {
            header: parsed.header.clone(),
            payload: parsed.payload.clone(),
            signature: parsed.segments.signature.clone(),
        },
        raw: RawText {
            header: parsed.header_json.clone(),
            payload: parsed.payload_json.clone(),
            signature: parsed.segments.signature.clone(),
        },
        raw_segments: parsed.segments.clone(),
        validation: Validation {
            header_duplicate_keys: parsed.duplicate_keys.header.clone(),
            payload_duplicate_keys: parsed.duplicate_keys.payload.clone(),
        },
        timestamps,
        claims: presence,
        token_type: classification,
        ttl_analysis,
        sensitive_data,
        header_security_warnings: header_warnings,
        signature_verification,
        diagnostics: pooled,
        issues,
        summary,
        jwks_error: None,
        parsed,
    }))
}

/// [`decode`], then fetch the verification key from the issuer's JWKS
/// when the token is RSA-signed, no public key was supplied and `iss` is
/// present.
///
/// A discovered key replaces the first verification outcome, tagged with
/// its source, `kid`, issuer and JWKS URL. Any discovery failure is
/// recorded in `jwksError` and the rest of the report is kept.
pub fn decode_with_jwks_discovery<F: JwksFetcher>(
    token: &str,
    options: &DecodeOptions,
    client: &JwksClient<F>,
) -> DecodeResult {
    let mut result = decode(token, options);
    let DecodeResult::Decoded(report) = &mut result else {
        return result;
    };

    if options.skip_verification || options.key().is_some() {
        return result;
    }
    if !matches!(
        Algorithm::from_header(report.parsed.algorithm()),
        Algorithm::Rsa(_)
    ) {
        return result;
    }
    let Some(issuer) = report.parsed.payload.get("iss") else {
        return result;
    };

    let discovered = match issuer {
        Value::String(issuer) => client
            .discover_key(issuer, report.parsed.key_id())
            .map(|key| (issuer.clone(), key)),
        other => Err(JwksError::InvalidIssuer {
            issuer: other.to_string(),
        }),
    };

    match discovered {
        Ok((issuer, key)) => {
            debug!(kid = %key.key_id, "verifying with JWKS key");
            let outcome = verifier::verify(
                &report.parsed,
                &KeyMaterial {
                    secret: None,
                    public_key: Some(&key.pem),
                },
            );
            report.signature_verification = VerificationOutcome {
                key_source: Some(KeySource::Jwks),
                key_id: Some(key.key_id),
                issuer: Some(issuer),
                jwks_url: Some(key.jwks_url),
                ..outcome
            };
        }
        Err(e) => {
            warn!(error = %e, "JWKS discovery failed");
            report.jwks_error = Some(e.to_string());
        }
    }
    result
}
