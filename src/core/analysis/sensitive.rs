//! Detection of secrets and personal data carried in claims.
//!
//! Claim names are matched against a list of secret-bearing names
//! (`error`) and personal-data names (`warning`). String values are then
//! matched against value patterns. Each (field, category) pair is reported
//! once, the first detector to fire wins.

use std::collections::HashSet;
use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::diagnostics::{Diagnostic, Level};

/// Nested objects deeper than this are not inspected.
const MAX_DEPTH: usize = 8;
/// Minimum length for an opaque value to count as a possible key.
const BLOB_MIN_LEN: usize = 32;
/// Minimum length for a string with whitespace to count as free text.
const FREE_TEXT_MIN_LEN: usize = 100;

/// Substrings that mark a claim name as secret-bearing.
const SECRET_NAME_PARTS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "api_key",
    "apikey",
    "private_key",
    "privatekey",
    "access_key",
    "credential",
];
/// Whole names that mark a claim as secret-bearing.
const SECRET_NAMES: &[&str] = &["pwd", "pin", "cvv", "cvc"];
const CARD_NAME_PARTS: &[&str] = &["credit_card", "card_number", "cardnumber", "cc_num"];

/// Personal-data name fragments and the category each maps to.
const PII_NAME_PARTS: &[(&str, Category)] = &[
    ("email", Category::Email),
    ("phone", Category::Phone),
    ("mobile", Category::Phone),
    ("social_security", Category::Ssn),
    ("address", Category::Pii),
    ("street", Category::Pii),
    ("postal_code", Category::Pii),
    ("date_of_birth", Category::Pii),
    ("birthdate", Category::Pii),
    ("passport", Category::Pii),
    ("driver_license", Category::Pii),
    ("national_id", Category::Pii),
    ("tax_id", Category::Pii),
];
const PII_NAMES: &[(&str, Category)] = &[
    ("ssn", Category::Ssn),
    ("dob", Category::Pii),
    ("zip", Category::Pii),
    ("zipcode", Category::Pii),
];

/// Claims that legitimately hold opaque random values.
const OPAQUE_CLAIMS: &[&str] = &[
    "jti",
    "nonce",
    "at_hash",
    "c_hash",
    "sid",
    "session_state",
    "azp",
    "client_id",
    "kid",
];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid email regex pattern")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?\d{1,3}[ .\-]?\(?\d{2,4}\)?[ .\-]?\d{3,4}[ .\-]?\d{3,4}$")
        .expect("Invalid phone regex pattern")
});

static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}-\d{2}-\d{4}$").expect("Invalid SSN regex pattern"));

static CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d[ \-]?){12,18}\d$").expect("Invalid card regex pattern"));

static JWT_LIKE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"eyJ[A-Za-z0-9_-]{5,}\.eyJ[A-Za-z0-9_-]{5,}\.[A-Za-z0-9_-]*")
        .expect("Invalid JWT regex pattern")
});

static BLOB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/_\-]+={0,2}$").expect("Invalid blob regex pattern"));

static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(secret|token|key|password)\b").expect("Invalid keyword regex pattern")
});

/// What kind of sensitive data a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Secret,
    CreditCard,
    Email,
    Phone,
    Ssn,
    Pii,
    IpAddress,
    EmbeddedToken,
    RandomBlob,
    Keyword,
    FreeText,
}

impl Category {
    fn is_pii(self) -> bool {
        matches!(
            self,
            Self::Email | Self::Phone | Self::Ssn | Self::Pii | Self::IpAddress
        )
    }

    fn is_sensitive(self) -> bool {
        matches!(
            self,
            Self::Secret | Self::CreditCard | Self::EmbeddedToken | Self::RandomBlob
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub field: String,
    pub category: Category,
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveData {
    pub contains_pii: bool,
    pub contains_sensitive: bool,
    pub contains_free_text: bool,
    pub findings: Vec<Finding>,
}

impl SensitiveData {
    /// Findings as pooled diagnostics, tied to their field.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.findings
            .iter()
            .map(|f| Diagnostic::new(f.level, f.message.clone()).with_claim(f.field.clone()))
            .collect()
    }
}

#[derive(Default)]
struct Collector {
    seen: HashSet<(String, Category)>,
    data: SensitiveData,
}

impl Collector {
    fn push(&mut self, field: &str, category: Category, level: Level, message: String) {
        if !self.seen.insert((field.to_string(), category)) {
            return;
        }
        self.data.contains_pii |= category.is_pii();
        self.data.contains_sensitive |= category.is_sensitive();
        self.data.contains_free_text |= category == Category::FreeText;
        self.data.findings.push(Finding {
            field: field.to_string(),
            category,
            level,
            message,
        });
    }
}

/// Scan the payload for secrets and personal data.
pub fn detect(payload: &Map<String, Value>) -> SensitiveData {
    let mut collector = Collector::default();
    scan_object(payload, "", 0, &mut collector);
    collector.data
}

fn scan_object(object: &Map<String, Value>, prefix: &str, depth: usize, out: &mut Collector) {
    for (key, value) in object {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        check_name(key, &field, value, out);
        scan_value(key, &field, value, depth, out);
    }
}

fn scan_value(key: &str, field: &str, value: &Value, depth: usize, out: &mut Collector) {
    match value {
        Value::String(s) => check_value(key, field, s, out),
        Value::Array(items) => {
            for item in items {
                scan_value(key, field, item, depth, out);
            }
        }
        Value::Object(map) if depth < MAX_DEPTH => scan_object(map, field, depth + 1, out),
        _ => {}
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase().replace('-', "_")
}

fn check_name(key: &str, field: &str, value: &Value, out: &mut Collector) {
    if matches!(value, Value::Bool(_) | Value::Null) {
        return;
    }
    let name = normalize(key);

    if CARD_NAME_PARTS.iter().any(|p| name.contains(p)) {
        out.push(
            field,
            Category::CreditCard,
            Level::Error,
            format!("Credit card data detected: \"{field}\". PCI DSS prohibits storing card data in JWTs."),
        );
        return;
    }

    if SECRET_NAME_PARTS.iter().any(|p| name.contains(p)) || SECRET_NAMES.contains(&name.as_str()) {
        out.push(
            field,
            Category::Secret,
            Level::Error,
            format!(
                "Sensitive field found in payload: \"{field}\". Never store secrets, passwords, or API keys in JWTs."
            ),
        );
        return;
    }

    let pii = PII_NAME_PARTS
        .iter()
        .find(|(part, _)| name.contains(part))
        .or_else(|| PII_NAMES.iter().find(|(exact, _)| name == *exact));
    if let Some((_, category)) = pii {
        out.push(
            field,
            *category,
            Level::Warning,
            format!("Personal data found in payload: \"{field}\". Tokens are readable by anyone who holds them."),
        );
    }
}

fn check_value(key: &str, field: &str, text: &str, out: &mut Collector) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }

    if EMAIL_RE.is_match(trimmed) {
        out.push(
            field,
            Category::Email,
            Level::Warning,
            format!("Email address found in \"{field}\". Be cautious with PII in tokens."),
        );
    }

    if SSN_RE.is_match(trimmed) {
        out.push(
            field,
            Category::Ssn,
            Level::Warning,
            format!("Value of \"{field}\" looks like a US Social Security Number."),
        );
    } else if CARD_RE.is_match(trimmed) && passes_luhn(trimmed) {
        out.push(
            field,
            Category::CreditCard,
            Level::Error,
            format!("Value of \"{field}\" looks like a payment card number (passes the Luhn check)."),
        );
    } else if PHONE_RE.is_match(trimmed) && trimmed.contains(['+', '(', ' ', '-', '.']) {
        out.push(
            field,
            Category::Phone,
            Level::Warning,
            format!("Value of \"{field}\" looks like a phone number."),
        );
    }

    if trimmed.parse::<IpAddr>().is_ok() {
        out.push(
            field,
            Category::IpAddress,
            Level::Warning,
            format!("Value of \"{field}\" is an IP address, which can identify a user or host."),
        );
    }

    if JWT_LIKE_RE.is_match(trimmed) {
        out.push(
            field,
            Category::EmbeddedToken,
            Level::Warning,
            format!("\"{field}\" contains an embedded JWT. Nested bearer tokens leak with the outer token."),
        );
    } else if looks_random(key, trimmed) {
        out.push(
            field,
            Category::RandomBlob,
            Level::Warning,
            format!("Value of \"{field}\" looks like a random key or secret ({} characters).", trimmed.len()),
        );
    }

    if KEYWORD_RE.is_match(trimmed) {
        out.push(
            field,
            Category::Keyword,
            Level::Info,
            format!("Value of \"{field}\" mentions a secret, token, key or password."),
        );
    }

    if trimmed.len() > FREE_TEXT_MIN_LEN && trimmed.contains(char::is_whitespace) {
        out.push(
            field,
            Category::FreeText,
            Level::Info,
            format!("\"{field}\" holds free text; unstructured data in tokens often carries PII."),
        );
    }
}

fn looks_random(key: &str, text: &str) -> bool {
    if OPAQUE_CLAIMS.contains(&key) || text.len() < BLOB_MIN_LEN || !BLOB_RE.is_match(text) {
        return false;
    }
    text.chars().any(|c| c.is_ascii_uppercase())
        && text.chars().any(|c| c.is_ascii_lowercase())
        && text.chars().any(|c| c.is_ascii_digit())
}

fn passes_luhn(text: &str) -> bool {
    let digits: Vec<u32> = text.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                *d
            }
        })
        .sum();
    sum % 10 == 0
}
