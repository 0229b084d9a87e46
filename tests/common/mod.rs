//! Shared test fixtures and helper utilities.
//!
//! Provides pre-built JWT tokens with known claims, the generated
//! signing vectors in `tests/fixtures/vectors.json`, and helpers that
//! mint fresh tokens with `jsonwebtoken` from the fixture keys.
#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

/// The well-known HS256 example token.
///
/// Header: `{"alg":"HS256","typ":"JWT"}`
/// Payload: `{"sub":"1234567890","name":"John Doe","admin":true,"iat":1516239022}`
/// Secret: [`HS256_SECRET`]
pub const HS256_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiYWRtaW4iOnRydWUsImlhdCI6MTUxNjIzOTAyMn0.\
     KMUFsIDTnFmyG3nMiGM6H9FNFUROf3wh7SmqJp-QV30";

/// Secret that signed [`HS256_TOKEN`].
pub const HS256_SECRET: &str = "a-string-secret-at-least-256-bits-long";

/// A malformed token with only two parts (missing signature).
pub const MALFORMED_TOKEN_TWO_PARTS: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

/// A completely invalid token string.
pub const INVALID_TOKEN: &str = "not-a-valid-jwt";

/// Issue time of the discovery vectors; they expire an hour later.
pub const DISCOVERY_IAT: i64 = 1_700_000_000;

pub const RSA_PUBLIC_KEY_PATH: &str = "tests/fixtures/rsa_public.pem";
pub const RSA_PRIVATE_KEY_PATH: &str = "tests/fixtures/rsa_private.pem";
pub const RSA_1024_PUBLIC_KEY_PATH: &str = "tests/fixtures/rsa_1024_public.pem";
pub const RSA_E3_PUBLIC_KEY_PATH: &str = "tests/fixtures/rsa_e3_public.pem";
pub const EC_P256_PUBLIC_KEY_PATH: &str = "tests/fixtures/ec_p256_public.pem";
pub const EC_P256_PRIVATE_KEY_PATH: &str = "tests/fixtures/ec_p256_private.pem";
pub const EC_P384_PUBLIC_KEY_PATH: &str = "tests/fixtures/ec_p384_public.pem";
pub const EC_P521_PUBLIC_KEY_PATH: &str = "tests/fixtures/ec_p521_public.pem";

/// Look up a signed token or JWK component in `vectors.json`.
pub fn vector(name: &str) -> String {
    let vectors: serde_json::Value =
        serde_json::from_str(include_str!("../fixtures/vectors.json")).unwrap();
    vectors[name]
        .as_str()
        .unwrap_or_else(|| panic!("no vector named {name}"))
        .to_string()
}

pub fn read_fixture(path: &str) -> String {
    std::fs::read_to_string(path).unwrap()
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Create an HS256-signed token with the given claims.
pub fn create_hs256_token(secret: &str, claims: &serde_json::Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&header, claims, &key).unwrap()
}

/// Create an RS256-signed token using the 2048-bit fixture key.
pub fn create_rs256_token(claims: &serde_json::Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let private_key = std::fs::read(RSA_PRIVATE_KEY_PATH).unwrap();
    let header = Header::new(Algorithm::RS256);
    let key = EncodingKey::from_rsa_pem(&private_key).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Create an ES256-signed token using the P-256 fixture key.
pub fn create_es256_token(claims: &serde_json::Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let private_key = std::fs::read(EC_P256_PRIVATE_KEY_PATH).unwrap();
    let header = Header::new(Algorithm::ES256);
    let key = EncodingKey::from_ec_pem(&private_key).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Claims for a well-formed access token valid for the next hour.
pub fn access_token_claims() -> serde_json::Value {
    let now = now();
    serde_json::json!({
        "iss": "https://auth.example.com/",
        "sub": "user-123",
        "aud": "my-api",
        "scope": "read:messages",
        "iat": now,
        "exp": now + 3_600,
    })
}

/// Base64url-encode raw JSON so tests can build tokens with odd shapes.
pub fn segment(json: &str) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
}
