//! jwt-lens: decode, lint, classify and verify JSON Web Tokens.
//!
//! The entry points are [`decode`] and [`decode_with_jwks_discovery`].
//! Both always return a [`DecodeResult`]: structural failures, key
//! problems and JWKS failures are reported inside it, never as errors.
//!
//! ```
//! use jwt_lens::{DecodeOptions, decode};
//!
//! let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
//!     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiYWRtaW4iOnRydWUsImlhdCI6MTUxNjIzOTAyMn0.\
//!     KMUFsIDTnFmyG3nMiGM6H9FNFUROf3wh7SmqJp-QV30";
//! let options = DecodeOptions::new().with_secret("a-string-secret-at-least-256-bits-long");
//! let result = decode(token, &options);
//! assert_eq!(result.signature_verification().unwrap().verified, Some(true));
//! ```

#![forbid(unsafe_code)]

pub mod core;
pub mod error;

pub use crate::core::engine::{
    DecodeOptions, DecodeResult, Rejection, TokenReport, decode, decode_with_jwks_discovery,
};
pub use crate::core::jwks::{JwksClient, JwksConfig, JwksFetcher};
pub use crate::core::verifier::{KeySource, VerificationOutcome};
