//! Core business logic for JWT inspection.
//!
//! This module contains the domain logic separated from CLI concerns.
//! All types and functions here are testable without the CLI layer.

pub mod analysis;
pub mod base64url;
pub mod decoder;
pub mod der;
pub mod diagnostics;
pub mod engine;
pub mod jwks;
pub mod time_travel;
pub mod verifier;
