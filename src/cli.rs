//! CLI argument definitions for jwt-lens.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Both subcommands share the token, key and clock arguments through
//! flattened argument groups.
//!
//! # Security
//!
//! The argument structs implement custom `Debug` to redact sensitive
//! fields (tokens and secrets) and prevent accidental leakage through
//! debug formatting, error chains, or logging.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use zeroize::Zeroizing;

/// A secure, offline-first JWT inspector: decode, lint, classify and
/// verify JSON Web Tokens, with optional JWKS key discovery.
#[derive(Debug, Parser)]
#[command(name = "jwt-lens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a JWT and report claims, lifetime, type, sensitive data and signature status.
    Decode(DecodeArgs),

    /// Verify a JWT's signature. Exits 0 when verified, 1 when rejected, 2 when unverifiable.
    Verify(VerifyArgs),
}

/// Where the token comes from.
#[derive(clap::Args)]
pub struct TokenArgs {
    /// The JWT to inspect. If omitted, reads from stdin.
    #[arg(conflicts_with = "token_env")]
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub token_env: Option<String>,
}

impl fmt::Debug for TokenArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenArgs")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .finish()
    }
}

/// Key material and discovery settings.
#[derive(clap::Args)]
pub struct KeyArgs {
    /// HMAC shared secret for HS256/384/512 tokens.
    ///
    /// WARNING: Passing secrets via CLI arguments may expose them in shell
    /// history. Prefer --secret-env instead.
    #[arg(
        long,
        value_name = "SECRET",
        value_parser = parse_zeroizing_string,
        conflicts_with = "secret_env"
    )]
    pub secret: Option<Zeroizing<String>>,

    /// Read the HMAC secret from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub secret_env: Option<String>,

    /// Path to a PEM-encoded public key (SPKI or PKCS#1) for RS* and ES* tokens.
    #[arg(long, value_name = "FILE")]
    pub key_file: Option<PathBuf>,

    /// Fetch the verification key from the issuer's JWKS
    /// (`{iss}/.well-known/jwks.json`) for RS* tokens without --key-file.
    #[arg(long)]
    pub discover_jwks: bool,

    /// Timeout for the JWKS request, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub jwks_timeout: u64,
}

impl fmt::Debug for KeyArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyArgs")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("secret_env", &self.secret_env)
            .field("key_file", &self.key_file)
            .field("discover_jwks", &self.discover_jwks)
            .field("jwks_timeout", &self.jwks_timeout)
            .finish()
    }
}

/// Arguments for the `decode` subcommand.
#[derive(Debug, clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: TokenArgs,

    #[command(flatten)]
    pub keys: KeyArgs,

    /// Report the signature as unchecked even when a key is given.
    #[arg(long)]
    pub skip_verification: bool,

    /// Evaluate temporal claims at a different time.
    ///
    /// Accepts "now", relative offsets like "+7d", "-1h", "+30m", "+2w",
    /// "+1y", "-5s", RFC 3339 timestamps, dates (YYYY-MM-DD) or Unix epoch
    /// seconds.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub at: Option<String>,

    /// Print the full report as JSON (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `verify` subcommand.
#[derive(Debug, clap::Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub input: TokenArgs,

    #[command(flatten)]
    pub keys: KeyArgs,

    /// Evaluate temporal claims at a different time (see `decode --at`).
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub at: Option<String>,

    /// Print the verification outcome as JSON (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Parse a string into a `Zeroizing<String>` for secure CLI arguments.
fn parse_zeroizing_string(s: &str) -> Result<Zeroizing<String>, std::convert::Infallible> {
    Ok(Zeroizing::new(s.to_string()))
}
