//! Command handlers for each CLI subcommand.
//!
//! Each subcommand is implemented in its own module and exposes
//! a single `execute` function that receives the parsed arguments.
//! Both share [`inspect`], which resolves the inputs and runs the engine.

pub mod decode;
pub mod input;
pub mod verify;

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use jwt_lens::core::time_travel::{self, TimeTarget};
use jwt_lens::error::CliError;
use jwt_lens::{DecodeOptions, DecodeResult, JwksClient, JwksConfig};

use crate::cli::{KeyArgs, TokenArgs};

/// A finished engine run plus the clock it was evaluated at.
pub struct Inspection {
    pub result: DecodeResult,
    pub at: Option<TimeTarget>,
}

/// Resolve token, key material and clock, then decode, discovering the
/// key through JWKS when requested.
///
/// # Errors
///
/// Returns a [`CliError`] for input problems only. Token, key and JWKS
/// problems are part of the returned [`DecodeResult`].
pub fn inspect(
    input: &TokenArgs,
    keys: &KeyArgs,
    at: Option<&str>,
    skip_verification: bool,
) -> Result<Inspection, CliError> {
    let token = input::resolve_token(input.token.as_deref(), input.token_env.as_deref())?;
    let secret = input::resolve_secret(keys.secret.as_ref(), keys.secret_env.as_deref())?;
    let public_key = keys
        .key_file
        .as_deref()
        .map(input::read_key_file)
        .transpose()?;
    let at = at
        .map(|expression| time_travel::parse_time_expression(expression, Utc::now()))
        .transpose()?;

    let options = DecodeOptions {
        verification_secret: secret,
        public_key,
        skip_verification,
        now: at.as_ref().map(|target| target.timestamp),
    };

    let result = if keys.discover_jwks {
        debug!(timeout_secs = keys.jwks_timeout, "JWKS discovery enabled");
        let client = JwksClient::new(JwksConfig {
            timeout: Duration::from_secs(keys.jwks_timeout),
            ..JwksConfig::default()
        });
        jwt_lens::decode_with_jwks_discovery(&token, &options, &client)
    } else {
        jwt_lens::decode(&token, &options)
    };

    Ok(Inspection { result, at })
}
