//! Token, secret and key input resolution.
//!
//! Tokens come from a positional argument, an environment variable or
//! stdin, in that order of precedence. Secrets are held in `Zeroizing`
//! buffers so they are wiped from memory on drop.

use std::io::{IsTerminal, Read};
use std::path::Path;

use zeroize::Zeroizing;

use jwt_lens::error::CliError;

/// Largest token accepted from stdin.
const MAX_STDIN_BYTES: u64 = 1_048_576;

/// Reject names that `std::env::var` cannot look up.
fn check_env_var_name(name: &str) -> Result<(), CliError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(CliError::InvalidEnvVarName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn read_env_var(name: &str) -> Result<Zeroizing<String>, CliError> {
    check_env_var_name(name)?;
    std::env::var(name)
        .map(Zeroizing::new)
        .map_err(|_| CliError::EnvVarNotFound {
            name: name.to_string(),
        })
}

/// Resolve the token from the argument, `--token-env`, or stdin.
///
/// Stdin is only read when it is not a terminal, so an interactive run
/// without a token fails fast instead of waiting for input.
///
/// # Errors
///
/// Returns [`CliError::NoTokenProvided`] when no source yields a
/// non-blank token, or an environment variable error.
pub fn resolve_token(
    token: Option<&str>,
    token_env: Option<&str>,
) -> Result<Zeroizing<String>, CliError> {
    let raw = if let Some(token) = token {
        Zeroizing::new(token.to_string())
    } else if let Some(name) = token_env {
        read_env_var(name)?
    } else {
        read_stdin()?
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::NoTokenProvided);
    }
    Ok(Zeroizing::new(trimmed.to_string()))
}

fn read_stdin() -> Result<Zeroizing<String>, CliError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::NoTokenProvided);
    }
    let mut buffer = Zeroizing::new(String::new());
    stdin
        .lock()
        .take(MAX_STDIN_BYTES)
        .read_to_string(&mut buffer)
        .map_err(|_| CliError::NoTokenProvided)?;
    Ok(buffer)
}

/// Resolve the HMAC secret from `--secret` or `--secret-env`.
///
/// # Errors
///
/// Returns an environment variable error when `--secret-env` names a
/// missing or invalid variable.
pub fn resolve_secret(
    secret: Option<&Zeroizing<String>>,
    secret_env: Option<&str>,
) -> Result<Option<Zeroizing<String>>, CliError> {
    match (secret, secret_env) {
        (Some(secret), _) => Ok(Some(secret.clone())),
        (None, Some(name)) => read_env_var(name).map(Some),
        (None, None) => Ok(None),
    }
}

/// Read a PEM key file.
///
/// # Errors
///
/// Returns [`CliError::KeyFile`] when the file cannot be read as text.
pub fn read_key_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::KeyFile {
        path: path.display().to_string(),
        reason: e.kind().to_string(),
    })
}
