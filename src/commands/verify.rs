//! Handler for the `verify` subcommand.
//!
//! Verifies a JWT's signature using a shared secret, a PEM public key,
//! or a key discovered through the issuer's JWKS. The exit code carries
//! the tri-state outcome.

use std::process::ExitCode;

use anyhow::Result;
use serde_json::json;

use jwt_lens::DecodeResult;

use crate::cli::VerifyArgs;
use crate::display::{self, report};

/// Exit code for a signature that could not be checked.
const EXIT_UNVERIFIED: u8 = 2;

/// Execute the `verify` subcommand with the given arguments.
///
/// Returns exit code 0 for a verified signature, 1 for a rejected
/// signature or malformed token, and 2 when verification was not possible.
pub fn execute(args: &VerifyArgs) -> Result<ExitCode> {
    let inspection = super::inspect(&args.input, &args.keys, args.at.as_deref(), false)?;

    let token_report = match &inspection.result {
        DecodeResult::Decoded(token_report) => token_report,
        DecodeResult::Rejected(rejection) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&inspection.result)?);
            } else {
                eprintln!("Error: {}", rejection.error);
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let outcome = &token_report.signature_verification;
    if args.json {
        let mut output = json!({
            "decoded": true,
            "signatureVerification": outcome,
        });
        if let Some(jwks_error) = &token_report.jwks_error {
            output["jwksError"] = json!(jwks_error);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!(
            "{}",
            report::render_verification(outcome, token_report.jwks_error.as_deref(), display::use_color())
        );
    }

    Ok(match outcome.verified {
        Some(true) => ExitCode::SUCCESS,
        Some(false) => ExitCode::FAILURE,
        None => ExitCode::from(EXIT_UNVERIFIED),
    })
}
