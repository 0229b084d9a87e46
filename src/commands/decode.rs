//! Handler for the `decode` subcommand.
//!
//! Decodes a JWT and prints the full analysis: header and payload,
//! temporal status, token type, lifetime, signature outcome and
//! diagnostics. Supports reading the token from a CLI argument,
//! environment variable, or stdin.

use std::process::ExitCode;

use anyhow::Result;

use jwt_lens::DecodeResult;

use crate::cli::DecodeArgs;
use crate::display::{self, report};

/// Execute the `decode` subcommand with the given arguments.
///
/// Exits with failure when the token is structurally invalid.
pub fn execute(args: &DecodeArgs) -> Result<ExitCode> {
    let inspection = super::inspect(
        &args.input,
        &args.keys,
        args.at.as_deref(),
        args.skip_verification,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&inspection.result)?);
    }

    match &inspection.result {
        DecodeResult::Decoded(token_report) => {
            if !args.json {
                let use_color = display::use_color();
                print!(
                    "{}",
                    report::render_report(token_report, inspection.at.as_ref(), use_color)
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        DecodeResult::Rejected(rejection) => {
            if !args.json {
                eprintln!("Error: {}", rejection.error);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
