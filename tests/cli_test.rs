//! Integration tests for the jwt-lens CLI.
//!
//! Tests argument parsing, help text, version output, token input
//! sources, decode output, and the verify exit-code contract.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

use common::*;

fn cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("jwt-lens");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn decode_json(args: &[&str]) -> serde_json::Value {
    let output = cmd().arg("decode").args(args).arg("--json").output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

// --- Help and Version ---

#[test]
fn test_no_args_shows_usage_hint() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_flag_shows_description() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("offline-first"))
        .stdout(predicate::str::contains("JWKS"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("jwt-lens"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_decode_help_shows_options() {
    cmd()
        .args(["decode", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--token-env"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--skip-verification"))
        .stdout(predicate::str::contains("--at"))
        .stdout(predicate::str::contains("[TOKEN]"));
}

#[test]
fn test_verify_help_includes_shell_history_warning() {
    cmd()
        .args(["verify", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shell history"))
        .stdout(predicate::str::contains("--discover-jwks"));
}

#[test]
fn test_unknown_subcommand_fails() {
    cmd()
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// --- Decode ---

#[test]
fn test_decode_human_output_sections() {
    cmd()
        .args(["decode", HS256_TOKEN])
        .assert()
        .success()
        .stdout(predicate::str::contains("Header"))
        .stdout(predicate::str::contains("\"alg\": \"HS256\""))
        .stdout(predicate::str::contains("\"name\": \"John Doe\""))
        .stdout(predicate::str::contains("Status: NO EXPIRY"))
        .stdout(predicate::str::contains("Signature: NOT VERIFIED (HS256)"))
        .stdout(predicate::str::contains("\u{1b}[").not());
}

#[test]
fn test_decode_json_has_report_fields() {
    let json = decode_json(&[HS256_TOKEN]);
    assert_eq!(json["decoded"], true);
    assert_eq!(json["token"]["header"]["alg"], "HS256");
    assert_eq!(json["rawSegments"]["signature"], "KMUFsIDTnFmyG3nMiGM6H9FNFUROf3wh7SmqJp-QV30");
    assert!(json["signatureVerification"]["verified"].is_null());
    assert!(json["timestamps"]["iat"].is_object());
    assert!(json["timestamps"].get("exp").is_none());
    assert_eq!(json["summary"]["valid"], false);
    assert!(json["summary"]["errorCount"].as_u64().unwrap() >= 1);
}

#[test]
fn test_decode_with_secret_verifies() {
    let json = decode_json(&[HS256_TOKEN, "--secret", HS256_SECRET]);
    assert_eq!(json["signatureVerification"]["verified"], true);
    assert_eq!(json["signatureVerification"]["keySource"], "provided");
}

#[test]
fn test_decode_skip_verification() {
    let json = decode_json(&[HS256_TOKEN, "--secret", HS256_SECRET, "--skip-verification"]);
    assert!(json["signatureVerification"]["verified"].is_null());
}

#[test]
fn test_decode_from_stdin() {
    cmd()
        .arg("decode")
        .write_stdin(format!("{HS256_TOKEN}\n"))
        .assert()
        .success()
        .stdout(predicate::str::contains("John Doe"));
}

#[test]
fn test_decode_from_env_var() {
    cmd()
        .args(["decode", "--token-env", "JWT_LENS_TEST_TOKEN"])
        .env("JWT_LENS_TEST_TOKEN", HS256_TOKEN)
        .assert()
        .success()
        .stdout(predicate::str::contains("John Doe"));
}

#[test]
fn test_decode_env_var_not_set_shows_error() {
    cmd()
        .args(["decode", "--token-env", "JWT_LENS_DEFINITELY_UNSET"])
        .env_remove("JWT_LENS_DEFINITELY_UNSET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JWT_LENS_DEFINITELY_UNSET"));
}

#[test]
fn test_decode_invalid_env_var_name() {
    cmd()
        .args(["decode", "--token-env", "A=B"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid environment variable name"));
}

#[test]
fn test_decode_no_token_shows_error() {
    cmd()
        .arg("decode")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no token provided"));
}

#[test]
fn test_decode_two_parts_is_rejected() {
    cmd()
        .args(["decode", MALFORMED_TOKEN_TWO_PARTS])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Expected 3 parts"))
        .stderr(predicate::str::contains("got 2"));
}

#[test]
fn test_decode_single_part_is_rejected() {
    cmd()
        .args(["decode", INVALID_TOKEN])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("got 1"));
}

#[test]
fn test_decode_bad_alphabet_names_characters() {
    let token = format!("{}.{}.ab#c", segment(r#"{"alg":"HS256"}"#), segment("{}"));
    cmd()
        .args(["decode", token.as_str()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("signature"))
        .stderr(predicate::str::contains("#"));
}

#[test]
fn test_decode_rejection_in_json_mode() {
    let output = cmd()
        .args(["decode", MALFORMED_TOKEN_TWO_PARTS, "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["decoded"], false);
    assert!(json["error"].as_str().unwrap().contains("got 2"));
}

#[test]
fn test_decode_invalid_json_payload_exposes_raw_text() {
    let token = format!("{}.{}.sig", segment(r#"{"alg":"HS256"}"#), segment(r#"{"sub":"#));
    let json = decode_json(&[token.as_str()]);
    assert_eq!(json["decoded"], false);
    assert_eq!(json["raw"]["payload"], r#"{"sub":"#);
}

// --- Time travel ---

#[test]
fn test_decode_at_epoch_evaluates_discovery_token_as_valid() {
    let at = (DISCOVERY_IAT + 100).to_string();
    let token = vector("RS256_DISCOVERY");
    let json = decode_json(&[token.as_str(), "--at", at.as_str()]);
    assert_eq!(json["timestamps"]["exp"]["status"], "future");
    assert_eq!(json["tokenType"]["type"], "Access Token");
}

#[test]
fn test_decode_at_relative_shows_note() {
    cmd()
        .args(["decode", HS256_TOKEN, "--at", "-1h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluated at"))
        .stdout(predicate::str::contains("(-1h)"));
}

#[test]
fn test_decode_without_at_sees_discovery_token_expired() {
    let json = decode_json(&[vector("RS256_DISCOVERY").as_str()]);
    assert_eq!(json["timestamps"]["exp"]["status"], "expired");
}

#[test]
fn test_invalid_at_expression_fails() {
    cmd()
        .args(["decode", HS256_TOKEN, "--at", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid time expression 'yesterday'"));
}

// --- Verify exit codes ---

#[test]
fn test_verify_hs256_correct_secret_exits_zero() {
    cmd()
        .args(["verify", HS256_TOKEN, "--secret", HS256_SECRET])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Signature: VERIFIED (HS256)"));
}

#[test]
fn test_verify_hs256_wrong_secret_exits_one() {
    cmd()
        .args(["verify", HS256_TOKEN, "--secret", "not-the-secret"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("INVALID"));
}

#[test]
fn test_verify_without_key_exits_two() {
    cmd()
        .args(["verify", HS256_TOKEN])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("NOT VERIFIED"));
}

#[test]
fn test_verify_secret_from_env() {
    cmd()
        .args(["verify", HS256_TOKEN, "--secret-env", "JWT_LENS_TEST_SECRET"])
        .env("JWT_LENS_TEST_SECRET", HS256_SECRET)
        .assert()
        .code(0);
}

#[test]
fn test_verify_rs256_with_key_file() {
    let token = create_rs256_token(&access_token_claims());
    cmd()
        .args(["verify", token.as_str(), "--key-file", RSA_PUBLIC_KEY_PATH])
        .assert()
        .code(0);
}

#[test]
fn test_verify_es256_with_wrong_family_key_exits_one() {
    let token = create_es256_token(&access_token_claims());
    cmd()
        .args(["verify", token.as_str(), "--key-file", RSA_PUBLIC_KEY_PATH])
        .assert()
        .code(1);
}

#[test]
fn test_verify_missing_key_file_fails() {
    cmd()
        .args(["verify", HS256_TOKEN, "--key-file", "tests/fixtures/missing.pem"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read key file"));
}

#[test]
fn test_verify_json_output() {
    let output = cmd()
        .args(["verify", HS256_TOKEN, "--secret", HS256_SECRET, "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["decoded"], true);
    assert_eq!(json["signatureVerification"]["verified"], true);
    assert_eq!(json["signatureVerification"]["algorithm"], "HS256");
}

#[test]
fn test_verify_malformed_token_exits_one() {
    cmd()
        .args(["verify", MALFORMED_TOKEN_TWO_PARTS, "--secret", HS256_SECRET])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Expected 3 parts"));
}

#[test]
fn test_verify_alg_none_exits_one() {
    let token = format!("{}.{}.", segment(r#"{"alg":"none"}"#), segment(r#"{"sub":"a"}"#));
    cmd().args(["verify", token.as_str()]).assert().code(1);
}

#[test]
fn test_verify_discovery_with_http_issuer_reports_error() {
    let claims = serde_json::json!({"iss": "http://auth.example.com", "sub": "a", "exp": now() + 60});
    let token = create_rs256_token(&claims);
    cmd()
        .args(["verify", token.as_str(), "--discover-jwks"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("JWKS discovery failed"))
        .stdout(predicate::str::contains("HTTPS"));
}
