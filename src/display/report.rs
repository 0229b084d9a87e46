//! Human-readable rendering of a [`TokenReport`].

use owo_colors::Style;
use serde_json::Value;

use jwt_lens::core::analysis::classifier::Confidence;
use jwt_lens::core::analysis::ttl::{TtlBasis, TtlStatus};
use jwt_lens::core::diagnostics::{Diagnostic, Level};
use jwt_lens::core::time_travel::TimeTarget;
use jwt_lens::{KeySource, TokenReport, VerificationOutcome};

use super::{json_printer, paint, token_status};

fn heading(text: &str, use_color: bool) -> String {
    format!("{}\n", paint(text, Style::new().bright_cyan().bold(), use_color))
}

fn level_tag(level: Level, use_color: bool) -> String {
    let (label, style) = match level {
        Level::Error => ("ERROR", Style::new().red().bold()),
        Level::Warning => ("WARN", Style::new().yellow().bold()),
        Level::Info => ("INFO", Style::new().blue()),
    };
    paint(&format!("[{label}]"), style, use_color)
}

fn diagnostic_line(diagnostic: &Diagnostic, use_color: bool) -> String {
    match &diagnostic.claim {
        Some(claim) => format!(
            "  {} {}: {}\n",
            level_tag(diagnostic.level, use_color),
            claim,
            diagnostic.message
        ),
        None => format!(
            "  {} {}\n",
            level_tag(diagnostic.level, use_color),
            diagnostic.message
        ),
    }
}

fn confidence_label(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "high",
        Confidence::Medium => "medium",
        Confidence::Low => "low",
    }
}

fn ttl_style(status: TtlStatus) -> Style {
    match status {
        TtlStatus::Normal => Style::new().green(),
        TtlStatus::Expired | TtlStatus::Missing => Style::new().red(),
        TtlStatus::Warning | TtlStatus::Suspicious | TtlStatus::Questionable => {
            Style::new().yellow()
        }
    }
}

/// The signature section, shared by `decode` and `verify`.
pub fn render_verification(
    outcome: &VerificationOutcome,
    jwks_error: Option<&str>,
    use_color: bool,
) -> String {
    let (label, style) = match outcome.verified {
        Some(true) => ("VERIFIED", Style::new().green().bold()),
        Some(false) => ("INVALID", Style::new().red().bold()),
        None => ("NOT VERIFIED", Style::new().yellow().bold()),
    };
    let algorithm = outcome.algorithm.as_deref().unwrap_or("unknown");

    let mut out = format!(
        "Signature: {} ({algorithm})\n  {}\n",
        paint(label, style, use_color),
        outcome.reason
    );
    if outcome.key_source == Some(KeySource::Jwks) {
        out.push_str(&format!(
            "  Key: kid {} from {}\n",
            outcome.key_id.as_deref().unwrap_or("-"),
            outcome.jwks_url.as_deref().unwrap_or("-")
        ));
    }
    for warning in &outcome.key_warnings {
        out.push_str(&diagnostic_line(warning, use_color));
    }
    if let Some(error) = jwks_error {
        out.push_str(&format!(
            "  {} {error}\n",
            paint("JWKS discovery failed:", Style::new().red(), use_color)
        ));
    }
    out
}

/// Render the full report: segments, status, type, lifetime, signature
/// and pooled diagnostics.
pub fn render_report(report: &TokenReport, at: Option<&TimeTarget>, use_color: bool) -> String {
    let mut out = String::new();

    if let Some(target) = at {
        out.push_str(&paint(
            &format!(
                "Evaluated at {} ({})\n\n",
                target.timestamp.to_rfc3339(),
                target.expression
            ),
            Style::new().bright_black(),
            use_color,
        ));
    }

    out.push_str(&heading("Header", use_color));
    out.push_str(&json_printer::render_json(
        &Value::Object(report.token.header.clone()),
        use_color,
    ));
    out.push_str("\n\n");
    out.push_str(&heading("Payload", use_color));
    out.push_str(&json_printer::render_json(
        &Value::Object(report.token.payload.clone()),
        use_color,
    ));
    out.push_str("\n\n");

    out.push_str(&token_status::render_status(&report.timestamps, use_color));

    let token_type = &report.token_type;
    out.push_str(&format!(
        "Type: {} ({} confidence)\n",
        paint(&token_type.kind.to_string(), Style::new().bold(), use_color),
        confidence_label(token_type.confidence)
    ));
    if !token_type.signals.is_empty() {
        out.push_str(&format!("  Signals: {}\n", token_type.signals.join(", ")));
    }

    let ttl = &report.ttl_analysis;
    let basis = match ttl.basis {
        Some(TtlBasis::IssuedAt) => " [exp - iat]",
        Some(TtlBasis::Now) => " [exp - now]",
        None => "",
    };
    out.push_str(&format!(
        "Lifetime: {}{basis}\n  Expected: {}\n",
        paint(&ttl.message, ttl_style(ttl.status), use_color),
        ttl.expected
    ));
    out.push('\n');

    out.push_str(&render_verification(
        &report.signature_verification,
        report.jwks_error.as_deref(),
        use_color,
    ));
    out.push('\n');

    let summary = &report.summary;
    out.push_str(&heading(
        &format!(
            "Diagnostics ({} errors, {} warnings, {} info)",
            summary.error_count, summary.warning_count, summary.info_count
        ),
        use_color,
    ));
    let issues = &report.issues;
    if report.diagnostics.is_empty() {
        out.push_str("  No issues found\n");
    }
    for diagnostic in issues.errors.iter().chain(&issues.warnings).chain(&issues.infos) {
        out.push_str(&diagnostic_line(diagnostic, use_color));
    }
    out
}
