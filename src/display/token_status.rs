//! Token status display for temporal claims.
//!
//! Renders human-readable status information for JWT temporal claims
//! (`exp`, `iat`, `nbf`) including expiry status with color coding.

use owo_colors::Style;

use jwt_lens::core::analysis::timestamps::{TimestampInfo, TimestampStatus, Timestamps};

use super::paint;

/// Overall temporal verdict for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    NotYetValid { relative: String },
    Expired { relative: String },
    Valid { relative: String },
    NoExpiry,
}

impl TokenStatus {
    /// `nbf` in the future wins over everything else, then `exp` decides.
    pub fn from_timestamps(timestamps: &Timestamps) -> Self {
        if let Some(nbf) = &timestamps.nbf
            && nbf.status == TimestampStatus::Future
        {
            return Self::NotYetValid {
                relative: nbf.relative.clone(),
            };
        }
        match &timestamps.exp {
            Some(exp) if exp.status == TimestampStatus::Expired => Self::Expired {
                relative: exp.relative.clone(),
            },
            Some(exp) => Self::Valid {
                relative: exp.relative.clone(),
            },
            None => Self::NoExpiry,
        }
    }

    fn label(&self) -> String {
        match self {
            Self::NotYetValid { relative } => format!("NOT YET VALID (valid {relative})"),
            Self::Expired { relative } => format!("EXPIRED ({relative})"),
            Self::Valid { relative } => format!("VALID (expires {relative})"),
            Self::NoExpiry => "NO EXPIRY (token never expires)".to_string(),
        }
    }

    fn style(&self) -> Style {
        match self {
            Self::Expired { .. } => Style::new().red().bold(),
            Self::Valid { .. } => Style::new().green().bold(),
            Self::NotYetValid { .. } | Self::NoExpiry => Style::new().yellow().bold(),
        }
    }
}

fn claim_line(name: &str, info: &TimestampInfo, use_color: bool) -> String {
    format!(
        "  {}: {} ({}, {})\n",
        paint(name, Style::new().cyan(), use_color),
        info.utc,
        info.timestamp,
        info.relative
    )
}

/// Render the status line followed by one line per temporal claim.
pub fn render_status(timestamps: &Timestamps, use_color: bool) -> String {
    let status = TokenStatus::from_timestamps(timestamps);
    let mut out = format!(
        "Status: {}\n",
        paint(&status.label(), status.style(), use_color)
    );
    for (name, info) in [
        ("exp", &timestamps.exp),
        ("iat", &timestamps.iat),
        ("nbf", &timestamps.nbf),
    ] {
        if let Some(info) = info {
            out.push_str(&claim_line(name, info, use_color));
        }
    }
    out
}
