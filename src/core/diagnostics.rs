//! Diagnostics shared by every analyzer.

use serde::Serialize;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// One finding about a token, optionally tied to a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<String>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            claim: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    /// Attach the claim (or header field) this diagnostic is about.
    pub fn with_claim(mut self, claim: impl Into<String>) -> Self {
        self.claim = Some(claim.into());
        self
    }
}

/// Diagnostics split by level, preserving the pooled order within each bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Issues {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub infos: Vec<Diagnostic>,
}

/// Counts per level; a token is `valid` when no error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

/// Split a pooled diagnostic list into level buckets and a summary.
pub fn bucket(diagnostics: &[Diagnostic]) -> (Issues, Summary) {
    let mut issues = Issues::default();
    for diagnostic in diagnostics {
        let target = match diagnostic.level {
            Level::Error => &mut issues.errors,
            Level::Warning => &mut issues.warnings,
            Level::Info => &mut issues.infos,
        };
        target.push(diagnostic.clone());
    }

    let summary = Summary {
        valid: issues.errors.is_empty(),
        error_count: issues.errors.len(),
        warning_count: issues.warnings.len(),
        info_count: issues.infos.len(),
    };
    (issues, summary)
}
