//! The reading-order record (§3) and the top-level [`Report`] shape (§6).

use serde::Serialize;

use crate::diagnostic::{Diagnostic, Location, Severity};

/// Gathered from the toc nav for potential NAV-011 analysis (§9 Open
/// Question (a)): recorded, never scored, by design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingOrderRecord {
    pub target_resource: String,
    pub fragment: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportLocation {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl From<&Location> for ReportLocation {
    fn from(location: &Location) -> Self {
        ReportLocation { path: location.path.clone(), line: location.line, column: location.column }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMessage {
    pub id: String,
    pub severity: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ReportLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<&Diagnostic> for ReportMessage {
    fn from(diagnostic: &Diagnostic) -> Self {
        ReportMessage {
            id: diagnostic.id.clone(),
            severity: diagnostic.severity.as_str().to_string(),
            message: diagnostic.message.clone(),
            location: diagnostic.location.as_ref().map(ReportLocation::from),
            suggestion: diagnostic.suggestion.clone(),
        }
    }
}

/// The entry-point's return value (§6): `valid` is `false` iff a `fatal` or
/// `error` diagnostic was emitted, independent of how many were produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub valid: bool,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub messages: Vec<ReportMessage>,
}

impl Report {
    #[must_use]
    pub fn from_diagnostics(version: String, profile: Option<String>, diagnostics: &[Diagnostic]) -> Self {
        let valid = !diagnostics.iter().any(|d| d.severity.fails_validation());
        Report {
            valid,
            version,
            profile,
            messages: diagnostics.iter().map(ReportMessage::from).collect(),
        }
    }

    /// Serializes this report to the §6 JSON shape. The core publishes this
    /// as a convenience; choosing *how* to present it (pretty-printing,
    /// locale-specific text) remains the out-of-scope report formatter's job.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[must_use]
pub fn filter_by_options(diagnostics: Vec<Diagnostic>, include_usage: bool, include_info: bool) -> Vec<Diagnostic> {
    diagnostics
        .into_iter()
        .filter(|d| match d.severity {
            Severity::Usage => include_usage,
            Severity::Info => include_info,
            _ => true,
        })
        .collect()
}
