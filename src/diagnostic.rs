//! Diagnostic values and the severities the message registry assigns to them.
//!
//! Diagnostics are plain data, never exceptions (see the crate-level error
//! handling notes in `lib.rs`): every rule in the package and content-document
//! engines appends a [`Diagnostic`] to a shared buffer instead of returning
//! `Err` for a specification violation.

use std::fmt;

/// The severity bucket a diagnostic falls into.
///
/// `Suppressed` never appears on a constructed [`Diagnostic`] — it is only a
/// possible result of [`crate::message_registry::lookup_severity`], and
/// [`crate::message_registry::emit`] discards the diagnostic before it is
/// built when the resolved severity is `Suppressed` and no override was
/// supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Fatal,
    Error,
    Warning,
    Info,
    Usage,
    Suppressed,
}

impl Severity {
    /// `true` for the two severities that flip a [`crate::Report::valid`] flag to `false`.
    #[must_use]
    pub fn fails_validation(self) -> bool {
        matches!(self, Severity::Fatal | Severity::Error)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Usage => "usage",
            Severity::Suppressed => "suppressed",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source location attached to a diagnostic.
///
/// `path` is the container path of the resource the diagnostic concerns;
/// `line`/`column` are 1-based positions within that resource when the
/// originating XML parser supplied them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Location {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Location {
            path: path.into(),
            line: None,
            column: None,
        }
    }

    #[must_use]
    pub fn at(path: impl Into<String>, line: u32, column: u32) -> Self {
        Location {
            path: path.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}

/// A single diagnostic produced anywhere in the pipeline.
///
/// `id` is a stable message identifier matching `^[A-Z]{3}-\d{3}[a-z]?$`
/// (or `SCH-\w+` for a passthrough Schematron id). See
/// [`crate::message_registry`] for the closed id table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            id: id.into(),
            severity,
            message: message.into(),
            location: None,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", severity_tag(self.severity), self.id, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal => "F",
        Severity::Error => "E",
        Severity::Warning => "W",
        Severity::Info => "I",
        Severity::Usage => "U",
        Severity::Suppressed => "S",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fails_validation_only_for_fatal_and_error() {
        assert!(Severity::Fatal.fails_validation());
        assert!(Severity::Error.fails_validation());
        assert!(!Severity::Warning.fails_validation());
        assert!(!Severity::Info.fails_validation());
        assert!(!Severity::Usage.fails_validation());
        assert!(!Severity::Suppressed.fails_validation());
    }

    #[test]
    fn display_includes_id_and_location() {
        let diag = Diagnostic::new("RSC-012", Severity::Error, "missing id")
            .with_location(Location::at("OEBPS/ch1.xhtml", 10, 3));
        let text = diag.to_string();
        assert!(text.contains("RSC-012"));
        assert!(text.contains("OEBPS/ch1.xhtml:10:3"));
    }

    #[test]
    fn location_without_line_omits_position() {
        let location = Location::new("mimetype");
        assert_eq!(location.to_string(), "mimetype");
    }
}
