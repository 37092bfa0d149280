use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;

/// Severity level for syntax diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The line violates the format and was dropped.
    Error,
    /// The line is suspicious but was kept.
    Warning,
}

/// A syntax diagnostic produced during line validation.
///
/// In tolerant decoding these are collected and the offending lines are
/// dropped; in strict decoding the first `Error` aborts the parse.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How severe the problem is.
    pub severity: Severity,
    /// One-based line number of the offending line.
    pub line: usize,
    /// Byte range of the offending line in the source text.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the problem.
    pub message: String,
}

impl Diagnostic {
    /// Build an error diagnostic for the given line.
    pub fn error(line: usize, span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            line,
            span,
            message: message.into(),
        }
    }

    /// Build a warning diagnostic for the given line.
    pub fn warning(line: usize, span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            line,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix} on line {}: {}", self.line, self.message)
    }
}

/// Render diagnostics against the source text using ariadne.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let color = match diag.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        Report::build(kind, (filename, diag.span.clone()))
            .with_message(&diag.message)
            .with_label(
                Label::new((filename, diag.span.clone()))
                    .with_message(&diag.message)
                    .with_color(color),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}
