//! Issue-to-diagnostic conversion.
//!
//! Converts decoded linter issues into `lsp_types::Diagnostic`, keeping only
//! issues reported against the linted file. The linter lints a whole
//! package, so it routinely reports issues in sibling files; those belong to
//! other documents and are dropped here. Output order follows issue order.

use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

use crate::output::Issue;

/// Converts issues using the message style chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticMapper {
    pub include_linter_name: bool,
}

impl DiagnosticMapper {
    pub fn new(include_linter_name: bool) -> Self {
        Self {
            include_linter_name,
        }
    }

    /// Diagnostics for every issue whose filename is exactly
    /// `relative_filename`, in the order the linter reported them.
    pub fn map_issues(&self, issues: &[Issue], relative_filename: &str) -> Vec<Diagnostic> {
        issues
            .iter()
            .filter(|issue| issue.pos.filename == relative_filename)
            .map(|issue| self.to_diagnostic(issue))
            .collect()
    }

    pub fn to_diagnostic(&self, issue: &Issue) -> Diagnostic {
        // The linter's spans are unreliable; point at the start only.
        let at = to_protocol_position(issue.pos.line, issue.pos.column);
        Diagnostic {
            range: Range::new(at, at),
            severity: Some(severity_from_str(&issue.severity)),
            source: Some(issue.from_linter.clone()),
            message: self.message(issue),
            ..Default::default()
        }
    }

    fn message(&self, issue: &Issue) -> String {
        if self.include_linter_name {
            format!("{}: {}", issue.from_linter, issue.text)
        } else {
            issue.text.clone()
        }
    }
}

/// Map the linter's severity vocabulary onto LSP severities.
///
/// Case-insensitive. Anything unrecognised, including the empty string,
/// is a warning.
pub fn severity_from_str(severity: &str) -> DiagnosticSeverity {
    match severity.to_ascii_lowercase().as_str() {
        "error" => DiagnosticSeverity::ERROR,
        "warning" => DiagnosticSeverity::WARNING,
        "information" => DiagnosticSeverity::INFORMATION,
        "hint" => DiagnosticSeverity::HINT,
        _ => DiagnosticSeverity::WARNING,
    }
}

/// Convert a 1-based linter position to a 0-based protocol position,
/// clamping at zero.
pub fn to_protocol_position(line: i64, column: i64) -> Position {
    Position::new(to_zero_based(line), to_zero_based(column))
}

fn to_zero_based(n: i64) -> u32 {
    u32::try_from(n.saturating_sub(1).max(0)).unwrap_or(u32::MAX)
}

/// The single diagnostic published when a lint cycle produced no result.
///
/// It has no source and sits at the start of the document.
pub fn failure_diagnostic(err: &impl std::fmt::Display) -> Diagnostic {
    Diagnostic {
        range: Range::default(),
        severity: Some(DiagnosticSeverity::ERROR),
        message: err.to_string(),
        ..Default::default()
    }
}
