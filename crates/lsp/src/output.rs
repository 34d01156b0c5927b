//! Decoding of golangci-lint's JSON output.
//!
//! The tool prints one JSON document on the first line of stdout and may
//! follow it with human-readable summary lines, so only the first line is
//! decoded. Every field is optional; older and newer tool versions disagree
//! on which ones they emit.

use serde::{Deserialize, Deserializer};

use crate::error::LintError;

/// Decoded result of one linter run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ToolResult {
    #[serde(deserialize_with = "null_as_default")]
    pub issues: Vec<Issue>,
    /// Not used for diagnostics; logged for observability.
    #[serde(deserialize_with = "null_as_default")]
    pub report: Report,
}

/// One finding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Issue {
    pub from_linter: String,
    pub text: String,
    pub severity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source_lines: Vec<String>,
    pub replacement: Option<serde_json::Value>,
    pub line_range: Option<LineRange>,
    pub pos: IssuePosition,
    pub expect_no_lint: bool,
    pub expected_no_lint_linter: String,
}

/// Where an issue was found. `line` and `column` are 1-based; a missing
/// field decodes as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct IssuePosition {
    /// Path relative to the linter's working directory.
    pub filename: String,
    pub offset: i64,
    pub line: i64,
    pub column: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LineRange {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Report {
    #[serde(deserialize_with = "null_as_default")]
    pub linters: Vec<LinterInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub warnings: Vec<ReportWarning>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LinterInfo {
    pub name: String,
    pub enabled: bool,
    pub enabled_by_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReportWarning {
    pub tag: String,
    pub text: String,
}

/// Go encodes empty slices as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode the first newline-delimited segment of `stdout`.
pub fn parse_output(stdout: &[u8]) -> Result<ToolResult, LintError> {
    let first = stdout.split(|&b| b == b'\n').next().unwrap_or_default();
    Ok(serde_json::from_slice(first)?)
}

impl Report {
    /// Emit the report's warnings and error to the log.
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!(tag = %warning.tag, "linter warning: {}", warning.text);
        }
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            tracing::warn!("linter reported an error: {error}");
        }
        let enabled = self.linters.iter().filter(|l| l.enabled).count();
        tracing::debug!(enabled, total = self.linters.len(), "linters in report");
    }
}
