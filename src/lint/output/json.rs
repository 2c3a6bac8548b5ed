//! JSON output formatter.
//!
//! Formats lint diagnostics as machine-readable JSON for tooling integration.

use serde::Serialize;
use std::io::Write;

use super::LintFormatter;
use crate::lint::{count_severity, LintDiagnostic, Severity};

/// Formats lint output as JSON.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput {
    diagnostics: Vec<JsonDiagnostic>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonDiagnostic {
    rule_id: String,
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    related: Vec<JsonRelated>,
}

#[derive(Serialize)]
struct JsonRelated {
    file: String,
    line: usize,
    message: String,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    errors: usize,
    warnings: usize,
    hints: usize,
}

impl JsonFormatter {
    /// Create a new JSON formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LintFormatter for JsonFormatter {
    fn format<W: Write>(
        &self,
        diagnostics: &[LintDiagnostic],
        writer: &mut W,
    ) -> std::io::Result<()> {
        let json_diagnostics: Vec<_> = diagnostics
            .iter()
            .map(|d| JsonDiagnostic {
                rule_id: d.rule_id.0.clone(),
                severity: d.severity,
                message: d.message.clone(),
                file: d.span.as_ref().map(|s| s.file.display().to_string()),
                line: d.span.as_ref().map(|s| s.start_line),
                column: d.span.as_ref().map(|s| s.start_col),
                suggestion: d.suggestion.clone(),
                related: d
                    .related
                    .iter()
                    .map(|r| JsonRelated {
                        file: r.span.file.display().to_string(),
                        line: r.span.start_line,
                        message: r.message.clone(),
                    })
                    .collect(),
            })
            .collect();

        let summary = JsonSummary {
            total: diagnostics.len(),
            errors: count_severity(diagnostics, Severity::Error),
            warnings: count_severity(diagnostics, Severity::Warning),
            hints: count_severity(diagnostics, Severity::Hint),
        };

        let output = JsonOutput {
            diagnostics: json_diagnostics,
            summary,
        };

        serde_json::to_writer_pretty(writer, &output).map_err(std::io::Error::other)?;

        Ok(())
    }
}
