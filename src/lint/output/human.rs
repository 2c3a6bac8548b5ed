//! Human-readable output formatter.
//!
//! Formats lint diagnostics for terminal display with optional color support.

use console::style;
use std::io::Write;

use super::LintFormatter;
use crate::lint::{count_severity, LintDiagnostic, Severity};

/// Formats lint output for human consumption.
pub struct HumanFormatter {
    /// Whether to use colors (ANSI escape codes).
    pub use_color: bool,
}

impl HumanFormatter {
    /// Create a new human formatter.
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn severity_prefix(&self, severity: Severity) -> String {
        let label = severity.to_string();
        if !self.use_color {
            return label;
        }
        match severity {
            Severity::Hint => style(label).cyan().bold().to_string(),
            Severity::Warning => style(label).yellow().bold().to_string(),
            Severity::Error => style(label).red().bold().to_string(),
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }
}

impl LintFormatter for HumanFormatter {
    fn format<W: Write>(
        &self,
        diagnostics: &[LintDiagnostic],
        writer: &mut W,
    ) -> std::io::Result<()> {
        for diag in diagnostics {
            writeln!(
                writer,
                "{}[{}]: {}",
                self.severity_prefix(diag.severity),
                diag.rule_id.0,
                diag.message
            )?;

            if let Some(ref span) = diag.span {
                writeln!(writer, "  {} {}", self.dim("-->"), span)?;
            }

            if let Some(ref suggestion) = diag.suggestion {
                writeln!(writer, "   = help: {}", suggestion)?;
            }

            for related in &diag.related {
                writeln!(
                    writer,
                    "   = note: {} ({}:{})",
                    related.message,
                    related.span.file.display(),
                    related.span.start_line
                )?;
            }

            writeln!(writer)?;
        }

        let errors = count_severity(diagnostics, Severity::Error);
        let warnings = count_severity(diagnostics, Severity::Warning);
        let hints = count_severity(diagnostics, Severity::Hint);

        if !diagnostics.is_empty() {
            write!(
                writer,
                "Found {} error(s) and {} warning(s)",
                errors, warnings
            )?;
            if hints > 0 {
                write!(writer, ", {} hint(s)", hints)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}
