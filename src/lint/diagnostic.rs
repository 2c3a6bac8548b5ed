//! Lint diagnostic messages.

use serde::Serialize;

use super::rule::{RuleId, Severity};
use super::span::Span;

/// A problem found by a lint rule.
#[derive(Debug, Clone, Serialize)]
pub struct LintDiagnostic {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub message: String,
    /// Where the problem is, when the rule could locate it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// How to fix it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Other locations involved, such as the earlier of two conflicting entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedInfo>,
}

/// A secondary location attached to a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedInfo {
    pub span: Span,
    pub message: String,
}

impl LintDiagnostic {
    /// Create a new diagnostic.
    pub fn new(rule_id: RuleId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            severity,
            message: message.into(),
            span: None,
            suggestion: None,
            related: vec![],
        }
    }

    /// Add a source span to this diagnostic.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add a span if one is known.
    pub fn with_span_opt(mut self, span: Option<Span>) -> Self {
        if span.is_some() {
            self.span = span;
        }
        self
    }

    /// Add a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo {
            span,
            message: message.into(),
        });
        self
    }

    /// Replace the severity (used for configured overrides).
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Count diagnostics at one severity.
pub fn count_severity(diagnostics: &[LintDiagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}
