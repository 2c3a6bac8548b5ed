//! Warning-to-failure policy.

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};

/// Notes when the docs build explicitly lets generator warnings pass.
pub struct FailOnWarningDisabledRule;

impl LintRule for FailOnWarningDisabledRule {
    fn id(&self) -> RuleId {
        RuleId::new("fail-on-warning-disabled")
    }

    fn name(&self) -> &str {
        "Fail On Warning Disabled"
    }

    fn description(&self) -> &str {
        "Notes when fail_on_warning is explicitly set to false"
    }

    fn default_severity(&self) -> Severity {
        Severity::Hint
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        match ctx.docs.as_ref().and_then(|d| d.fail_on_warning()) {
            Some(false) => vec![self
                .diagnostic("Documentation warnings will not fail the build".to_string())
                .with_span_opt(ctx.docs_nested_key_span("fail_on_warning:"))
                .with_suggestion("Set 'fail_on_warning: true' once the docs build cleanly")],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DocsManifest;
    use std::path::Path;

    fn check(content: &str) -> Vec<LintDiagnostic> {
        let docs = DocsManifest::parse(content, Path::new(".readthedocs.yml")).unwrap();
        let ctx =
            LintContext::new(".").with_docs(docs, ".readthedocs.yml", Some(content.to_string()));
        FailOnWarningDisabledRule.check(&ctx)
    }

    #[test]
    fn explicit_false_is_a_hint() {
        let diagnostics =
            check("sphinx:\n  configuration: docs/conf.py\n  fail_on_warning: false\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Hint);
        assert_eq!(diagnostics[0].span.as_ref().unwrap().start_line, 3);
    }

    #[test]
    fn true_or_unset_passes() {
        assert!(check("sphinx:\n  fail_on_warning: true\n").is_empty());
        assert!(check("sphinx:\n  configuration: docs/conf.py\n").is_empty());
    }
}
