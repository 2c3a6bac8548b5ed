//! Build modes and job commands of the docs manifest.

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};

/// Detects mutually exclusive build settings used together.
pub struct ConflictingBuildModesRule;

impl LintRule for ConflictingBuildModesRule {
    fn id(&self) -> RuleId {
        RuleId::new("conflicting-build-modes")
    }

    fn name(&self) -> &str {
        "Conflicting Build Modes"
    }

    fn description(&self) -> &str {
        "Detects build.jobs with build.commands, or sphinx with mkdocs"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(docs) = &ctx.docs else {
            return vec![];
        };

        let mut diagnostics = Vec::new();
        if !docs.build.jobs.is_empty() && !docs.build.commands.is_empty() {
            diagnostics.push(
                self.diagnostic(
                    "'build.jobs' and 'build.commands' can't be used together".to_string(),
                )
                .with_span_opt(ctx.docs_nested_key_span("commands:"))
                .with_suggestion(
                    "Move the commands into a job phase, or drop 'build.jobs' to take over the whole build",
                ),
            );
        }
        if docs.sphinx.is_some() && docs.mkdocs.is_some() {
            diagnostics.push(
                self.diagnostic("Both 'sphinx' and 'mkdocs' are configured".to_string())
                    .with_span_opt(ctx.docs_key_span("mkdocs:"))
                    .with_suggestion("Keep the section for the generator the project uses"),
            );
        }
        diagnostics
    }
}

/// Detects blank commands inside a job phase or `build.commands`.
pub struct EmptyJobCommandRule;

impl LintRule for EmptyJobCommandRule {
    fn id(&self) -> RuleId {
        RuleId::new("empty-job-command")
    }

    fn name(&self) -> &str {
        "Empty Job Command"
    }

    fn description(&self) -> &str {
        "Detects blank commands in build.jobs and build.commands"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(docs) = &ctx.docs else {
            return vec![];
        };

        let mut diagnostics = Vec::new();
        for (phase, commands) in docs.build.jobs.phases() {
            for (index, _) in commands
                .iter()
                .enumerate()
                .filter(|(_, c)| c.trim().is_empty())
            {
                diagnostics.push(self.blank(ctx, phase.as_str(), index));
            }
        }
        for (index, _) in docs
            .build
            .commands
            .iter()
            .enumerate()
            .filter(|(_, c)| c.trim().is_empty())
        {
            diagnostics.push(self.blank(ctx, "commands", index));
        }
        diagnostics
    }
}

impl EmptyJobCommandRule {
    fn blank(&self, ctx: &LintContext, section: &str, index: usize) -> LintDiagnostic {
        self.diagnostic(format!("Command {} of {} is empty", index + 1, section))
            .with_span_opt(ctx.docs_nested_key_span(&format!("{}:", section)))
            .with_suggestion("Remove the empty entry")
    }
}
