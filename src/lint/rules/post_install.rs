//! Corrective `post_install` pins must stay in effect.

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};
use crate::replay::replay;

/// Detects a later phase reinstalling or removing a package pinned in `post_install`.
///
/// `post_install` is where projects downgrade or pin packages that the main
/// install resolved badly (for example `docutils` for Sphinx). A later
/// reinstall or uninstall silently undoes that correction.
pub struct PostInstallOverriddenRule;

impl LintRule for PostInstallOverriddenRule {
    fn id(&self) -> RuleId {
        RuleId::new("post-install-overridden")
    }

    fn name(&self) -> &str {
        "Post-Install Overridden"
    }

    fn description(&self) -> &str {
        "Detects packages installed in post_install that a later phase reinstalls or removes"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(docs) = &ctx.docs else {
            return vec![];
        };

        let report = replay(docs);
        report
            .overridden_post_install()
            .map(|o| {
                let mut diagnostic = self
                    .diagnostic(format!(
                        "'{}' pinned in post_install ('{}') is {} by {} command {} ('{}')",
                        o.package,
                        o.previous.requirement,
                        if o.removed { "removed" } else { "reinstalled" },
                        o.current.phase,
                        o.current.command_index + 1,
                        o.current.requirement
                    ))
                    .with_span_opt(ctx.docs_command_span(&o.current.command))
                    .with_suggestion(format!(
                        "Move the '{}' install into post_install, or pin it to the same version",
                        o.package
                    ));
                if let Some(span) = ctx.docs_command_span(&o.previous.command) {
                    diagnostic = diagnostic.with_related(span, "corrective install here");
                }
                diagnostic
            })
            .collect()
    }
}
