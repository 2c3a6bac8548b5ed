//! Channel declarations in the environment manifest.

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};

/// Detects `channel::package` entries whose channel is not in `channels`.
///
/// conda only searches declared channels (plus `defaults` unless
/// `nodefaults` is listed), so such an entry fails to solve on a clean
/// machine.
pub struct UndeclaredChannelRule;

impl LintRule for UndeclaredChannelRule {
    fn id(&self) -> RuleId {
        RuleId::new("undeclared-channel")
    }

    fn name(&self) -> &str {
        "Undeclared Channel"
    }

    fn description(&self) -> &str {
        "Detects channel-prefixed dependencies whose channel is not declared"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(env) = &ctx.environment else {
            return vec![];
        };

        env.conda_dependencies()
            .filter_map(|(dependency, spec)| {
                let channel = spec.channel_name()?;
                if env.declares_channel(channel) {
                    return None;
                }
                Some(
                    self.diagnostic(format!(
                        "'{}' requests channel '{}', which is not listed under channels",
                        spec.name, channel
                    ))
                    .with_span_opt(ctx.dependency_span(dependency))
                    .with_suggestion(format!("Add '- {}' to channels", channel)),
                )
            })
            .collect()
    }
}

/// Warns when the environment declares no channels at all.
pub struct EmptyChannelsRule;

impl LintRule for EmptyChannelsRule {
    fn id(&self) -> RuleId {
        RuleId::new("empty-channels")
    }

    fn name(&self) -> &str {
        "Empty Channels"
    }

    fn description(&self) -> &str {
        "Warns when no channels are declared, leaving resolution to the user's conda config"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        match &ctx.environment {
            Some(env) if env.channels.is_empty() => vec![self
                .diagnostic("No channels declared".to_string())
                .with_span(ctx.environment_file_span())
                .with_suggestion("Declare channels explicitly, for example '- conda-forge'")],
            _ => vec![],
        }
    }
}
