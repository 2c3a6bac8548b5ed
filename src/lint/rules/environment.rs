//! Environment manifest structure.

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};

/// Warns when a `pip:` block is used but `pip` itself is not a conda dependency.
///
/// conda then relies on whatever pip happens to be on the path, which
/// installs into the wrong environment.
pub struct PipSectionWithoutPipRule;

impl LintRule for PipSectionWithoutPipRule {
    fn id(&self) -> RuleId {
        RuleId::new("pip-section-without-pip")
    }

    fn name(&self) -> &str {
        "Pip Section Without Pip"
    }

    fn description(&self) -> &str {
        "Warns when pip packages are listed without pip as a conda dependency"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(env) = &ctx.environment else {
            return vec![];
        };
        if !env.has_pip_section() {
            return vec![];
        }
        let has_pip = env
            .conda_dependencies()
            .any(|(_, spec)| spec.normalized_name() == "pip");
        if has_pip {
            return vec![];
        }

        let span = env
            .pip_dependencies()
            .find_map(|(dependency, _)| ctx.dependency_span(dependency));
        vec![self
            .diagnostic("A pip section is used but 'pip' is not a conda dependency".to_string())
            .with_span(span.unwrap_or_else(|| ctx.environment_file_span()))
            .with_suggestion("Add '- pip' to dependencies before the pip section")]
    }
}

/// Warns when the environment has no `name`.
pub struct MissingEnvironmentNameRule;

impl LintRule for MissingEnvironmentNameRule {
    fn id(&self) -> RuleId {
        RuleId::new("missing-environment-name")
    }

    fn name(&self) -> &str {
        "Missing Environment Name"
    }

    fn description(&self) -> &str {
        "Warns when the environment manifest does not name its environment"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        match &ctx.environment {
            Some(env) if env.name.as_deref().map_or(true, |n| n.trim().is_empty()) => {
                vec![self
                    .diagnostic("Environment manifest has no 'name'".to_string())
                    .with_span(ctx.environment_file_span())
                    .with_suggestion("Add a 'name:' key so 'conda env create' needs no -n flag")]
            }
            _ => vec![],
        }
    }
}
