//! Agreement between the docs build interpreter and the environment.

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};
use crate::manifest::tools;
use crate::version::VersionSet;

/// Warns when `build.tools.python` falls outside the environment's `python` constraint.
pub struct PythonVersionMismatchRule;

impl LintRule for PythonVersionMismatchRule {
    fn id(&self) -> RuleId {
        RuleId::new("python-version-mismatch")
    }

    fn name(&self) -> &str {
        "Python Version Mismatch"
    }

    fn description(&self) -> &str {
        "Warns when the docs build python pin is outside the environment's python constraint"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let (Some(env), Some(docs)) = (&ctx.environment, &ctx.docs) else {
            return vec![];
        };
        let Some(pin) = docs.build.tools.get("python").map(|p| p.as_string()) else {
            return vec![];
        };
        if pin == "latest" || tools::is_conda_python(&pin) {
            return vec![];
        }
        // A pin like "3.10" selects the newest 3.10.x.
        let Ok(pinned) = VersionSet::parse(&format!("={}", pin)) else {
            return vec![];
        };

        env.conda_dependencies()
            .filter(|(_, spec)| spec.normalized_name() == "python")
            .filter(|(dependency, _)| dependency.constraint().intersect(&pinned).is_empty())
            .map(|(dependency, spec)| {
                let mut diagnostic = self
                    .diagnostic(format!(
                        "Docs build uses python {} but the environment requires '{}'",
                        pin,
                        spec.as_str()
                    ))
                    .with_span_opt(ctx.docs_nested_key_span("python:"))
                    .with_suggestion("Align build.tools.python with the environment's python pin");
                if let Some(span) = ctx.dependency_span(dependency) {
                    diagnostic = diagnostic.with_related(span, "environment python constraint");
                }
                diagnostic
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{DocsManifest, EnvironmentManifest};
    use std::path::Path;

    fn check(env: &str, docs: &str) -> Vec<LintDiagnostic> {
        let env = EnvironmentManifest::parse(env, Path::new("environment-dev.yml")).unwrap();
        let docs_manifest = DocsManifest::parse(docs, Path::new(".readthedocs.yml")).unwrap();
        let ctx = LintContext::new(".")
            .with_environment(env, "environment-dev.yml")
            .with_docs(docs_manifest, ".readthedocs.yml", Some(docs.to_string()));
        PythonVersionMismatchRule.check(&ctx)
    }

    const DOCS: &str = "build:\n  os: ubuntu-22.04\n  tools:\n    python: \"3.10\"\n";

    #[test]
    fn compatible_pin_passes() {
        assert!(check("dependencies:\n  - conda-forge::python >=3.8\n", DOCS).is_empty());
        assert!(check("dependencies:\n  - python=3.10\n", DOCS).is_empty());
    }

    #[test]
    fn detects_mismatch() {
        let diagnostics = check("dependencies:\n  - python >=3.11\n", DOCS);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span.as_ref().unwrap().start_line, 4);
        assert_eq!(diagnostics[0].related[0].span.start_line, 2);
    }

    #[test]
    fn conda_interpreters_are_skipped() {
        let docs = "build:\n  os: ubuntu-22.04\n  tools:\n    python: mambaforge-22.9\n";
        assert!(check("dependencies:\n  - python >=3.11\n", docs).is_empty());
    }

    #[test]
    fn needs_both_manifests() {
        let env = EnvironmentManifest::parse("dependencies:\n  - python <3\n", Path::new("e.yml"))
            .unwrap();
        let ctx = LintContext::new(".").with_environment(env, "e.yml");
        assert!(PythonVersionMismatchRule.check(&ctx).is_empty());
    }
}
