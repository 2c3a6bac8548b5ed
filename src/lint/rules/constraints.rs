//! Repeated packages and unsatisfiable version constraints.

use std::collections::BTreeMap;

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};
use crate::manifest::{Dependency, EnvironmentManifest};

/// Entries grouped by normalized package name, in file order.
fn by_package(env: &EnvironmentManifest) -> BTreeMap<String, Vec<&Dependency>> {
    let mut packages: BTreeMap<String, Vec<&Dependency>> = BTreeMap::new();
    for dependency in &env.dependencies {
        if let Some(name) = dependency.normalized_name() {
            packages.entry(name).or_default().push(dependency);
        }
    }
    packages
}

fn conflicts(a: &Dependency, b: &Dependency) -> bool {
    a.constraint().intersect(b.constraint()).is_empty()
}

/// Detects a package whose entries can't all be satisfied at once.
pub struct ConflictingConstraintsRule;

impl LintRule for ConflictingConstraintsRule {
    fn id(&self) -> RuleId {
        RuleId::new("conflicting-constraints")
    }

    fn name(&self) -> &str {
        "Conflicting Constraints"
    }

    fn description(&self) -> &str {
        "Detects packages whose version constraints have no version in common"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(env) = &ctx.environment else {
            return vec![];
        };

        let mut diagnostics = Vec::new();
        for (name, entries) in by_package(env) {
            for (i, later) in entries.iter().enumerate() {
                if later.constraint().is_empty() {
                    diagnostics.push(
                        self.diagnostic(format!(
                            "'{}' can never be satisfied: no version matches '{}'",
                            name,
                            later.as_str()
                        ))
                        .with_span_opt(ctx.dependency_span(later)),
                    );
                    continue;
                }
                for earlier in &entries[..i] {
                    if earlier.constraint().is_empty() || !conflicts(earlier, later) {
                        continue;
                    }
                    let mut diagnostic = self
                        .diagnostic(format!(
                            "'{}' has conflicting constraints: '{}' ({}) and '{}' ({})",
                            name,
                            earlier.as_str(),
                            earlier.installer(),
                            later.as_str(),
                            later.installer()
                        ))
                        .with_span_opt(ctx.dependency_span(later))
                        .with_suggestion("Keep a single entry with a satisfiable constraint");
                    if let Some(span) = ctx.dependency_span(earlier) {
                        diagnostic = diagnostic.with_related(span, "first constrained here");
                    }
                    diagnostics.push(diagnostic);
                }
            }
        }
        diagnostics
    }
}

/// Warns about a package listed more than once with compatible constraints.
pub struct DuplicateDependencyRule;

impl LintRule for DuplicateDependencyRule {
    fn id(&self) -> RuleId {
        RuleId::new("duplicate-dependency")
    }

    fn name(&self) -> &str {
        "Duplicate Dependency"
    }

    fn description(&self) -> &str {
        "Warns when a package is listed more than once"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(env) = &ctx.environment else {
            return vec![];
        };

        by_package(env)
            .into_iter()
            .filter(|(_, entries)| entries.len() > 1)
            .filter(|(_, entries)| {
                // Conflicts are reported by conflicting-constraints instead.
                entries.iter().enumerate().all(|(i, later)| {
                    !later.constraint().is_empty()
                        && entries[..i].iter().all(|earlier| !conflicts(earlier, later))
                })
            })
            .map(|(name, entries)| {
                let first = entries[0];
                let mut diagnostic = self
                    .diagnostic(format!(
                        "'{}' is listed {} times",
                        name,
                        entries.len()
                    ))
                    .with_span_opt(ctx.dependency_span(entries[entries.len() - 1]))
                    .with_suggestion(format!("Keep one entry for '{}'", name));
                if let Some(span) = ctx.dependency_span(first) {
                    diagnostic = diagnostic.with_related(
                        span,
                        format!("first listed here as '{}'", first.as_str()),
                    );
                }
                diagnostic
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn ctx(content: &str) -> LintContext {
        let env = EnvironmentManifest::parse(content, Path::new("environment-dev.yml")).unwrap();
        LintContext::new(".").with_environment(env, "environment-dev.yml")
    }

    #[test]
    fn detects_conflict_across_installers() {
        let ctx = ctx(
            "dependencies:\n  - conda-forge::numpy >=1.24\n  - pip\n  - pip:\n      - numpy<1.20\n",
        );
        let diagnostics = ConflictingConstraintsRule.check(&ctx);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("conflicting constraints"));
        assert_eq!(diagnostics[0].span.as_ref().unwrap().start_line, 5);
        assert_eq!(diagnostics[0].related[0].span.start_line, 2);
        assert!(DuplicateDependencyRule.check(&ctx).is_empty());
    }

    #[test]
    fn compatible_duplicates_only_warn() {
        let ctx = ctx("dependencies:\n  - numpy >=1.20\n  - numpy <2\n");
        assert!(ConflictingConstraintsRule.check(&ctx).is_empty());

        let diagnostics = DuplicateDependencyRule.check(&ctx);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("listed 2 times"));
    }

    #[test]
    fn names_are_normalized() {
        let ctx = ctx(
            "dependencies:\n  - sphinx_autodoc_typehints ==1.0\n  - pip:\n      - Sphinx-Autodoc-Typehints==2.0\n",
        );
        assert_eq!(ConflictingConstraintsRule.check(&ctx).len(), 1);
    }

    #[test]
    fn fuzzy_pin_against_exact() {
        let exact = ctx("dependencies:\n  - python=3.10\n  - python ==3.11\n");
        assert_eq!(ConflictingConstraintsRule.check(&exact).len(), 1);

        let ranged = ctx("dependencies:\n  - python=3.10\n  - python >=3.8\n");
        assert!(ConflictingConstraintsRule.check(&ranged).is_empty());
    }

    #[test]
    fn post_release_fits_below_next_patch() {
        let ctx = ctx(
            "dependencies:\n  - pip\n  - pip:\n      - tsdb==1.0.post1\n      - tsdb<1.0.1\n",
        );
        assert!(ConflictingConstraintsRule.check(&ctx).is_empty());
        assert_eq!(DuplicateDependencyRule.check(&ctx).len(), 1);
    }

    #[test]
    fn unsatisfiable_single_entry() {
        let ctx = ctx("dependencies:\n  - scipy >=2,<1\n");
        let diagnostics = ConflictingConstraintsRule.check(&ctx);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("never be satisfied"));
    }

    #[test]
    fn unconstrained_duplicates_warn() {
        let ctx = ctx("dependencies:\n  - h5py\n  - pip:\n      - h5py\n");
        assert_eq!(DuplicateDependencyRule.check(&ctx).len(), 1);
    }
}
