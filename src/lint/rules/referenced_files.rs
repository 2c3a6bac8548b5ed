//! Files named by the docs manifest must exist.

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};
use crate::manifest::PythonInstall;

/// Warns about paths in the docs manifest that don't exist under the project root.
pub struct MissingReferencedFileRule;

impl LintRule for MissingReferencedFileRule {
    fn id(&self) -> RuleId {
        RuleId::new("missing-referenced-file")
    }

    fn name(&self) -> &str {
        "Missing Referenced File"
    }

    fn description(&self) -> &str {
        "Warns when a configuration, environment or requirements file named by the docs manifest is missing"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(docs) = &ctx.docs else {
            return vec![];
        };

        let mut references: Vec<(&str, &str, &str)> = Vec::new();
        if let Some(conf) = docs.sphinx.as_ref().and_then(|s| s.configuration.as_deref()) {
            references.push(("sphinx configuration", "configuration:", conf));
        }
        if let Some(conf) = docs.mkdocs.as_ref().and_then(|m| m.configuration.as_deref()) {
            references.push(("mkdocs configuration", "configuration:", conf));
        }
        if let Some(conda) = &docs.conda {
            references.push(("conda environment", "environment:", &conda.environment));
        }
        for install in docs.python.iter().flat_map(|p| &p.install) {
            match install {
                PythonInstall::Requirements { requirements } => {
                    references.push(("requirements file", "requirements:", requirements));
                }
                PythonInstall::Package { path, .. } => {
                    references.push(("package path", "path:", path));
                }
            }
        }

        references
            .into_iter()
            .filter(|(_, _, path)| !ctx.resolve(path).exists())
            .map(|(what, key, path)| {
                self.diagnostic(format!("The {} '{}' does not exist", what, path))
                    .with_span_opt(ctx.docs_key_span(key))
                    .with_suggestion(format!(
                        "Paths are relative to the project root ({})",
                        ctx.project_root.display()
                    ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DocsManifest;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const DOCS: &str = r#"version: 2
sphinx:
  configuration: docs/conf.py
conda:
  environment: environment-dev.yml
python:
  install:
    - requirements: docs/requirements.txt
    - path: .
"#;

    fn ctx(root: &Path) -> LintContext {
        let docs = DocsManifest::parse(DOCS, Path::new(".readthedocs.yml")).unwrap();
        LintContext::new(root).with_docs(docs, ".readthedocs.yml", Some(DOCS.to_string()))
    }

    #[test]
    fn reports_each_missing_file() {
        let temp = TempDir::new().unwrap();
        let diagnostics = MissingReferencedFileRule.check(&ctx(temp.path()));

        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics[0].message.contains("docs/conf.py"));
        assert_eq!(diagnostics[0].span.as_ref().unwrap().start_line, 3);
        assert!(diagnostics[2].message.contains("requirements file"));
    }

    #[test]
    fn existing_files_pass() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("docs/conf.py"), "").unwrap();
        fs::write(temp.path().join("docs/requirements.txt"), "").unwrap();
        fs::write(temp.path().join("environment-dev.yml"), "").unwrap();

        assert!(MissingReferencedFileRule.check(&ctx(temp.path())).is_empty());
    }
}
