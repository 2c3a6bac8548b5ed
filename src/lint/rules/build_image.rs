//! Configuration version, build image and tool pins of the docs manifest.

use crate::lint::{LintContext, LintDiagnostic, LintRule, RuleId, Severity};
use crate::manifest::tools;

/// Requires `version: 2`.
pub struct ConfigVersionRule;

impl LintRule for ConfigVersionRule {
    fn id(&self) -> RuleId {
        RuleId::new("config-version")
    }

    fn name(&self) -> &str {
        "Config Version"
    }

    fn description(&self) -> &str {
        "Requires the docs manifest to declare configuration version 2"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(docs) = &ctx.docs else {
            return vec![];
        };
        match docs.version_string() {
            Some(version) if version == "2" => vec![],
            Some(version) => vec![self
                .diagnostic(format!("Unsupported configuration version '{}'", version))
                .with_span(
                    ctx.docs_key_span("version:")
                        .unwrap_or_else(|| ctx.docs_file_span()),
                )
                .with_suggestion("Set 'version: 2'")],
            None => vec![self
                .diagnostic("Docs manifest does not declare 'version'".to_string())
                .with_span(ctx.docs_file_span())
                .with_suggestion("Add 'version: 2' at the top of the file")],
        }
    }
}

/// Requires `build.os` to name an available build image.
pub struct UnsupportedOsRule;

impl LintRule for UnsupportedOsRule {
    fn id(&self) -> RuleId {
        RuleId::new("unsupported-os")
    }

    fn name(&self) -> &str {
        "Unsupported OS"
    }

    fn description(&self) -> &str {
        "Requires build.os to be an image the docs build service provides"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(os) = ctx.docs.as_ref().and_then(|d| d.build.os.as_deref()) else {
            return vec![];
        };
        if tools::is_supported_os(os) {
            return vec![];
        }
        vec![self
            .diagnostic(format!("Build image '{}' is not supported", os))
            .with_span_opt(ctx.docs_nested_key_span("os:"))
            .with_suggestion(format!(
                "Use one of: {}",
                tools::SUPPORTED_OS.join(", ")
            ))]
    }
}

/// Requires every `build.tools` pin to be a version the service offers.
pub struct UnsupportedToolVersionRule;

impl LintRule for UnsupportedToolVersionRule {
    fn id(&self) -> RuleId {
        RuleId::new("unsupported-tool-version")
    }

    fn name(&self) -> &str {
        "Unsupported Tool Version"
    }

    fn description(&self) -> &str {
        "Requires build.tools pins to be versions the docs build service provides"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(docs) = &ctx.docs else {
            return vec![];
        };

        let mut diagnostics = Vec::new();
        for (tool, pin) in &docs.build.tools {
            let version = pin.as_string();
            let span = ctx.docs_nested_key_span(&format!("{}:", tool));

            let Some(supported) = tools::supported_versions(tool) else {
                diagnostics.push(
                    self.diagnostic(format!("Unknown build tool '{}'", tool))
                        .with_span_opt(span),
                );
                continue;
            };
            if supported.contains(&version.as_str()) {
                continue;
            }

            let mut diagnostic = self
                .diagnostic(format!(
                    "{} version '{}' is not supported by the docs build service",
                    tool, version
                ))
                .with_span_opt(span);
            diagnostic = if pin.is_number() {
                diagnostic.with_suggestion(format!(
                    "The pin was read as the number {}; quote it as a string",
                    version
                ))
            } else {
                diagnostic.with_suggestion(format!("Use one of: {}", supported.join(", ")))
            };
            diagnostics.push(diagnostic);
        }
        diagnostics
    }
}

/// Requires tool pins whenever a build image is selected.
pub struct MissingBuildToolsRule;

impl LintRule for MissingBuildToolsRule {
    fn id(&self) -> RuleId {
        RuleId::new("missing-build-tools")
    }

    fn name(&self) -> &str {
        "Missing Build Tools"
    }

    fn description(&self) -> &str {
        "Requires build.tools when build.os is set"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &LintContext) -> Vec<LintDiagnostic> {
        let Some(docs) = &ctx.docs else {
            return vec![];
        };
        if docs.build.os.is_none() || !docs.build.tools.is_empty() {
            return vec![];
        }
        vec![self
            .diagnostic("'build.os' is set but 'build.tools' is empty".to_string())
            .with_span_opt(ctx.docs_nested_key_span("os:"))
            .with_suggestion("Pin at least one tool, for example 'python: \"3.11\"'")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DocsManifest;
    use std::path::Path;

    fn ctx(content: &str) -> LintContext {
        let docs = DocsManifest::parse(content, Path::new(".readthedocs.yml")).unwrap();
        LintContext::new(".").with_docs(docs, ".readthedocs.yml", Some(content.to_string()))
    }

    #[test]
    fn version_two_passes() {
        assert!(ConfigVersionRule.check(&ctx("version: 2\n")).is_empty());
        assert!(ConfigVersionRule.check(&ctx("version: \"2\"\n")).is_empty());
    }

    #[test]
    fn version_one_or_missing_fails() {
        let diagnostics = ConfigVersionRule.check(&ctx("version: 1\n"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("'1'"));

        let diagnostics = ConfigVersionRule.check(&ctx("formats: all\n"));
        assert!(diagnostics[0].message.contains("does not declare"));
    }

    #[test]
    fn detects_unsupported_os() {
        let diagnostics = UnsupportedOsRule.check(&ctx(
            "version: 2\nbuild:\n  os: ubuntu-18.04\n  tools:\n    python: \"3.10\"\n",
        ));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span.as_ref().unwrap().start_line, 3);

        assert!(UnsupportedOsRule
            .check(&ctx("build:\n  os: ubuntu-22.04\n"))
            .is_empty());
    }

    #[test]
    fn supported_tool_versions_pass() {
        let ctx = ctx(
            "build:\n  os: ubuntu-22.04\n  tools:\n    python: \"3.10\"\n    nodejs: \"20\"\n",
        );
        assert!(UnsupportedToolVersionRule.check(&ctx).is_empty());
    }

    #[test]
    fn unquoted_float_pin_gets_quoting_hint() {
        let ctx = ctx("build:\n  os: ubuntu-22.04\n  tools:\n    python: 3.10\n");
        let diagnostics = UnsupportedToolVersionRule.check(&ctx);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("'3.1'"));
        assert!(diagnostics[0].suggestion.as_ref().unwrap().contains("quote"));
        assert_eq!(diagnostics[0].span.as_ref().unwrap().start_line, 4);
    }

    #[test]
    fn unknown_tool_and_version() {
        let ctx = ctx(
            "build:\n  os: ubuntu-22.04\n  tools:\n    python: \"2.6\"\n    perl: \"5\"\n",
        );
        let diagnostics = UnsupportedToolVersionRule.check(&ctx);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().any(|d| d.message.contains("Unknown build tool 'perl'")));
    }

    #[test]
    fn os_without_tools() {
        let diagnostics = MissingBuildToolsRule.check(&ctx("build:\n  os: ubuntu-22.04\n"));
        assert_eq!(diagnostics.len(), 1);

        assert!(MissingBuildToolsRule
            .check(&ctx("version: 2\n"))
            .is_empty());
    }
}
