//! Lint command implementation.
//!
//! The `envdoc lint` command checks the manifests with the lint rule system.

use std::path::{Path, PathBuf};

use crate::cli::args::LintArgs;
use crate::config::{severity_overrides, PathOverrides, SETTINGS_FILE};
use crate::error::Result;
use crate::lint::{
    HumanFormatter, JsonFormatter, LintDiagnostic, LintFormatter, OutputFormat, RuleRegistry,
    SarifFormatter, Severity,
};
use crate::ui::{should_use_colors, UserInterface};

use super::dispatcher::{load_project, Command, CommandResult};

/// The lint command implementation.
pub struct LintCommand {
    project_root: PathBuf,
    overrides: PathOverrides,
    args: LintArgs,
}

impl LintCommand {
    /// Create a new lint command.
    pub fn new(project_root: &Path, overrides: PathOverrides, args: LintArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            overrides,
            args,
        }
    }

    /// Format diagnostics using the requested formatter.
    fn format_output(&self, diagnostics: &[LintDiagnostic], registry: &RuleRegistry) -> String {
        let mut output = Vec::new();

        match self.args.format {
            OutputFormat::Json => {
                JsonFormatter::new().format(diagnostics, &mut output).ok();
            }
            OutputFormat::Sarif => {
                SarifFormatter::new("envdoc", env!("CARGO_PKG_VERSION"))
                    .with_rules(registry)
                    .format(diagnostics, &mut output)
                    .ok();
            }
            OutputFormat::Human => {
                HumanFormatter::new(should_use_colors())
                    .format(diagnostics, &mut output)
                    .ok();
            }
        }

        String::from_utf8(output).unwrap_or_default()
    }
}

impl Command for LintCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = match load_project(&self.project_root, &self.overrides, ui)? {
            Ok(project) => project,
            Err(result) => return Ok(result),
        };

        let registry = RuleRegistry::with_builtins();
        let settings_path = project
            .paths
            .settings
            .clone()
            .unwrap_or_else(|| self.project_root.join(SETTINGS_FILE));
        let overrides = match severity_overrides(&project.settings, &registry, &settings_path) {
            Ok(overrides) => overrides,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        let diagnostics = registry.run(&project.lint_context(), &overrides);
        tracing::debug!("Lint produced {} diagnostic(s)", diagnostics.len());

        let strict = self.args.strict || project.settings.strict;
        let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
        let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);
        let should_fail = has_errors || (strict && has_warnings);

        match self.args.format {
            OutputFormat::Human if diagnostics.is_empty() => {
                let checked: Vec<String> = [
                    project.environment_display_path(),
                    project.docs_display_path(),
                ]
                .into_iter()
                .flatten()
                .map(|p| p.display().to_string())
                .collect();
                ui.success(&format!("No problems found in {}", checked.join(" and ")));
            }
            OutputFormat::Human => {
                for line in self.format_output(&diagnostics, &registry).lines() {
                    ui.message(line);
                }
            }
            OutputFormat::Json | OutputFormat::Sarif => {
                let output = self.format_output(&diagnostics, &registry);
                ui.message(output.trim_end());
            }
        }

        if should_fail {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(env: &str, docs: Option<&str>) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("environment-dev.yml"), env).unwrap();
        if let Some(docs) = docs {
            fs::write(temp.path().join(".readthedocs.yml"), docs).unwrap();
        }
        temp
    }

    fn run(temp: &TempDir, args: LintArgs) -> (CommandResult, MockUI) {
        let cmd = LintCommand::new(temp.path(), PathOverrides::default(), args);
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    const CLEAN_ENV: &str =
        "name: docs\nchannels:\n  - conda-forge\ndependencies:\n  - python=3.10\n";

    #[test]
    fn clean_project_succeeds() {
        let temp = setup_project(CLEAN_ENV, None);
        let (result, ui) = run(&temp, LintArgs::default());

        assert!(result.success);
        assert!(ui.has_success("environment-dev.yml"));
    }

    #[test]
    fn errors_exit_1() {
        let temp = setup_project(
            "name: docs\nchannels:\n  - conda-forge\ndependencies:\n  - pyg::pyg\n",
            None,
        );
        let (result, ui) = run(&temp, LintArgs::default());

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_message("error[undeclared-channel]"));
        assert!(ui.has_message("environment-dev.yml:5"));
    }

    #[test]
    fn warnings_pass_unless_strict() {
        let env = "channels:\n  - conda-forge\ndependencies:\n  - python\n";
        let temp = setup_project(env, None);

        let (result, ui) = run(&temp, LintArgs::default());
        assert!(result.success);
        assert!(ui.has_message("missing-environment-name"));

        let strict = LintArgs {
            strict: true,
            ..Default::default()
        };
        let (result, _) = run(&temp, strict);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn settings_can_turn_rules_off() {
        let env = "channels:\n  - conda-forge\ndependencies:\n  - python\n";
        let temp = setup_project(env, None);
        fs::write(
            temp.path().join(".envdoc.yml"),
            "strict: true\nrules:\n  missing-environment-name: off\n",
        )
        .unwrap();

        let (result, _) = run(&temp, LintArgs::default());
        assert!(result.success);
    }

    #[test]
    fn unknown_rule_in_settings_fails() {
        let temp = setup_project(CLEAN_ENV, None);
        fs::write(temp.path().join(".envdoc.yml"), "rules:\n  made-up: off\n").unwrap();

        let (result, ui) = run(&temp, LintArgs::default());
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("made-up"));
    }

    #[test]
    fn json_output_is_valid() {
        let temp = setup_project(
            CLEAN_ENV,
            Some("version: 1\nbuild:\n  os: ubuntu-22.04\n  tools:\n    python: \"3.10\"\n"),
        );
        let args = LintArgs {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let (result, ui) = run(&temp, args);

        assert_eq!(result.exit_code, 1);
        let json: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(json["summary"]["errors"], 1);
    }

    #[test]
    fn sarif_describes_fired_rules() {
        let temp = setup_project("channels:\n  - conda-forge\ndependencies:\n  - python\n", None);
        let args = LintArgs {
            format: OutputFormat::Sarif,
            ..Default::default()
        };
        let (result, ui) = run(&temp, args);

        assert!(result.success);
        let sarif: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(sarif["version"], "2.1.0");
        let rule = &sarif["runs"][0]["tool"]["driver"]["rules"][0];
        assert_eq!(rule["id"], "missing-environment-name");
        assert_eq!(rule["name"], "Missing Environment Name");
    }
}
