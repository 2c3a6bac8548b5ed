//! Fmt command implementation.
//!
//! The `envdoc fmt` command prints the normalized form of each manifest,
//! after checking that the normalized text parses back to the same structure.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::FmtArgs;
use crate::config::PathOverrides;
use crate::error::{EnvdocError, Result};
use crate::manifest::{check_round_trip_docs, check_round_trip_environment};
use crate::ui::UserInterface;

use super::dispatcher::{load_project, Command, CommandResult};

/// The fmt command implementation.
pub struct FmtCommand {
    project_root: PathBuf,
    overrides: PathOverrides,
    args: FmtArgs,
}

impl FmtCommand {
    /// Create a new fmt command.
    pub fn new(project_root: &Path, overrides: PathOverrides, args: FmtArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            overrides,
            args,
        }
    }
}

impl Command for FmtCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = match load_project(&self.project_root, &self.overrides, ui)? {
            Ok(project) => project,
            Err(result) => return Ok(result),
        };

        let mut rendered: Vec<(PathBuf, PathBuf, Result<String>)> = Vec::new();
        if let (Some(env), Some(path)) = (&project.environment, &project.paths.environment) {
            let display = project.paths.display_path(path);
            let result = check_round_trip_environment(env, &display);
            rendered.push((path.clone(), display, result));
        }
        if let (Some(docs), Some(path)) = (&project.docs, &project.paths.docs) {
            let display = project.paths.display_path(path);
            let result = check_round_trip_docs(docs, &display);
            rendered.push((path.clone(), display, result));
        }

        let mut failed = false;
        for (path, display, result) in rendered {
            let text = match result {
                Ok(text) => text,
                Err(e @ EnvdocError::RoundTripMismatch { .. }) => {
                    ui.error(&e.to_string());
                    failed = true;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.args.check {
                let current = fs::read_to_string(&path)?;
                if current == text {
                    ui.success(&format!("{} is normalized", display.display()));
                } else {
                    ui.warning(&format!("{} is not normalized", display.display()));
                    failed = true;
                }
            } else {
                ui.show_header(&display.display().to_string());
                ui.message(text.trim_end());
            }
        }

        if failed {
            if self.args.check {
                ui.show_hint("Run 'envdoc fmt' to see the normalized form");
            }
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{render_environment, EnvironmentManifest};
    use crate::ui::MockUI;
    use tempfile::TempDir;

    const ENV: &str =
        "name: docs\nchannels: [conda-forge]\ndependencies:\n  - python=3.10\n  - pip\n";

    fn run(temp: &TempDir, check: bool) -> (CommandResult, MockUI) {
        let cmd = FmtCommand::new(temp.path(), PathOverrides::default(), FmtArgs { check });
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn prints_normalized_manifest() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("environment.yml"), ENV).unwrap();

        let (result, ui) = run(&temp, false);
        assert!(result.success);
        assert_eq!(ui.headers(), &["environment.yml".to_string()]);
        assert!(ui.has_message("  - conda-forge"));
    }

    #[test]
    fn check_flags_unnormalized_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("environment.yml"), ENV).unwrap();

        let (result, ui) = run(&temp, true);
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_warning("environment.yml is not normalized"));
    }

    #[test]
    fn check_accepts_normalized_file() {
        let temp = TempDir::new().unwrap();
        let manifest = EnvironmentManifest::parse(ENV, Path::new("environment.yml")).unwrap();
        let normalized = render_environment(&manifest).unwrap();
        fs::write(temp.path().join("environment.yml"), normalized).unwrap();

        let (result, ui) = run(&temp, true);
        assert!(result.success);
        assert!(ui.has_success("environment.yml is normalized"));
    }
}
