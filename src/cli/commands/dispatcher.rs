//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, LintArgs};
use crate::config::{PathOverrides, Project};
use crate::error::{EnvdocError, Result};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Exit code when no manifest could be found.
pub const EXIT_NO_MANIFEST: i32 = 2;

/// Load the project, reporting parse errors through the UI.
///
/// Returns `Ok(Err(result))` when the command should stop with `result`.
pub(crate) fn load_project(
    project_root: &Path,
    overrides: &PathOverrides,
    ui: &mut dyn UserInterface,
) -> Result<std::result::Result<Project, CommandResult>> {
    match Project::load(project_root, overrides) {
        Ok(project) if !project.has_manifests() => {
            ui.error("No environment or docs manifest found");
            ui.show_hint(
                "Looked for environment-dev.yml, environment.yml, environment.yaml, \
                 .readthedocs.yaml and .readthedocs.yml; use --env-file or --docs-file",
            );
            Ok(Err(CommandResult::failure(EXIT_NO_MANIFEST)))
        }
        Ok(project) => Ok(Ok(project)),
        Err(EnvdocError::ManifestNotFound { path }) => {
            ui.error(&format!("Manifest not found: {}", path.display()));
            Ok(Err(CommandResult::failure(EXIT_NO_MANIFEST)))
        }
        Err(
            e @ (EnvdocError::ManifestParseError { .. }
            | EnvdocError::InvalidRequirement { .. }
            | EnvdocError::SettingsError { .. }),
        ) => {
            ui.error(&e.to_string());
            Ok(Err(CommandResult::failure(1)))
        }
        Err(e) => Err(e),
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    overrides: PathOverrides,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf, overrides: PathOverrides) -> Self {
        Self {
            project_root,
            overrides,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let root = &self.project_root;
        let overrides = self.overrides.clone();
        match &cli.command {
            Some(Commands::Lint(args)) => {
                super::lint::LintCommand::new(root, overrides, args.clone()).execute(ui)
            }
            Some(Commands::Show(args)) => {
                super::show::ShowCommand::new(root, overrides, args.clone()).execute(ui)
            }
            Some(Commands::Fmt(args)) => {
                super::fmt::FmtCommand::new(root, overrides, args.clone()).execute(ui)
            }
            Some(Commands::Replay(args)) => {
                super::replay::ReplayCommand::new(root, overrides, args.clone()).execute(ui)
            }
            Some(Commands::Jobs(args)) => {
                super::jobs::JobsCommand::new(root, overrides, args.clone()).execute(ui)
            }
            Some(Commands::Schema(args)) => {
                super::schema::SchemaCommand::new(args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => {
                super::lint::LintCommand::new(root, overrides, LintArgs::default()).execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn no_manifest_exits_2() {
        let temp = TempDir::new().unwrap();
        let dispatcher =
            CommandDispatcher::new(temp.path().to_path_buf(), PathOverrides::default());
        let cli = Cli::parse_from(["envdoc", "lint"]);
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();
        assert_eq!(result.exit_code, EXIT_NO_MANIFEST);
        assert!(ui.has_error("No environment or docs manifest"));
    }

    #[test]
    fn default_command_is_lint() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("environment.yml"),
            "name: docs\nchannels:\n  - conda-forge\ndependencies:\n  - python\n",
        )
        .unwrap();
        let dispatcher =
            CommandDispatcher::new(temp.path().to_path_buf(), PathOverrides::default());
        let cli = Cli::parse_from(["envdoc"]);
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();
        assert!(result.success);
        assert!(ui.has_success("No problems found"));
    }

    #[test]
    fn parse_error_exits_1() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".readthedocs.yml"), "build: [unclosed\n").unwrap();
        let dispatcher =
            CommandDispatcher::new(temp.path().to_path_buf(), PathOverrides::default());
        let cli = Cli::parse_from(["envdoc", "show"]);
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error(".readthedocs.yml"));
    }
}
