//! Jobs command implementation.
//!
//! The `envdoc jobs` command runs the docs build's job phases locally, in
//! the order the hosted build runs them.

use std::path::{Path, PathBuf};

use crate::cli::args::JobsArgs;
use crate::config::PathOverrides;
use crate::error::{EnvdocError, Result};
use crate::shell::{JobFilter, JobRunner};
use crate::ui::{Prompt, UserInterface};

use super::dispatcher::{load_project, Command, CommandResult, EXIT_NO_MANIFEST};

/// The jobs command implementation.
pub struct JobsCommand {
    project_root: PathBuf,
    overrides: PathOverrides,
    args: JobsArgs,
}

impl JobsCommand {
    /// Create a new jobs command.
    pub fn new(project_root: &Path, overrides: PathOverrides, args: JobsArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            overrides,
            args,
        }
    }

    fn confirm(&self, count: usize, ui: &mut dyn UserInterface) -> Result<bool> {
        if self.args.dry_run || self.args.yes || !ui.is_interactive() {
            return Ok(true);
        }
        let prompt = Prompt::confirm(
            "run_jobs",
            &format!("Run {} build command(s) in {}?", count, self.project_root.display()),
            true,
        );
        Ok(ui.prompt(&prompt)?.as_bool())
    }
}

impl Command for JobsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = match load_project(&self.project_root, &self.overrides, ui)? {
            Ok(project) => project,
            Err(result) => return Ok(result),
        };
        let Some(docs) = &project.docs else {
            ui.error("No docs manifest found");
            ui.show_hint("Jobs come from .readthedocs.yml or --docs-file");
            return Ok(CommandResult::failure(EXIT_NO_MANIFEST));
        };

        let filter = JobFilter::only(self.args.phases.iter().copied());
        let planned = JobRunner::plan(docs, &filter);
        if planned.is_empty() {
            ui.success("No build jobs to run");
            return Ok(CommandResult::success());
        }

        if !self.confirm(planned.len(), ui)? {
            ui.warning("Cancelled");
            return Ok(CommandResult::failure(1));
        }

        let runner = JobRunner::new(&self.project_root).dry_run(self.args.dry_run);
        match runner.run(docs, &filter, ui) {
            Ok(report) if self.args.dry_run => {
                ui.success(&format!("{} command(s) planned", report.planned.len()));
                Ok(CommandResult::success())
            }
            Ok(report) => {
                ui.success(&format!("{} command(s) finished", report.executed));
                Ok(CommandResult::success())
            }
            Err(e @ EnvdocError::JobFailed { .. }) => {
                ui.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::JobPhase;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    const DOCS: &str = r#"version: 2
build:
  jobs:
    pre_install:
      - echo pre > pre.txt
    post_build:
      - echo built > built.txt
"#;

    fn project(docs: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".readthedocs.yml"), docs).unwrap();
        temp
    }

    fn run(temp: &TempDir, args: JobsArgs, ui: &mut MockUI) -> CommandResult {
        JobsCommand::new(temp.path(), PathOverrides::default(), args)
            .execute(ui)
            .unwrap()
    }

    #[test]
    fn dry_run_only_lists_commands() {
        let temp = project(DOCS);
        let mut ui = MockUI::new();
        let args = JobsArgs {
            dry_run: true,
            ..Default::default()
        };

        assert!(run(&temp, args, &mut ui).success);
        assert_eq!(ui.commands(), &["echo pre > pre.txt", "echo built > built.txt"]);
        assert!(ui.has_success("2 command(s) planned"));
        assert!(!temp.path().join("pre.txt").exists());
    }

    #[test]
    fn phase_filter_limits_commands() {
        let temp = project(DOCS);
        let mut ui = MockUI::new();
        let args = JobsArgs {
            phases: vec![JobPhase::PostBuild],
            dry_run: true,
            ..Default::default()
        };

        assert!(run(&temp, args, &mut ui).success);
        assert_eq!(ui.commands(), &["echo built > built.txt"]);
    }

    #[test]
    fn declined_prompt_cancels() {
        let temp = project(DOCS);
        let mut ui = MockUI::new();
        ui.set_interactive(true);
        ui.set_prompt_response("run_jobs", "no");

        let result = run(&temp, JobsArgs::default(), &mut ui);
        assert_eq!(result.exit_code, 1);
        assert_eq!(ui.prompts_shown(), &["run_jobs"]);
        assert!(ui.commands().is_empty());
    }

    #[test]
    fn empty_plan_succeeds() {
        let temp = project("version: 2\n");
        let mut ui = MockUI::new();

        assert!(run(&temp, JobsArgs::default(), &mut ui).success);
        assert!(ui.has_success("No build jobs"));
    }

    #[cfg(unix)]
    #[test]
    fn runs_jobs_in_project_root() {
        let temp = project(DOCS);
        let mut ui = MockUI::new();
        let args = JobsArgs {
            yes: true,
            ..Default::default()
        };

        assert!(run(&temp, args, &mut ui).success);
        assert!(temp.path().join("pre.txt").exists());
        assert!(temp.path().join("built.txt").exists());
        assert!(ui.has_success("2 command(s) finished"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_job_exits_1() {
        let temp = project("version: 2\nbuild:\n  jobs:\n    pre_build:\n      - exit 3\n");
        let mut ui = MockUI::new();

        let result = run(&temp, JobsArgs::default(), &mut ui);
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("pre_build"));
        assert!(ui.has_error("exit 3"));
    }
}
