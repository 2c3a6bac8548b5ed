//! Build-job execution.
//!
//! Runs the docs manifest's job phases in order, the way the hosted build
//! does: every command of a phase in sequence, stopping the whole run at the
//! first non-zero exit.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{EnvdocError, Result};
use crate::manifest::{DocsManifest, JobPhase};
use crate::ui::UserInterface;

use super::command::{execute, CommandOptions};

/// Lines of captured output shown when a job fails.
const FAILURE_TAIL_LINES: usize = 20;

/// Which phases to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    phases: Vec<JobPhase>,
}

impl JobFilter {
    /// Every phase.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only the given phases. An empty list means every phase.
    pub fn only(phases: impl IntoIterator<Item = JobPhase>) -> Self {
        Self {
            phases: phases.into_iter().collect(),
        }
    }

    pub fn includes(&self, phase: JobPhase) -> bool {
        self.phases.is_empty() || self.phases.contains(&phase)
    }
}

/// One command scheduled to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJob {
    pub phase: JobPhase,
    /// 0-based position within the phase.
    pub index: usize,
    pub command: String,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct JobReport {
    pub planned: Vec<PlannedJob>,
    /// Commands actually executed (zero for a dry run).
    pub executed: usize,
}

/// Runs build jobs from a project root.
#[derive(Debug, Clone)]
pub struct JobRunner {
    project_root: PathBuf,
    dry_run: bool,
}

impl JobRunner {
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            dry_run: false,
        }
    }

    /// Print commands instead of executing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The commands a run would execute, in order.
    pub fn plan(docs: &DocsManifest, filter: &JobFilter) -> Vec<PlannedJob> {
        docs.ordered_commands()
            .into_iter()
            .filter(|(phase, _)| filter.includes(*phase))
            .flat_map(|(phase, commands)| {
                commands
                    .into_iter()
                    .enumerate()
                    .map(move |(index, command)| PlannedJob {
                        phase,
                        index,
                        command,
                    })
            })
            .collect()
    }

    /// Variables the hosted build exports to job commands.
    fn job_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("READTHEDOCS".to_string(), "True".to_string());
        env.insert(
            "READTHEDOCS_OUTPUT".to_string(),
            self.project_root
                .join("_readthedocs")
                .to_string_lossy()
                .to_string(),
        );
        env
    }

    /// Run the selected phases in order.
    ///
    /// # Errors
    ///
    /// Returns `JobFailed` for the first command that exits non-zero, and
    /// `CommandFailed` if the shell can't be started.
    pub fn run(
        &self,
        docs: &DocsManifest,
        filter: &JobFilter,
        ui: &mut dyn UserInterface,
    ) -> Result<JobReport> {
        let planned = Self::plan(docs, filter);
        if !docs.build.commands.is_empty() {
            ui.warning("build.commands replaces the job phases and is not run by envdoc");
        }

        let verbose = ui.output_mode().shows_command_output();
        let options = CommandOptions {
            cwd: Some(self.project_root.clone()),
            env: self.job_env(),
            capture_stdout: !verbose,
            capture_stderr: !verbose,
        };

        let mut executed = 0;
        let mut current_phase = None;
        for job in &planned {
            if current_phase != Some(job.phase) {
                ui.show_header(job.phase.as_str());
                current_phase = Some(job.phase);
            }
            ui.show_command(&job.command);
            if self.dry_run {
                continue;
            }

            let mut spinner = ui.start_spinner(&format!("{} #{}", job.phase, job.index + 1));
            let result = match execute(&job.command, &options) {
                Ok(result) => result,
                Err(e) => {
                    spinner.finish_error(&format!(
                        "{} #{} could not start",
                        job.phase,
                        job.index + 1
                    ));
                    return Err(e);
                }
            };
            executed += 1;

            if !result.success {
                spinner.finish_error(&format!(
                    "{} #{} exited with {:?}",
                    job.phase,
                    job.index + 1,
                    result.exit_code
                ));
                let output = format!("{}{}", result.stdout, result.stderr);
                let lines: Vec<&str> = output.lines().collect();
                let tail = &lines[lines.len().saturating_sub(FAILURE_TAIL_LINES)..];
                for line in tail {
                    ui.message(line);
                }
                return Err(EnvdocError::JobFailed {
                    phase: job.phase.to_string(),
                    command: job.command.clone(),
                    code: result.exit_code,
                });
            }
            spinner.finish_success(&format!(
                "{} #{} ({:.1}s)",
                job.phase,
                job.index + 1,
                result.duration.as_secs_f64()
            ));
            tracing::debug!("{} #{} finished", job.phase, job.index + 1);
        }

        Ok(JobReport { planned, executed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{MockUI, SpinnerFinish};
    use std::path::Path;
    use tempfile::TempDir;

    fn docs(content: &str) -> DocsManifest {
        DocsManifest::parse(content, Path::new(".readthedocs.yml")).unwrap()
    }

    const JOBS: &str = r#"version: 2
build:
  os: ubuntu-22.04
  tools:
    python: "3.10"
  jobs:
    post_install:
      - echo post > post.txt
    pre_install:
      - echo first > order.txt
      - echo second >> order.txt
python:
  install:
    - requirements: docs/requirements.txt
"#;

    #[test]
    fn plan_follows_phase_order() {
        let plan = JobRunner::plan(&docs(JOBS), &JobFilter::all());
        let phases: Vec<_> = plan.iter().map(|j| j.phase).collect();
        assert_eq!(
            phases,
            vec![
                JobPhase::PreInstall,
                JobPhase::PreInstall,
                JobPhase::Install,
                JobPhase::PostInstall
            ]
        );
        assert_eq!(plan[1].index, 1);
        assert_eq!(
            plan[2].command,
            "python -m pip install -r docs/requirements.txt"
        );
    }

    #[test]
    fn filter_selects_phases() {
        let plan = JobRunner::plan(&docs(JOBS), &JobFilter::only([JobPhase::PostInstall]));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].command, "echo post > post.txt");
    }

    #[test]
    fn dry_run_executes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let report = JobRunner::new(temp.path())
            .dry_run(true)
            .run(&docs(JOBS), &JobFilter::all(), &mut ui)
            .unwrap();

        assert_eq!(report.executed, 0);
        assert_eq!(report.planned.len(), 4);
        assert_eq!(ui.commands().len(), 4);
        assert!(!temp.path().join("order.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn runs_commands_in_order() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        JobRunner::new(temp.path())
            .run(
                &docs(JOBS),
                &JobFilter::only([JobPhase::PreInstall]),
                &mut ui,
            )
            .unwrap();

        let order = std::fs::read_to_string(temp.path().join("order.txt")).unwrap();
        assert_eq!(order, "first\nsecond\n");
        assert_eq!(ui.headers(), &["pre_install".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        let manifest = docs(
            r#"version: 2
build:
  jobs:
    pre_build:
      - echo broken >&2; exit 4
      - touch never.txt
"#,
        );
        let mut ui = MockUI::new();
        let err = JobRunner::new(temp.path())
            .run(&manifest, &JobFilter::all(), &mut ui)
            .unwrap_err();

        match err {
            EnvdocError::JobFailed {
                phase,
                command,
                code,
            } => {
                assert_eq!(phase, "pre_build");
                assert!(command.contains("exit 4"));
                assert_eq!(code, Some(4));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!temp.path().join("never.txt").exists());
        assert!(ui.has_message("broken"));
    }

    #[test]
    fn spinner_finishes_when_shell_cannot_start() {
        let temp = TempDir::new().unwrap();
        let manifest = docs("version: 2\nbuild:\n  jobs:\n    pre_build:\n      - echo hi\n");
        let mut ui = MockUI::new();
        let err = JobRunner::new(&temp.path().join("missing"))
            .run(&manifest, &JobFilter::all(), &mut ui)
            .unwrap_err();

        assert!(matches!(err, EnvdocError::CommandFailed { .. }));
        assert_eq!(ui.spinners().len(), 1);
        assert_eq!(
            ui.spinner_finishes(),
            vec![(SpinnerFinish::Error, "pre_build #1 could not start".to_string())]
        );
    }

    #[cfg(unix)]
    #[test]
    fn stops_with_finished_spinner_on_failure() {
        let temp = TempDir::new().unwrap();
        let manifest = docs("version: 2\nbuild:\n  jobs:\n    pre_build:\n      - exit 3\n");
        let mut ui = MockUI::new();
        JobRunner::new(temp.path())
            .run(&manifest, &JobFilter::all(), &mut ui)
            .unwrap_err();

        let finishes = ui.spinner_finishes();
        assert_eq!(finishes.len(), 1);
        assert_eq!(finishes[0].0, SpinnerFinish::Error);
    }

    #[cfg(unix)]
    #[test]
    fn exports_build_variables() {
        let temp = TempDir::new().unwrap();
        let manifest = docs(
            "version: 2\nbuild:\n  jobs:\n    post_build:\n      - echo $READTHEDOCS > rtd.txt\n",
        );
        JobRunner::new(temp.path())
            .run(&manifest, &JobFilter::all(), &mut MockUI::new())
            .unwrap();

        let value = std::fs::read_to_string(temp.path().join("rtd.txt")).unwrap();
        assert_eq!(value.trim(), "True");
    }
}
