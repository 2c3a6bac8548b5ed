//! Replay command implementation.
//!
//! The `envdoc replay` command walks the docs build's install commands in
//! execution order and reports which install of each package wins.

use std::path::{Path, PathBuf};

use crate::cli::args::ReplayArgs;
use crate::config::PathOverrides;
use crate::error::Result;
use crate::replay::{replay, InstallTarget, ReplayReport};
use crate::ui::UserInterface;

use super::dispatcher::{load_project, Command, CommandResult, EXIT_NO_MANIFEST};

/// The replay command implementation.
pub struct ReplayCommand {
    project_root: PathBuf,
    overrides: PathOverrides,
    args: ReplayArgs,
}

impl ReplayCommand {
    /// Create a new replay command.
    pub fn new(project_root: &Path, overrides: PathOverrides, args: ReplayArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            overrides,
            args,
        }
    }

    fn show_report(&self, report: &ReplayReport, ui: &mut dyn UserInterface) {
        ui.show_header("Install order");
        for step in &report.steps {
            ui.message(&format!(
                "  {} #{}: {}",
                step.phase,
                step.command_index + 1,
                step.command
            ));
            for install in step.installs() {
                let targets: Vec<&str> = install
                    .targets
                    .iter()
                    .map(|target| match target {
                        InstallTarget::Package { requirement, .. } => requirement.as_str(),
                        InstallTarget::Opaque { target } => target.as_str(),
                    })
                    .collect();
                ui.message(&format!(
                    "      {} {} {}",
                    install.installer,
                    install.action,
                    targets.join(" ")
                ));
            }
        }

        if !report.final_state.is_empty() {
            ui.show_header("Final state");
            for (package, record) in &report.final_state {
                ui.message(&format!(
                    "  {:<24} {} ({} #{})",
                    package,
                    record.requirement,
                    record.phase,
                    record.command_index + 1
                ));
            }
        }

        for o in &report.overrides {
            let message = format!(
                "{} from {} #{} is {} by {} #{} ({})",
                o.previous.requirement,
                o.previous.phase,
                o.previous.command_index + 1,
                if o.removed { "removed" } else { "reinstalled" },
                o.current.phase,
                o.current.command_index + 1,
                o.current.requirement
            );
            if report.overridden_post_install().any(|flagged| flagged == o) {
                ui.warning(&message);
            } else {
                ui.message(&format!("  {}", message));
            }
        }
    }
}

impl Command for ReplayCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = match load_project(&self.project_root, &self.overrides, ui)? {
            Ok(project) => project,
            Err(result) => return Ok(result),
        };
        let Some(docs) = &project.docs else {
            ui.error("No docs manifest found");
            ui.show_hint("Replay needs .readthedocs.yml or --docs-file");
            return Ok(CommandResult::failure(EXIT_NO_MANIFEST));
        };

        let report = replay(docs);
        tracing::debug!(
            "Replayed {} command(s) with {} install(s)",
            report.steps.len(),
            report.install_count()
        );

        if self.args.json {
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        if report.steps.is_empty() {
            ui.success("No install commands to replay");
            return Ok(CommandResult::success());
        }
        self.show_report(&report, ui);
        Ok(CommandResult::success())
    }
}
