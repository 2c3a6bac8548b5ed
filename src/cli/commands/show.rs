//! Show command implementation.
//!
//! The `envdoc show` command prints the parsed manifests.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ShowArgs;
use crate::config::{PathOverrides, Project};
use crate::error::Result;
use crate::manifest::{DocsManifest, EnvironmentManifest};
use crate::ui::UserInterface;

use super::dispatcher::{load_project, Command, CommandResult};

/// The show command implementation.
pub struct ShowCommand {
    project_root: PathBuf,
    overrides: PathOverrides,
    args: ShowArgs,
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a EnvironmentManifest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    docs: Option<&'a DocsManifest>,
}

impl ShowCommand {
    /// Create a new show command.
    pub fn new(project_root: &Path, overrides: PathOverrides, args: ShowArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            overrides,
            args,
        }
    }

    fn show_environment(
        &self,
        project: &Project,
        env: &EnvironmentManifest,
        ui: &mut dyn UserInterface,
    ) {
        let path = project
            .environment_display_path()
            .unwrap_or_default()
            .display()
            .to_string();
        ui.show_header(&format!("Environment ({})", path));
        ui.message(&format!(
            "  name:     {}",
            env.name.as_deref().unwrap_or("(unnamed)")
        ));
        ui.message(&format!("  channels: {}", env.channels.join(", ")));

        let mut group = None;
        for dependency in &env.dependencies {
            if group != Some(&dependency.group) {
                ui.message(&format!("  [{}]", dependency.group));
                group = Some(&dependency.group);
            }
            ui.message(&format!(
                "    {:<5} {}",
                dependency.installer(),
                dependency.as_str()
            ));
        }
        if !env.variables.is_empty() {
            ui.message("  variables:");
            for (key, value) in &env.variables {
                ui.message(&format!("    {}={}", key, value));
            }
        }
    }

    fn show_docs(&self, project: &Project, docs: &DocsManifest, ui: &mut dyn UserInterface) {
        let path = project
            .docs_display_path()
            .unwrap_or_default()
            .display()
            .to_string();
        ui.show_header(&format!("Docs build ({})", path));
        ui.message(&format!(
            "  version: {}",
            docs.version_string().unwrap_or_else(|| "(unset)".to_string())
        ));
        if let Some(os) = &docs.build.os {
            ui.message(&format!("  os:      {}", os));
        }
        for (tool, version) in &docs.build.tools {
            ui.message(&format!("  tool:    {} {}", tool, version.as_string()));
        }
        if let Some(sphinx) = &docs.sphinx {
            ui.message(&format!(
                "  sphinx:  {}",
                sphinx.configuration.as_deref().unwrap_or("(default)")
            ));
        }
        if let Some(mkdocs) = &docs.mkdocs {
            ui.message(&format!(
                "  mkdocs:  {}",
                mkdocs.configuration.as_deref().unwrap_or("(default)")
            ));
        }
        if let Some(conda) = &docs.conda {
            ui.message(&format!("  conda:   {}", conda.environment));
        }
        for (phase, commands) in docs.ordered_commands() {
            if commands.is_empty() {
                continue;
            }
            ui.message(&format!("  {}:", phase));
            for command in commands {
                ui.message(&format!("    - {}", command));
            }
        }
    }
}

impl Command for ShowCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = match load_project(&self.project_root, &self.overrides, ui)? {
            Ok(project) => project,
            Err(result) => return Ok(result),
        };

        if self.args.json {
            let output = ShowOutput {
                environment: project.environment.as_ref(),
                docs: project.docs.as_ref(),
            };
            let json = serde_json::to_string_pretty(&output).map_err(anyhow::Error::from)?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        if let Some(env) = &project.environment {
            self.show_environment(&project, env, ui);
        }
        if let Some(docs) = &project.docs {
            self.show_docs(&project, docs, ui);
        }
        Ok(CommandResult::success())
    }
}
