//! Ordered replay of a docs build's install commands.

use serde::Serialize;
use std::collections::BTreeMap;

use super::command::{InstallCommand, PackageAction, ShellStep};
use crate::manifest::{DocsManifest, JobPhase};

/// Where a package's installed version came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRecord {
    /// Requirement as written in the command.
    pub requirement: String,
    pub phase: JobPhase,
    /// Position of the command within its phase, from 0.
    pub command_index: usize,
    pub command: String,
}

/// One build command and what it installs.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub phase: JobPhase,
    pub command_index: usize,
    pub command: String,
    pub parts: Vec<ShellStep>,
}

impl ReplayStep {
    /// The install invocations within this command.
    pub fn installs(&self) -> impl Iterator<Item = &InstallCommand> {
        self.parts.iter().filter_map(|part| match part {
            ShellStep::Install(install) => Some(install),
            ShellStep::Other { .. } => None,
        })
    }
}

/// A later command reinstalling or removing a package an earlier command installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Override {
    pub package: String,
    pub previous: InstallRecord,
    pub current: InstallRecord,
    /// The later command uninstalled the package instead of reinstalling it.
    pub removed: bool,
}

/// Result of replaying every phase in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    /// Normalized package name to the install that ends up in effect.
    pub final_state: BTreeMap<String, InstallRecord>,
    pub overrides: Vec<Override>,
}

impl ReplayReport {
    /// Overrides that undo a `post_install` correction from a later phase.
    ///
    /// Reinstalls inside `post_install` itself are left alone: that phase is
    /// where corrective pins are ordered.
    pub fn overridden_post_install(&self) -> impl Iterator<Item = &Override> {
        self.overrides.iter().filter(|o| {
            o.previous.phase == JobPhase::PostInstall && o.current.phase != JobPhase::PostInstall
        })
    }

    /// Number of install invocations seen. Removals are not counted.
    pub fn install_count(&self) -> usize {
        self.steps
            .iter()
            .flat_map(ReplayStep::installs)
            .filter(|install| install.action == PackageAction::Install)
            .count()
    }
}

/// Replay the manifest's commands in execution order.
pub fn replay(manifest: &DocsManifest) -> ReplayReport {
    let mut report = ReplayReport::default();

    for (phase, commands) in manifest.ordered_commands() {
        for (command_index, command) in commands.into_iter().enumerate() {
            let parts = InstallCommand::parse(&command);

            for install in parts.iter().filter_map(|p| match p {
                ShellStep::Install(install) => Some(install),
                ShellStep::Other { .. } => None,
            }) {
                for (name, requirement) in install.packages() {
                    let record = InstallRecord {
                        requirement: requirement.to_string(),
                        phase,
                        command_index,
                        command: command.clone(),
                    };
                    let removed = install.action == PackageAction::Remove;
                    let previous = if removed {
                        report.final_state.remove(name)
                    } else {
                        report.final_state.insert(name.to_string(), record.clone())
                    };
                    if let Some(previous) = previous {
                        tracing::debug!(
                            "{} {} by {} command {} (was {} command {})",
                            name,
                            if removed { "removed" } else { "reinstalled" },
                            phase,
                            command_index + 1,
                            previous.phase,
                            previous.command_index + 1
                        );
                        report.overrides.push(Override {
                            package: name.to_string(),
                            previous,
                            current: record,
                            removed,
                        });
                    }
                }
            }

            report.steps.push(ReplayStep {
                phase,
                command_index,
                command,
                parts,
            });
        }
    }

    report
}
