//! Normalized YAML rendering and round-trip checks.
//!
//! The docs manifest is plain data and goes through `serde_yaml` directly.
//! The environment manifest is emitted by hand so that dependency group
//! headers survive as comments.

use std::fmt::Write as _;
use std::path::Path;

use super::docs::DocsManifest;
use super::environment::{Dependency, DependencyGroup, EnvironmentManifest};
use crate::error::{EnvdocError, Result};

const ITEM_INDENT: &str = "  ";
const PIP_INDENT: &str = "      ";

/// Render an environment manifest as normalized YAML.
pub fn render_environment(manifest: &EnvironmentManifest) -> Result<String> {
    let mut out = String::new();

    if let Some(name) = &manifest.name {
        writeln!(out, "name: {}", scalar(name)?).map_err(write_error)?;
    }

    if !manifest.channels.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("channels:\n");
        for channel in &manifest.channels {
            writeln!(out, "{}- {}", ITEM_INDENT, scalar(channel)?).map_err(write_error)?;
        }
    }

    if !manifest.dependencies.is_empty() || manifest.has_pip_section() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("dependencies:\n");
        render_dependencies(&mut out, manifest)?;
    }

    if let Some(prefix) = &manifest.prefix {
        if !out.is_empty() {
            out.push('\n');
        }
        writeln!(out, "prefix: {}", scalar(prefix)?).map_err(write_error)?;
    }

    if !manifest.variables.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("variables:\n");
        for (key, value) in &manifest.variables {
            writeln!(out, "{}{}: {}", ITEM_INDENT, scalar(key)?, scalar(value)?)
                .map_err(write_error)?;
        }
    }

    Ok(out)
}

fn render_dependencies(out: &mut String, manifest: &EnvironmentManifest) -> Result<()> {
    let mut group = DependencyGroup::Ungrouped;
    let mut in_pip = false;
    let mut wrote_pip_block = false;
    let mut first = true;

    for dependency in &manifest.dependencies {
        let pip = dependency.is_pip();
        if pip && !in_pip {
            writeln!(out, "{}- pip:", ITEM_INDENT).map_err(write_error)?;
            wrote_pip_block = true;
        }
        in_pip = pip;
        let indent = if pip { PIP_INDENT } else { ITEM_INDENT };

        if dependency.group != group {
            if !first && !pip {
                out.push('\n');
            }
            writeln!(out, "{}# {}", indent, dependency.group).map_err(write_error)?;
            group = dependency.group.clone();
        }
        write_entry(out, indent, dependency)?;
        first = false;
    }

    if manifest.has_pip_section() && !wrote_pip_block {
        writeln!(out, "{}- pip: []", ITEM_INDENT).map_err(write_error)?;
    }
    Ok(())
}

fn write_entry(out: &mut String, indent: &str, dependency: &Dependency) -> Result<()> {
    writeln!(out, "{}- {}", indent, scalar(dependency.as_str())?).map_err(write_error)
}

/// Render a docs manifest as normalized YAML.
pub fn render_docs(manifest: &DocsManifest) -> Result<String> {
    serde_yaml::to_string(manifest).map_err(|e| EnvdocError::Other(e.into()))
}

/// Render, re-parse and compare an environment manifest.
///
/// Returns the rendered text on success.
///
/// # Errors
///
/// Returns `RoundTripMismatch` when the re-parsed manifest differs in
/// packages, groups or order.
pub fn check_round_trip_environment(manifest: &EnvironmentManifest, path: &Path) -> Result<String> {
    let rendered = render_environment(manifest)?;
    let reparsed = EnvironmentManifest::parse(&rendered, path).map_err(|e| {
        EnvdocError::RoundTripMismatch {
            path: path.to_path_buf(),
            message: format!("rendered output does not parse: {}", e),
        }
    })?;
    if let Some(message) = manifest.structural_diff(&reparsed) {
        return Err(EnvdocError::RoundTripMismatch {
            path: path.to_path_buf(),
            message,
        });
    }
    Ok(rendered)
}

/// Render, re-parse and compare a docs manifest.
pub fn check_round_trip_docs(manifest: &DocsManifest, path: &Path) -> Result<String> {
    let rendered = render_docs(manifest)?;
    let reparsed =
        DocsManifest::parse(&rendered, path).map_err(|e| EnvdocError::RoundTripMismatch {
            path: path.to_path_buf(),
            message: format!("rendered output does not parse: {}", e),
        })?;
    if &reparsed != manifest {
        let phase = manifest
            .ordered_commands()
            .into_iter()
            .zip(reparsed.ordered_commands())
            .find(|(a, b)| a != b)
            .map(|((phase, _), _)| phase);
        let message = match phase {
            Some(phase) => format!("commands of {} changed", phase),
            None => "rendered manifest differs from the original".to_string(),
        };
        return Err(EnvdocError::RoundTripMismatch {
            path: path.to_path_buf(),
            message,
        });
    }
    Ok(rendered)
}

/// Quote a scalar the way `serde_yaml` would.
fn scalar(value: &str) -> Result<String> {
    let rendered = serde_yaml::to_string(value).map_err(|e| EnvdocError::Other(e.into()))?;
    let rendered = rendered.trim_end();
    if rendered.contains('\n') {
        // Block scalars can't sit inline in a list item.
        serde_json::to_string(value).map_err(|e| EnvdocError::Other(e.into()))
    } else {
        Ok(rendered.to_string())
    }
}

fn write_error(e: std::fmt::Error) -> EnvdocError {
    EnvdocError::Other(e.into())
}
