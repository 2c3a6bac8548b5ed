//! A project's settings and loaded manifests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::loader::{load_settings, ManifestPaths, PathOverrides};
use crate::config::schema::Settings;
use crate::error::{EnvdocError, Result};
use crate::lint::LintContext;
use crate::manifest::{DocsManifest, EnvironmentManifest};

/// Everything envdoc knows about one project.
#[derive(Debug, Clone)]
pub struct Project {
    pub paths: ManifestPaths,
    pub settings: Settings,
    pub environment: Option<EnvironmentManifest>,
    pub docs: Option<DocsManifest>,
    docs_source: Option<String>,
}

impl Project {
    /// Load settings, resolve manifest paths and parse whatever manifests exist.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for a bad `.envdoc.yml`, `ManifestNotFound` for
    /// an explicitly named manifest that doesn't exist, and
    /// `ManifestParseError` for invalid manifests.
    pub fn load(project_root: &Path, overrides: &PathOverrides) -> Result<Self> {
        let settings = load_settings(project_root)?;
        let paths = ManifestPaths::resolve(project_root, &settings, overrides);
        tracing::debug!(
            "Resolved manifests: environment={:?} docs={:?}",
            paths.environment,
            paths.docs
        );

        let environment = match &paths.environment {
            Some(path) => Some(EnvironmentManifest::load(path)?),
            None => None,
        };

        let (docs, docs_source) = match &paths.docs {
            Some(path) => {
                let source = read_manifest(path)?;
                (Some(DocsManifest::parse(&source, path)?), Some(source))
            }
            None => (None, None),
        };

        Ok(Self {
            paths,
            settings,
            environment,
            docs,
            docs_source,
        })
    }

    /// Check if at least one manifest was loaded.
    pub fn has_manifests(&self) -> bool {
        self.environment.is_some() || self.docs.is_some()
    }

    /// Environment manifest path as shown to users.
    pub fn environment_display_path(&self) -> Option<PathBuf> {
        self.paths
            .environment
            .as_deref()
            .map(|p| self.paths.display_path(p))
    }

    /// Docs manifest path as shown to users.
    pub fn docs_display_path(&self) -> Option<PathBuf> {
        self.paths.docs.as_deref().map(|p| self.paths.display_path(p))
    }

    /// Build the lint input for this project.
    pub fn lint_context(&self) -> LintContext {
        let mut ctx = LintContext::new(&self.paths.project_root);
        if let (Some(manifest), Some(path)) = (&self.environment, self.environment_display_path()) {
            ctx = ctx.with_environment(manifest.clone(), path);
        }
        if let (Some(manifest), Some(path)) = (&self.docs, self.docs_display_path()) {
            ctx = ctx.with_docs(manifest.clone(), path, self.docs_source.clone());
        }
        ctx
    }
}

fn read_manifest(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EnvdocError::ManifestNotFound {
                path: path.to_path_buf(),
            }
        } else {
            EnvdocError::Io(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ENV: &str = "name: docs\nchannels:\n  - conda-forge\ndependencies:\n  - python=3.10\n";
    const DOCS: &str = "version: 2\nbuild:\n  os: ubuntu-22.04\n  tools:\n    python: \"3.10\"\n";

    #[test]
    fn loads_discovered_manifests() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("environment-dev.yml"), ENV).unwrap();
        fs::write(temp.path().join(".readthedocs.yml"), DOCS).unwrap();

        let project = Project::load(temp.path(), &PathOverrides::default()).unwrap();
        assert!(project.has_manifests());
        assert_eq!(
            project.environment.as_ref().unwrap().name.as_deref(),
            Some("docs")
        );
        assert_eq!(
            project.docs_display_path(),
            Some(PathBuf::from(".readthedocs.yml"))
        );

        let ctx = project.lint_context();
        assert_eq!(ctx.environment_path, PathBuf::from("environment-dev.yml"));
        assert_eq!(ctx.docs_key_span("os:").unwrap().start_line, 3);
    }

    #[test]
    fn empty_project_has_no_manifests() {
        let temp = TempDir::new().unwrap();
        let project = Project::load(temp.path(), &PathOverrides::default()).unwrap();
        assert!(!project.has_manifests());
        assert!(project.lint_context().is_empty());
    }

    #[test]
    fn explicit_missing_manifest_is_an_error() {
        let temp = TempDir::new().unwrap();
        let overrides = PathOverrides {
            env_file: Some(temp.path().join("missing.yml")),
            docs_file: None,
        };
        let err = Project::load(temp.path(), &overrides).unwrap_err();
        assert!(matches!(err, EnvdocError::ManifestNotFound { .. }));
    }

    #[test]
    fn settings_name_the_docs_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("docs/rtd.yml"), DOCS).unwrap();
        fs::write(temp.path().join(".envdoc.yml"), "docs_file: docs/rtd.yml\n").unwrap();

        let project = Project::load(temp.path(), &PathOverrides::default()).unwrap();
        assert!(project.docs.is_some());
        assert_eq!(
            project.docs_display_path(),
            Some(PathBuf::from("docs/rtd.yml"))
        );
    }
}
