//! Manifest and settings discovery and loading.
//!
//! This module finds the environment manifest, the docs build manifest and
//! the optional `.envdoc.yml` settings file in a project root.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Settings;
use crate::error::{EnvdocError, Result};
use crate::lint::{RuleId, RuleRegistry, SeverityOverrides};

/// Settings file name at the project root.
pub const SETTINGS_FILE: &str = ".envdoc.yml";

/// Environment manifest names, in discovery order.
pub const ENVIRONMENT_CANDIDATES: &[&str] =
    &["environment-dev.yml", "environment.yml", "environment.yaml"];

/// Docs build manifest names, in discovery order.
pub const DOCS_CANDIDATES: &[&str] = &[".readthedocs.yaml", ".readthedocs.yml"];

/// Paths given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub env_file: Option<PathBuf>,
    pub docs_file: Option<PathBuf>,
}

/// Resolved manifest locations for a project.
///
/// Priority for each manifest:
/// 1. Explicit command-line path
/// 2. Path named in `.envdoc.yml`
/// 3. First existing candidate in the project root
#[derive(Debug, Clone)]
pub struct ManifestPaths {
    pub project_root: PathBuf,

    /// Environment manifest, if one was named or found.
    pub environment: Option<PathBuf>,

    /// Docs build manifest, if one was named or found.
    pub docs: Option<PathBuf>,

    /// Settings file, if present.
    pub settings: Option<PathBuf>,
}

impl ManifestPaths {
    /// Discover manifests in `project_root` without any overrides.
    pub fn discover(project_root: &Path) -> Self {
        Self::resolve(project_root, &Settings::default(), &PathOverrides::default())
    }

    /// Resolve manifest paths, letting flags win over settings and settings
    /// win over discovery.
    ///
    /// Explicit paths are kept even when the file is missing, so loading
    /// reports `ManifestNotFound` instead of silently skipping it.
    pub fn resolve(project_root: &Path, settings: &Settings, overrides: &PathOverrides) -> Self {
        let environment = overrides
            .env_file
            .clone()
            .or_else(|| settings.env_file.as_ref().map(|p| project_root.join(p)))
            .or_else(|| Self::find_first(project_root, ENVIRONMENT_CANDIDATES));
        let docs = overrides
            .docs_file
            .clone()
            .or_else(|| settings.docs_file.as_ref().map(|p| project_root.join(p)))
            .or_else(|| Self::find_first(project_root, DOCS_CANDIDATES));

        Self {
            project_root: project_root.to_path_buf(),
            environment,
            docs,
            settings: Self::find_settings(project_root),
        }
    }

    fn find_first(project_root: &Path, candidates: &[&str]) -> Option<PathBuf> {
        candidates
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.is_file())
    }

    /// Find `.envdoc.yml` in the project root.
    pub fn find_settings(project_root: &Path) -> Option<PathBuf> {
        let path = project_root.join(SETTINGS_FILE);
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Check if either manifest was found.
    pub fn has_any(&self) -> bool {
        self.environment.is_some() || self.docs.is_some()
    }

    /// Path shown to users: relative to the project root when possible.
    pub fn display_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.project_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Find the project root by walking up from `start`.
///
/// Looks for a settings file, any known manifest, or a `.git` directory.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let has_marker = std::iter::once(SETTINGS_FILE)
            .chain(ENVIRONMENT_CANDIDATES.iter().copied())
            .chain(DOCS_CANDIDATES.iter().copied())
            .any(|name| current.join(name).is_file());
        if has_marker || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load `.envdoc.yml` from the project root, or defaults when it is absent.
///
/// # Errors
///
/// Returns `SettingsError` if the file is not valid settings YAML.
pub fn load_settings(project_root: &Path) -> Result<Settings> {
    match ManifestPaths::find_settings(project_root) {
        Some(path) => load_settings_file(&path),
        None => Ok(Settings::default()),
    }
}

/// Load a settings file.
///
/// # Errors
///
/// Returns `SettingsError` if the file can't be parsed, `Io` if it can't be read.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)?;
    parse_settings(&content, path)
}

/// Parse settings YAML. An empty document gives the defaults.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<Settings> {
    let settings_error = |message: String| EnvdocError::SettingsError {
        path: source_path.to_path_buf(),
        message,
    };
    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| settings_error(e.to_string()))?;
    if value.is_null() {
        return Ok(Settings::default());
    }
    serde_yaml::from_value(value).map_err(|e| settings_error(e.to_string()))
}

/// Turn the `rules` table into severity overrides for `registry`.
///
/// # Errors
///
/// Returns `SettingsError` naming the first rule id the registry doesn't know.
pub fn severity_overrides(
    settings: &Settings,
    registry: &RuleRegistry,
    source_path: &Path,
) -> Result<SeverityOverrides> {
    let mut overrides = SeverityOverrides::new();
    for (id, level) in &settings.rules {
        let rule_id = RuleId::new(id);
        if registry.get(&rule_id).is_none() {
            return Err(EnvdocError::SettingsError {
                path: source_path.to_path_buf(),
                message: format!("unknown lint rule '{}'", id),
            });
        }
        overrides.insert(rule_id, level.severity());
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RuleLevel;
    use crate::lint::Severity;
    use tempfile::TempDir;

    #[test]
    fn discover_prefers_dev_environment() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("environment.yml"), "name: a\n").unwrap();
        fs::write(temp.path().join("environment-dev.yml"), "name: b\n").unwrap();
        fs::write(temp.path().join(".readthedocs.yml"), "version: 2\n").unwrap();

        let paths = ManifestPaths::discover(temp.path());
        assert_eq!(
            paths.environment,
            Some(temp.path().join("environment-dev.yml"))
        );
        assert_eq!(paths.docs, Some(temp.path().join(".readthedocs.yml")));
        assert!(paths.settings.is_none());
    }

    #[test]
    fn discover_prefers_yaml_docs_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".readthedocs.yml"), "version: 2\n").unwrap();
        fs::write(temp.path().join(".readthedocs.yaml"), "version: 2\n").unwrap();

        let paths = ManifestPaths::discover(temp.path());
        assert_eq!(paths.docs, Some(temp.path().join(".readthedocs.yaml")));
    }

    #[test]
    fn discover_empty_directory() {
        let temp = TempDir::new().unwrap();
        let paths = ManifestPaths::discover(temp.path());
        assert!(!paths.has_any());
    }

    #[test]
    fn flags_win_over_settings_and_discovery() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("environment.yml"), "name: a\n").unwrap();
        let settings = Settings {
            env_file: Some(PathBuf::from("envs/docs.yml")),
            ..Default::default()
        };

        let paths = ManifestPaths::resolve(temp.path(), &settings, &PathOverrides::default());
        assert_eq!(paths.environment, Some(temp.path().join("envs/docs.yml")));

        let overrides = PathOverrides {
            env_file: Some(PathBuf::from("/elsewhere/env.yml")),
            docs_file: None,
        };
        let paths = ManifestPaths::resolve(temp.path(), &settings, &overrides);
        assert_eq!(paths.environment, Some(PathBuf::from("/elsewhere/env.yml")));
    }

    #[test]
    fn display_path_is_relative_to_root() {
        let paths = ManifestPaths::discover(Path::new("/nonexistent/project"));
        assert_eq!(
            paths.display_path(Path::new("/nonexistent/project/environment.yml")),
            PathBuf::from("environment.yml")
        );
        assert_eq!(
            paths.display_path(Path::new("/other/environment.yml")),
            PathBuf::from("/other/environment.yml")
        );
    }

    #[test]
    fn find_project_root_walks_up() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".readthedocs.yml"), "version: 2\n").unwrap();
        let nested = temp.path().join("docs").join("source");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn load_settings_defaults_when_absent() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_settings(temp.path()).unwrap(), Settings::default());
    }

    #[test]
    fn load_settings_reports_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SETTINGS_FILE), "strict: [\n").unwrap();

        let err = load_settings(temp.path()).unwrap_err();
        assert!(matches!(err, EnvdocError::SettingsError { .. }));
    }

    #[test]
    fn empty_settings_file_is_default() {
        let settings = parse_settings("", Path::new(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn overrides_from_rules_table() {
        let mut settings = Settings::default();
        settings
            .rules
            .insert("fail-on-warning-disabled".to_string(), RuleLevel::Off);
        settings
            .rules
            .insert("empty-channels".to_string(), RuleLevel::Error);

        let registry = RuleRegistry::with_builtins();
        let overrides =
            severity_overrides(&settings, &registry, Path::new(SETTINGS_FILE)).unwrap();
        assert_eq!(
            overrides.get(&RuleId::new("fail-on-warning-disabled")),
            Some(&None)
        );
        assert_eq!(
            overrides.get(&RuleId::new("empty-channels")),
            Some(&Some(Severity::Error))
        );
    }

    #[test]
    fn unknown_rule_is_a_settings_error() {
        let mut settings = Settings::default();
        settings
            .rules
            .insert("no-such-rule".to_string(), RuleLevel::Warning);

        let err = severity_overrides(
            &settings,
            &RuleRegistry::with_builtins(),
            Path::new(SETTINGS_FILE),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no-such-rule"));
    }
}
