//! Project settings and manifest discovery.
//!
//! - Settings schema (`.envdoc.yml`) in [`schema`]
//! - Manifest and settings discovery in [`loader`]
//! - Loaded project state in [`project`]
//!
//! # Example
//!
//! ```
//! use envdoc::config::{PathOverrides, Project};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("environment.yml"), "name: docs\n").unwrap();
//!
//! let project = Project::load(temp.path(), &PathOverrides::default()).unwrap();
//! assert_eq!(project.environment.unwrap().name, Some("docs".to_string()));
//! assert!(project.docs.is_none());
//! ```

pub mod loader;
pub mod project;
pub mod schema;

pub use loader::{
    find_project_root, load_settings, load_settings_file, parse_settings, severity_overrides,
    ManifestPaths, PathOverrides, DOCS_CANDIDATES, ENVIRONMENT_CANDIDATES, SETTINGS_FILE,
};
pub use project::Project;
pub use schema::{RuleLevel, Settings};
