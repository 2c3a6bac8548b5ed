//! envdoc - Validate and replay conda environment and docs build manifests.
//!
//! envdoc reads a project's conda environment file (`environment-dev.yml`)
//! and its hosted docs build manifest (`.readthedocs.yml`), checks them for
//! mistakes with a set of lint rules, and replays the docs build's install
//! commands to show which version of each package ends up installed.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings file and manifest discovery
//! - [`error`] - Error types and result aliases
//! - [`lint`] - Manifest lint rules and output formats
//! - [`manifest`] - Environment and docs build manifest models
//! - [`replay`] - Ordered replay of build install commands
//! - [`requirement`] - Conda match specs and pip requirements
//! - [`shell`] - Shell command and build job execution
//! - [`ui`] - Prompts, spinners, and terminal output
//! - [`version`] - Versions and version sets
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use envdoc::manifest::DocsManifest;
//! use envdoc::replay::replay;
//!
//! let docs = DocsManifest::parse(
//!     "build:\n  jobs:\n    post_install:\n      - pip install docutils==0.20\n",
//!     Path::new(".readthedocs.yml"),
//! )
//! .unwrap();
//! let report = replay(&docs);
//! assert_eq!(report.final_state["docutils"].requirement, "docutils==0.20");
//! ```
//!
//! For file-based project loading, see the integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod manifest;
pub mod replay;
pub mod requirement;
pub mod shell;
pub mod ui;
pub mod version;

pub use error::{EnvdocError, Result};
