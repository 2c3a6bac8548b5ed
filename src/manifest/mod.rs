//! Manifest models.
//!
//! Two files describe a project's development setup:
//!
//! - the conda environment manifest ([`EnvironmentManifest`])
//! - the hosted documentation build manifest ([`DocsManifest`])
//!
//! Both are loaded from YAML, can be rendered back to normalized YAML, and
//! feed the lint rules and the install replay.

pub mod docs;
pub mod environment;
pub mod layout;
pub mod render;
pub mod tools;

pub use docs::{BuildJobs, DocsManifest, Format, Formats, JobPhase, PythonInstall};
pub use environment::{
    Dependency, DependencyGroup, DependencyKind, EnvironmentFile, EnvironmentManifest,
};
pub use render::{
    check_round_trip_docs, check_round_trip_environment, render_docs, render_environment,
};
