//! Built-in lint rules.
//!
//! Environment rules look only at the conda manifest, docs rules only at the
//! build manifest, and `python-version-mismatch` needs both.

pub mod build_image;
pub mod build_jobs;
pub mod channels;
pub mod constraints;
pub mod environment;
pub mod fail_on_warning;
pub mod post_install;
pub mod python_version;
pub mod referenced_files;

pub use build_image::{
    ConfigVersionRule, MissingBuildToolsRule, UnsupportedOsRule, UnsupportedToolVersionRule,
};
pub use build_jobs::{ConflictingBuildModesRule, EmptyJobCommandRule};
pub use channels::{EmptyChannelsRule, UndeclaredChannelRule};
pub use constraints::{ConflictingConstraintsRule, DuplicateDependencyRule};
pub use environment::{MissingEnvironmentNameRule, PipSectionWithoutPipRule};
pub use fail_on_warning::FailOnWarningDisabledRule;
pub use post_install::PostInstallOverriddenRule;
pub use python_version::PythonVersionMismatchRule;
pub use referenced_files::MissingReferencedFileRule;
