//! Package requirement specifications.
//!
//! Two installers appear in the manifests, each with its own syntax:
//!
//! - [`MatchSpec`] - conda match specs (`conda-forge::numpy >=1.20`)
//! - [`PipRequirement`] - pip requirement lines (`torch==2.1.0`, `-r docs.txt`)
//!
//! Both reduce their version constraint to a [`VersionSet`](crate::version::VersionSet)
//! and identify packages by [`normalize_name`], so entries from either
//! installer can be compared.

pub mod conda;
pub mod pip;

pub use conda::MatchSpec;
pub use pip::{PipRequirement, PipRequirementKind};

use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("valid separator regex"));

/// Normalize a package name for comparison (PEP 503).
///
/// ```
/// use envdoc::requirement::normalize_name;
///
/// assert_eq!(normalize_name("Scikit_Learn"), "scikit-learn");
/// assert_eq!(normalize_name("torch.geometric"), "torch-geometric");
/// ```
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUN
        .replace_all(&name.trim().to_lowercase(), "-")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_separators() {
        assert_eq!(normalize_name("PyYAML"), "pyyaml");
        assert_eq!(normalize_name("sphinx_autodoc__typehints"), "sphinx-autodoc-typehints");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name(" pytorch "), "pytorch");
    }
}
