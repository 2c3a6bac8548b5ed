//! Project settings schema.
//!
//! Settings live in an optional `.envdoc.yml` at the project root:
//!
//! ```yaml
//! env_file: environment-dev.yml
//! docs_file: .readthedocs.yml
//! strict: false
//! rules:
//!   fail-on-warning-disabled: off
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::lint::Severity;

/// Project-level settings for envdoc.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Environment manifest, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,

    /// Docs build manifest, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_file: Option<PathBuf>,

    /// Treat lint warnings as failures.
    pub strict: bool,

    /// Per-rule severity levels, keyed by rule id.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, RuleLevel>,
}

/// Level configured for a single lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Off,
    Hint,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl RuleLevel {
    /// The severity this level maps to, or `None` when the rule is off.
    pub fn severity(self) -> Option<Severity> {
        match self {
            RuleLevel::Off => None,
            RuleLevel::Hint => Some(Severity::Hint),
            RuleLevel::Warning => Some(Severity::Warning),
            RuleLevel::Error => Some(Severity::Error),
        }
    }
}
