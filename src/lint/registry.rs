//! Rule registry for managing lint rules.
//!
//! The [`RuleRegistry`] stores all available lint rules and provides
//! methods for registering, retrieving, running, and iterating over them.

use std::collections::HashMap;
use std::path::PathBuf;

use super::context::LintContext;
use super::diagnostic::LintDiagnostic;
use super::rule::{LintRule, RuleId, Severity};
use super::rules::{
    ConfigVersionRule, ConflictingBuildModesRule, ConflictingConstraintsRule,
    DuplicateDependencyRule, EmptyChannelsRule, EmptyJobCommandRule, FailOnWarningDisabledRule,
    MissingBuildToolsRule, MissingEnvironmentNameRule, MissingReferencedFileRule,
    PipSectionWithoutPipRule, PostInstallOverriddenRule, PythonVersionMismatchRule,
    UndeclaredChannelRule, UnsupportedOsRule, UnsupportedToolVersionRule,
};

/// Per-rule severity overrides. `None` turns a rule off.
pub type SeverityOverrides = HashMap<RuleId, Option<Severity>>;

/// Registry of all available lint rules.
pub struct RuleRegistry {
    rules: HashMap<RuleId, Box<dyn LintRule>>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Create a registry with all built-in rules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(UndeclaredChannelRule));
        registry.register(Box::new(ConflictingConstraintsRule));
        registry.register(Box::new(DuplicateDependencyRule));
        registry.register(Box::new(PipSectionWithoutPipRule));
        registry.register(Box::new(MissingEnvironmentNameRule));
        registry.register(Box::new(EmptyChannelsRule));
        registry.register(Box::new(ConfigVersionRule));
        registry.register(Box::new(UnsupportedOsRule));
        registry.register(Box::new(UnsupportedToolVersionRule));
        registry.register(Box::new(MissingBuildToolsRule));
        registry.register(Box::new(ConflictingBuildModesRule));
        registry.register(Box::new(EmptyJobCommandRule));
        registry.register(Box::new(PostInstallOverriddenRule));
        registry.register(Box::new(MissingReferencedFileRule));
        registry.register(Box::new(FailOnWarningDisabledRule));
        registry.register(Box::new(PythonVersionMismatchRule));
        registry
    }

    /// Register a lint rule.
    pub fn register(&mut self, rule: Box<dyn LintRule>) {
        self.rules.insert(rule.id(), rule);
    }

    /// Get a rule by ID.
    pub fn get(&self, id: &RuleId) -> Option<&dyn LintRule> {
        self.rules.get(id).map(|r| r.as_ref())
    }

    /// Iterate over all rules.
    pub fn iter(&self) -> impl Iterator<Item = &dyn LintRule> {
        self.rules.values().map(|r| r.as_ref())
    }

    /// Rule ids in sorted order.
    pub fn ids(&self) -> Vec<RuleId> {
        let mut ids: Vec<_> = self.rules.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get the number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every enabled rule and return the diagnostics.
    ///
    /// Diagnostics are ordered by file and line, then rule id, so output is
    /// stable across runs.
    pub fn run(&self, ctx: &LintContext, overrides: &SeverityOverrides) -> Vec<LintDiagnostic> {
        let mut diagnostics = Vec::new();
        for rule in self.iter() {
            let id = rule.id();
            let severity = match overrides.get(&id) {
                Some(None) => {
                    tracing::debug!("Rule {} disabled", id);
                    continue;
                }
                Some(Some(severity)) => Some(*severity),
                None => None,
            };
            let found = rule.check(ctx);
            tracing::debug!("Rule {} produced {} diagnostic(s)", id, found.len());
            diagnostics.extend(found.into_iter().map(|d| match severity {
                Some(severity) => d.with_severity(severity),
                None => d,
            }));
        }

        diagnostics.sort_by_key(|d| {
            let (file, line) = d
                .span
                .as_ref()
                .map(|s| (s.file.clone(), s.start_line))
                .unwrap_or((PathBuf::new(), 0));
            (file, line, d.rule_id.clone(), d.message.clone())
        });
        diagnostics
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
