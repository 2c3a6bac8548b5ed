//! Manifest validation.
//!
//! Validation is a set of independent rules run over a [`LintContext`]
//! holding whichever manifests were found:
//!
//! - **Rules** - Individual checks ([`LintRule`] trait)
//! - **Registry** - Collection of all available rules ([`RuleRegistry`])
//! - **Diagnostics** - Issue reports with severity and suggestions ([`LintDiagnostic`])
//! - **Formatters** - Human, JSON and SARIF renderings ([`LintFormatter`])
//!
//! # Example
//!
//! ```
//! use envdoc::lint::{LintContext, RuleRegistry, SeverityOverrides, Severity};
//! use envdoc::manifest::EnvironmentManifest;
//! use std::path::Path;
//!
//! let env = EnvironmentManifest::parse(
//!     "name: demo\nchannels: [conda-forge]\ndependencies:\n  - pyg::pyg\n",
//!     Path::new("environment.yml"),
//! )
//! .unwrap();
//! let ctx = LintContext::new(".").with_environment(env, "environment.yml");
//!
//! let diagnostics = RuleRegistry::with_builtins().run(&ctx, &SeverityOverrides::new());
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].severity, Severity::Error);
//! ```

pub mod context;
pub mod diagnostic;
pub mod output;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod span;

pub use context::LintContext;
pub use diagnostic::{count_severity, LintDiagnostic, RelatedInfo};
pub use output::{HumanFormatter, JsonFormatter, LintFormatter, OutputFormat, SarifFormatter};
pub use registry::{RuleRegistry, SeverityOverrides};
pub use rule::{LintRule, RuleId, Severity};
pub use span::Span;
