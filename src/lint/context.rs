//! Input to the lint rules.

use std::path::{Path, PathBuf};

use super::span::Span;
use crate::manifest::{Dependency, DocsManifest, EnvironmentManifest};

/// Everything a lint rule may look at.
#[derive(Debug, Clone)]
pub struct LintContext {
    /// Directory that relative paths in the manifests resolve against.
    pub project_root: PathBuf,
    pub environment: Option<EnvironmentManifest>,
    pub environment_path: PathBuf,
    pub docs: Option<DocsManifest>,
    pub docs_path: PathBuf,
    docs_source: Option<String>,
}

impl LintContext {
    /// An empty context rooted at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            environment: None,
            environment_path: PathBuf::from("environment.yml"),
            docs: None,
            docs_path: PathBuf::from(".readthedocs.yml"),
            docs_source: None,
        }
    }

    /// Attach the environment manifest.
    pub fn with_environment(
        mut self,
        manifest: EnvironmentManifest,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.environment = Some(manifest);
        self.environment_path = path.into();
        self
    }

    /// Attach the docs manifest and, optionally, its source text for locating keys.
    pub fn with_docs(
        mut self,
        manifest: DocsManifest,
        path: impl Into<PathBuf>,
        source: Option<String>,
    ) -> Self {
        self.docs = Some(manifest);
        self.docs_path = path.into();
        self.docs_source = source;
        self
    }

    /// Whether any manifest is present.
    pub fn is_empty(&self) -> bool {
        self.environment.is_none() && self.docs.is_none()
    }

    /// Span of a dependency entry, when its line is known.
    pub fn dependency_span(&self, dependency: &Dependency) -> Option<Span> {
        dependency
            .line
            .map(|line| Span::line(&self.environment_path, line))
    }

    /// Span of the first line of the environment manifest.
    pub fn environment_file_span(&self) -> Span {
        Span::line(&self.environment_path, 1)
    }

    /// Span of the first docs-manifest line whose content starts with `key`.
    pub fn docs_key_span(&self, key: &str) -> Option<Span> {
        self.docs_line(|line| {
            let line = line.trim_start();
            line.strip_prefix("- ").unwrap_or(line).starts_with(key)
        })
    }

    /// Like [`Self::docs_key_span`], but only for indented (nested) keys.
    pub fn docs_nested_key_span(&self, key: &str) -> Option<Span> {
        self.docs_line(|line| {
            line.starts_with(char::is_whitespace) && line.trim_start().starts_with(key)
        })
    }

    /// Span of the first docs-manifest list item whose value is `command`.
    pub fn docs_command_span(&self, command: &str) -> Option<Span> {
        let command = command.trim();
        self.docs_line(|line| {
            line.trim_start()
                .strip_prefix('-')
                .is_some_and(|item| list_item_value(item) == command)
        })
    }

    /// Span of the first line of the docs manifest.
    pub fn docs_file_span(&self) -> Span {
        Span::line(&self.docs_path, 1)
    }

    fn docs_line(&self, matches: impl Fn(&str) -> bool) -> Option<Span> {
        let source = self.docs_source.as_deref()?;
        source
            .lines()
            .position(|line| !line.trim_start().starts_with('#') && matches(line))
            .map(|idx| Span::line(&self.docs_path, idx + 1))
    }

    /// Resolve a manifest-relative path under the project root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let path = Path::new(relative);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Scalar text of a block list item, without quotes or a trailing comment.
fn list_item_value(item: &str) -> &str {
    let item = item.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = item.strip_prefix(quote) {
            return inner.rsplit_once(quote).map_or(inner, |(value, _)| value);
        }
    }
    item.split_once(" #").map_or(item, |(value, _)| value.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: &str =
        "version: 2\nbuild:\n  os: ubuntu-22.04\n  jobs:\n    post_install:\n      - pip install docutils==0.20\n";

    fn ctx() -> LintContext {
        let docs = DocsManifest::parse(DOCS, Path::new(".readthedocs.yml")).unwrap();
        LintContext::new("/project").with_docs(docs, ".readthedocs.yml", Some(DOCS.to_string()))
    }

    #[test]
    fn locates_docs_keys() {
        let ctx = ctx();
        assert_eq!(ctx.docs_key_span("os:").unwrap().start_line, 3);
        assert_eq!(ctx.docs_key_span("version:").unwrap().start_line, 1);
        assert!(ctx.docs_key_span("sphinx:").is_none());
        assert!(ctx.docs_nested_key_span("version:").is_none());
        assert_eq!(ctx.docs_nested_key_span("os:").unwrap().start_line, 3);
    }

    #[test]
    fn locates_docs_commands() {
        let ctx = ctx();
        let span = ctx.docs_command_span("pip install docutils==0.20").unwrap();
        assert_eq!(span.start_line, 6);
        assert!(ctx.docs_command_span("docutils==0.20").is_none());
    }

    #[test]
    fn command_spans_match_whole_items() {
        let source = r#"build:
  jobs:
    post_install:
      - pip install docutils==0.20
      - 'pip install docutils'
    pre_build:
      - "pip install sphinx"  # docs theme
      - pip install numpy # pinned below
"#;
        let docs = DocsManifest::parse(source, Path::new(".readthedocs.yml")).unwrap();
        let ctx = LintContext::new("/project").with_docs(
            docs,
            ".readthedocs.yml",
            Some(source.to_string()),
        );
        assert_eq!(ctx.docs_command_span("pip install docutils").unwrap().start_line, 5);
        assert_eq!(ctx.docs_command_span("pip install sphinx").unwrap().start_line, 7);
        assert_eq!(ctx.docs_command_span("pip install numpy").unwrap().start_line, 8);
        assert!(ctx.docs_command_span("pip install").is_none());
    }

    #[test]
    fn no_source_means_no_spans() {
        let docs = DocsManifest::parse(DOCS, Path::new(".readthedocs.yml")).unwrap();
        let ctx = LintContext::new("/project").with_docs(docs, ".readthedocs.yml", None);
        assert!(ctx.docs_key_span("os:").is_none());
    }

    #[test]
    fn resolves_relative_paths() {
        let ctx = LintContext::new("/project");
        assert_eq!(ctx.resolve("docs/conf.py"), PathBuf::from("/project/docs/conf.py"));
        assert_eq!(ctx.resolve("/abs/conf.py"), PathBuf::from("/abs/conf.py"));
        assert!(ctx.is_empty());
    }
}
