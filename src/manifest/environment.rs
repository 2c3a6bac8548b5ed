//! Conda environment manifest.
//!
//! The file format is modeled by [`EnvironmentFile`] (what `serde_yaml`
//! reads); [`EnvironmentManifest`] is the checked, typed view with every
//! entry parsed and tagged with its group and source line.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use super::layout::{self, EntryLocation};
use crate::error::{EnvdocError, Result};
use crate::requirement::conda::channel_short_name;
use crate::requirement::{MatchSpec, PipRequirement};
use crate::version::VersionSet;

/// Raw conda environment file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentFile {
    /// Environment name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Channels in priority order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,

    /// Conda match specs, plus nested `pip:` lists.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyEntry>,

    /// Install prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Environment variables set on activation.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

/// One item of the `dependencies:` list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DependencyEntry {
    /// A conda match spec.
    Spec(String),
    /// Packages installed by pip after the conda solve.
    Pip { pip: Vec<String> },
}

/// Dependency group, taken from the comment header above an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyGroup {
    Basic,
    Optional,
    Test,
    Doc,
    Dev,
    Ungrouped,
}

impl DependencyGroup {
    /// Interpret a comment's text as a group header.
    ///
    /// Only the first word counts, so `# doc dependencies` is a `Doc` header
    /// while `# pinned for CUDA 11` is not a header at all.
    pub fn from_comment(comment: &str) -> Option<Self> {
        let word = comment
            .trim()
            .split_whitespace()
            .next()?
            .trim_end_matches(':')
            .to_lowercase();
        match word.as_str() {
            "basic" | "base" | "core" => Some(Self::Basic),
            "optional" | "extra" | "extras" => Some(Self::Optional),
            "test" | "tests" | "testing" => Some(Self::Test),
            "doc" | "docs" | "documentation" => Some(Self::Doc),
            "dev" | "development" => Some(Self::Dev),
            "ungrouped" => Some(Self::Ungrouped),
            _ => None,
        }
    }

    /// Header text written when rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Optional => "optional",
            Self::Test => "test",
            Self::Doc => "doc",
            Self::Dev => "dev",
            Self::Ungrouped => "ungrouped",
        }
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which installer handles a dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "installer", content = "spec", rename_all = "lowercase")]
pub enum DependencyKind {
    Conda(MatchSpec),
    Pip(PipRequirement),
}

/// A parsed dependency entry.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    pub group: DependencyGroup,
    /// 1-indexed source line, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(flatten)]
    pub kind: DependencyKind,
}

impl Dependency {
    /// A conda dependency without source location.
    pub fn conda(spec: &str, group: DependencyGroup) -> Result<Self> {
        Ok(Self {
            group,
            line: None,
            kind: DependencyKind::Conda(MatchSpec::parse(spec)?),
        })
    }

    /// A pip dependency without source location.
    pub fn pip(requirement: &str, group: DependencyGroup) -> Result<Self> {
        Ok(Self {
            group,
            line: None,
            kind: DependencyKind::Pip(PipRequirement::parse(requirement)?),
        })
    }

    /// Normalized package name, if the entry names a package.
    pub fn normalized_name(&self) -> Option<String> {
        match &self.kind {
            DependencyKind::Conda(spec) => Some(spec.normalized_name()),
            DependencyKind::Pip(req) => req.normalized_name(),
        }
    }

    /// The entry's version constraint.
    pub fn constraint(&self) -> &VersionSet {
        match &self.kind {
            DependencyKind::Conda(spec) => &spec.constraint,
            DependencyKind::Pip(req) => &req.constraint,
        }
    }

    /// The entry as written.
    pub fn as_str(&self) -> &str {
        match &self.kind {
            DependencyKind::Conda(spec) => spec.as_str(),
            DependencyKind::Pip(req) => req.as_str(),
        }
    }

    /// Installer name for messages.
    pub fn installer(&self) -> &'static str {
        match &self.kind {
            DependencyKind::Conda(_) => "conda",
            DependencyKind::Pip(_) => "pip",
        }
    }

    pub fn is_pip(&self) -> bool {
        matches!(self.kind, DependencyKind::Pip(_))
    }
}

/// A parsed conda environment manifest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvironmentManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub channels: Vec<String>,
    pub dependencies: Vec<Dependency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    /// Whether the file had at least one `pip:` block.
    #[serde(skip)]
    pip_section: bool,
}

impl EnvironmentManifest {
    /// Load and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `ManifestNotFound` if the file doesn't exist.
    /// Returns `ManifestParseError` if the YAML or an entry is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EnvdocError::ManifestNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                EnvdocError::Io(e)
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parse manifest text.
    ///
    /// # Arguments
    ///
    /// * `content` - The YAML content to parse
    /// * `source_path` - Path for error reporting
    pub fn parse(content: &str, source_path: &Path) -> Result<Self> {
        let parse_error = |message: String| EnvdocError::ManifestParseError {
            path: source_path.to_path_buf(),
            message,
        };

        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        if value.is_null() {
            return Ok(Self::default());
        }
        let file: EnvironmentFile =
            serde_yaml::from_value(value).map_err(|e| parse_error(e.to_string()))?;

        let layout = layout::scan(content);
        let conda_count = file
            .dependencies
            .iter()
            .filter(|d| matches!(d, DependencyEntry::Spec(_)))
            .count();
        let pip_count: usize = file
            .dependencies
            .iter()
            .map(|d| match d {
                DependencyEntry::Pip { pip } => pip.len(),
                DependencyEntry::Spec(_) => 0,
            })
            .sum();
        if layout.conda.len() != conda_count || layout.pip.len() != pip_count {
            tracing::debug!(
                "Layout scan of {} disagrees with parsed entries; groups and lines dropped",
                source_path.display()
            );
        }
        let located = |locations: &[EntryLocation], expected: usize, idx: usize| {
            if locations.len() == expected {
                locations
                    .get(idx)
                    .map(|l| (l.group.clone(), Some(l.line)))
                    .unwrap_or((DependencyGroup::Ungrouped, None))
            } else {
                (DependencyGroup::Ungrouped, None)
            }
        };

        let mut dependencies = Vec::new();
        let mut pip_section = false;
        let (mut conda_idx, mut pip_idx) = (0, 0);
        for entry in &file.dependencies {
            match entry {
                DependencyEntry::Spec(spec) => {
                    let (group, line) = located(&layout.conda, conda_count, conda_idx);
                    conda_idx += 1;
                    let spec = MatchSpec::parse(spec).map_err(|e| parse_error(e.to_string()))?;
                    dependencies.push(Dependency {
                        group,
                        line,
                        kind: DependencyKind::Conda(spec),
                    });
                }
                DependencyEntry::Pip { pip } => {
                    pip_section = true;
                    for requirement in pip {
                        let (group, line) = located(&layout.pip, pip_count, pip_idx);
                        pip_idx += 1;
                        let req = PipRequirement::parse(requirement)
                            .map_err(|e| parse_error(e.to_string()))?;
                        dependencies.push(Dependency {
                            group,
                            line,
                            kind: DependencyKind::Pip(req),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            "Parsed {} dependencies ({} via pip) from {}",
            dependencies.len(),
            pip_idx,
            source_path.display()
        );

        Ok(Self {
            name: file.name,
            channels: file.channels,
            dependencies,
            prefix: file.prefix,
            variables: file.variables,
            pip_section,
        })
    }

    /// Conda entries in file order.
    pub fn conda_dependencies(&self) -> impl Iterator<Item = (&Dependency, &MatchSpec)> {
        self.dependencies.iter().filter_map(|d| match &d.kind {
            DependencyKind::Conda(spec) => Some((d, spec)),
            DependencyKind::Pip(_) => None,
        })
    }

    /// Pip entries in file order.
    pub fn pip_dependencies(&self) -> impl Iterator<Item = (&Dependency, &PipRequirement)> {
        self.dependencies.iter().filter_map(|d| match &d.kind {
            DependencyKind::Pip(req) => Some((d, req)),
            DependencyKind::Conda(_) => None,
        })
    }

    /// Entries belonging to one group.
    pub fn in_group<'a>(
        &'a self,
        group: &'a DependencyGroup,
    ) -> impl Iterator<Item = &'a Dependency> + 'a {
        self.dependencies.iter().filter(move |d| &d.group == group)
    }

    /// Short names of every channel named by an entry prefix.
    pub fn referenced_channels(&self) -> BTreeSet<&str> {
        self.conda_dependencies()
            .filter_map(|(_, spec)| spec.channel_name())
            .collect()
    }

    /// Whether `channel` appears in the declared channel list.
    pub fn declares_channel(&self, channel: &str) -> bool {
        let wanted = channel_short_name(channel);
        self.channels
            .iter()
            .any(|declared| declared == channel || channel_short_name(declared) == wanted)
    }

    /// Whether the file used a `pip:` block (even an empty one).
    pub fn has_pip_section(&self) -> bool {
        self.pip_section || self.dependencies.iter().any(Dependency::is_pip)
    }

    /// Compare logical structure, ignoring source lines.
    ///
    /// Returns a description of the first difference.
    pub fn structural_diff(&self, other: &EnvironmentManifest) -> Option<String> {
        if self.name != other.name {
            return Some(format!("name {:?} != {:?}", self.name, other.name));
        }
        if self.channels != other.channels {
            return Some(format!(
                "channels {:?} != {:?}",
                self.channels, other.channels
            ));
        }
        if self.prefix != other.prefix {
            return Some(format!("prefix {:?} != {:?}", self.prefix, other.prefix));
        }
        if self.variables != other.variables {
            return Some("variables differ".to_string());
        }
        if self.dependencies.len() != other.dependencies.len() {
            return Some(format!(
                "{} dependencies != {}",
                self.dependencies.len(),
                other.dependencies.len()
            ));
        }
        self.dependencies
            .iter()
            .zip(&other.dependencies)
            .enumerate()
            .find_map(|(i, (a, b))| {
                (a.group != b.group || a.kind != b.kind).then(|| {
                    format!(
                        "dependency {} differs: {} ({}) != {} ({})",
                        i + 1,
                        a.as_str(),
                        a.group,
                        b.as_str(),
                        b.group
                    )
                })
            })
    }
}
