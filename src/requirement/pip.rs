//! Pip requirement lines.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

use super::normalize_name;
use crate::error::{EnvdocError, Result};
use crate::version::VersionSet;

static NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._\-]*)\s*(?:\[([^\]]*)\])?\s*(.*)$")
        .expect("valid pip requirement regex")
});

/// What a pip requirement line refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipRequirementKind {
    /// A named distribution with optional version specifiers.
    Named,
    /// A direct reference: `name @ url`, a VCS URL, or a local path.
    Url(String),
    /// An installer option such as `-r docs.txt`, `-e .` or `--index-url ...`.
    Option(String),
}

/// A single pip requirement.
#[derive(Debug, Clone)]
pub struct PipRequirement {
    /// Distribution name, when the line names one.
    pub name: Option<String>,
    /// Requested extras (`pkg[full]`).
    pub extras: Vec<String>,
    /// Compiled version constraint.
    pub constraint: VersionSet,
    /// Environment marker after `;`.
    pub marker: Option<String>,
    pub kind: PipRequirementKind,
    raw: String,
}

impl PipRequirement {
    /// Parse a requirement line.
    pub fn parse(text: &str) -> Result<Self> {
        let raw = text.trim();
        let invalid = |message: &str| EnvdocError::InvalidRequirement {
            requirement: raw.to_string(),
            message: message.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty requirement"));
        }

        if raw.starts_with('-') {
            return Ok(Self::opaque(raw, None, PipRequirementKind::Option(raw.to_string())));
        }

        let (body, marker) = match raw.split_once(';') {
            Some((body, marker)) => (body.trim(), Some(marker.trim().to_string())),
            None => (raw, None),
        };

        // `name @ url` names its package even though it carries a URL.
        let caps = NAMED.captures(body);
        let named_reference = caps
            .as_ref()
            .is_some_and(|caps| caps[3].trim_start().starts_with('@'));
        if !named_reference && is_direct_reference(raw) {
            return Ok(Self::opaque(raw, None, PipRequirementKind::Url(raw.to_string())));
        }

        let caps = caps.ok_or_else(|| invalid("missing distribution name"))?;
        let name = caps[1].to_string();
        let extras = caps
            .get(2)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let rest = caps[3].trim();

        if let Some(url) = rest.strip_prefix('@') {
            return Ok(Self {
                name: Some(name),
                extras,
                constraint: VersionSet::any(),
                marker,
                kind: PipRequirementKind::Url(url.trim().to_string()),
                raw: raw.to_string(),
            });
        }

        let specifiers = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(rest);
        let constraint = VersionSet::parse(specifiers).map_err(|e| invalid(e.as_str()))?;

        Ok(Self {
            name: Some(name),
            extras,
            constraint,
            marker,
            kind: PipRequirementKind::Named,
            raw: raw.to_string(),
        })
    }

    fn opaque(raw: &str, name: Option<String>, kind: PipRequirementKind) -> Self {
        Self {
            name,
            extras: Vec::new(),
            constraint: VersionSet::any(),
            marker: None,
            kind,
            raw: raw.to_string(),
        }
    }

    /// Normalized distribution name, when there is one.
    pub fn normalized_name(&self) -> Option<String> {
        self.name.as_deref().map(normalize_name)
    }

    /// Whether the line pins or limits versions.
    pub fn is_constrained(&self) -> bool {
        !self.constraint.is_any()
    }

    /// The requirement exactly as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn is_direct_reference(raw: &str) -> bool {
    raw.contains("://")
        || raw.starts_with("git+")
        || raw.starts_with('.')
        || raw.starts_with('/')
        || raw.starts_with('~')
}

impl fmt::Display for PipRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for PipRequirement {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Serialize for PipRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    #[test]
    fn parses_plain_name() {
        let req = PipRequirement::parse("pypots").unwrap();
        assert_eq!(req.name.as_deref(), Some("pypots"));
        assert_eq!(req.kind, PipRequirementKind::Named);
        assert!(!req.is_constrained());
    }

    #[test]
    fn parses_pin() {
        let req = PipRequirement::parse("docutils==0.20").unwrap();
        assert_eq!(req.name.as_deref(), Some("docutils"));
        assert!(req.is_constrained());
        assert!(req.constraint.contains(&Version::parse("0.20").unwrap()));
        assert!(!req.constraint.contains(&Version::parse("0.21").unwrap()));
    }

    #[test]
    fn parses_extras_and_marker() {
        let req =
            PipRequirement::parse("pypots[full, dev] >=0.2 ; python_version >= '3.8'").unwrap();
        assert_eq!(req.extras, vec!["full".to_string(), "dev".to_string()]);
        assert_eq!(req.marker.as_deref(), Some("python_version >= '3.8'"));
        assert!(req.constraint.contains(&Version::parse("0.4").unwrap()));
    }

    #[test]
    fn parses_parenthesized_specifiers() {
        let req = PipRequirement::parse("sphinx (>=6,<8)").unwrap();
        assert!(req.constraint.contains(&Version::parse("7.2").unwrap()));
    }

    #[test]
    fn option_lines_are_opaque() {
        let req = PipRequirement::parse("-r requirements/docs.txt").unwrap();
        assert!(req.name.is_none());
        assert!(matches!(req.kind, PipRequirementKind::Option(_)));
    }

    #[test]
    fn direct_references() {
        let req = PipRequirement::parse("git+https://github.com/WenjieDu/PyPOTS.git").unwrap();
        assert!(req.name.is_none());
        assert!(matches!(req.kind, PipRequirementKind::Url(_)));

        let req = PipRequirement::parse("tsdb @ https://example.org/tsdb.tar.gz").unwrap();
        assert_eq!(req.name.as_deref(), Some("tsdb"));
        assert!(matches!(req.kind, PipRequirementKind::Url(ref u) if u.ends_with(".tar.gz")));

        let req = PipRequirement::parse("./dist/pypots-0.4.whl").unwrap();
        assert!(req.name.is_none());
    }

    #[test]
    fn named_reference_keeps_extras_and_marker() {
        let req = PipRequirement::parse(
            "PyPOTS[full] @ git+https://github.com/WenjieDu/PyPOTS.git ; python_version >= '3.8'",
        )
        .unwrap();
        assert_eq!(req.normalized_name().as_deref(), Some("pypots"));
        assert_eq!(req.extras, vec!["full".to_string()]);
        assert_eq!(req.marker.as_deref(), Some("python_version >= '3.8'"));
        assert!(
            matches!(req.kind, PipRequirementKind::Url(ref u) if u.starts_with("git+https://"))
        );
    }

    #[test]
    fn normalized_name_follows_pep503() {
        let req = PipRequirement::parse("Sphinx_Autodoc_Typehints").unwrap();
        assert_eq!(req.normalized_name().as_deref(), Some("sphinx-autodoc-typehints"));
    }

    #[test]
    fn rejects_bad_specifiers() {
        assert!(PipRequirement::parse("").is_err());
        assert!(PipRequirement::parse("torch>=").is_err());
    }
}
