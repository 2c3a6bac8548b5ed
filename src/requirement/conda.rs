//! Conda match specs.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

use super::normalize_name;
use crate::error::{EnvdocError, Result};
use crate::version::VersionSet;

static NAME_AND_REST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*(.*)$").expect("valid match spec regex")
});

/// A conda match spec such as `pytorch::pytorch >=1.10` or `numpy=1.24=py311_0`.
#[derive(Debug, Clone)]
pub struct MatchSpec {
    /// Channel prefix (`conda-forge`, `conda-forge/linux-64`, or a URL).
    pub channel: Option<String>,
    /// Package name as written.
    pub name: String,
    /// Version constraint text, if any.
    pub version: Option<String>,
    /// Build string, if any.
    pub build: Option<String>,
    /// Compiled version constraint.
    pub constraint: VersionSet,
    raw: String,
}

impl MatchSpec {
    /// Parse a match spec.
    pub fn parse(text: &str) -> Result<Self> {
        let raw = text.trim();
        let invalid = |message: &str| EnvdocError::InvalidRequirement {
            requirement: raw.to_string(),
            message: message.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty match spec"));
        }

        let (channel, rest) = match raw.split_once("::") {
            Some((channel, rest)) if !channel.trim().is_empty() => {
                (Some(channel.trim().to_string()), rest.trim())
            }
            Some(_) => return Err(invalid("empty channel before '::'")),
            None => (None, raw),
        };

        // Bracketed key/value options are not modeled.
        let rest = match rest.find('[') {
            Some(idx) if rest.ends_with(']') => rest[..idx].trim(),
            _ => rest,
        };

        let caps = NAME_AND_REST
            .captures(rest)
            .ok_or_else(|| invalid("missing package name"))?;
        let name = caps[1].to_string();
        let remainder = caps[2].trim();

        let (version, build) = split_version_and_build(remainder);
        let constraint = match &version {
            Some(v) => VersionSet::parse(v).map_err(|e| invalid(e.as_str()))?,
            None => VersionSet::any(),
        };

        Ok(Self {
            channel,
            name,
            version,
            build,
            constraint,
            raw: raw.to_string(),
        })
    }

    /// The channel's short name: `conda-forge` for `conda-forge/linux-64`
    /// and for `https://conda.anaconda.org/conda-forge`.
    pub fn channel_name(&self) -> Option<&str> {
        self.channel.as_deref().map(channel_short_name)
    }

    /// Normalized package name.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// The spec exactly as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Reduce a channel reference to the name used in a `channels:` list.
pub fn channel_short_name(channel: &str) -> &str {
    let channel = channel.trim().trim_end_matches('/');
    if channel.contains("://") {
        channel.rsplit('/').next().unwrap_or(channel)
    } else {
        channel.split('/').next().unwrap_or(channel)
    }
}

fn split_version_and_build(remainder: &str) -> (Option<String>, Option<String>) {
    if remainder.is_empty() {
        return (None, None);
    }

    // name=1.2=build (single '=' is conda's fuzzy form)
    if let Some(body) = remainder.strip_prefix('=') {
        if !body.starts_with('=') {
            let mut parts = body.splitn(2, '=');
            let version = parts.next().map(|v| v.trim().to_string());
            let build = parts
                .next()
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty());
            return match build {
                Some(build) => (version.map(|v| format!("=={}", v)), Some(build)),
                None => (version.map(|v| format!("={}", v)), None),
            };
        }
    }

    let tokens: Vec<&str> = remainder.split_whitespace().collect();
    if tokens.len() >= 2 {
        let last = tokens[tokens.len() - 1];
        let before = tokens[tokens.len() - 2];
        let continues = before.ends_with(',')
            || before.ends_with('|')
            || last.starts_with(',')
            || last.starts_with('|')
            || last.starts_with(['<', '>', '=', '!', '~']);
        if !continues {
            let version = tokens[..tokens.len() - 1].concat();
            return (Some(version), Some(last.to_string()));
        }
    }
    (Some(tokens.concat()), None)
}

impl fmt::Display for MatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for MatchSpec {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Serialize for MatchSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
