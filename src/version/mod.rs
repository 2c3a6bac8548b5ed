//! Package versions and version constraint sets.
//!
//! - [`Version`] - An orderable version string (conda / PEP 440 flavored)
//! - [`VersionSet`] - A union of version intervals built from constraint text
//!
//! # Example
//!
//! ```
//! use envdoc::version::{Version, VersionSet};
//!
//! let wanted = VersionSet::parse(">=1.10,<2").unwrap();
//! assert!(wanted.contains(&Version::parse("1.13.1").unwrap()));
//!
//! let pinned = VersionSet::parse("==2.1.0").unwrap();
//! assert!(wanted.intersect(&pinned).is_empty());
//! ```

pub mod constraint;

pub use constraint::{Interval, VersionSet};

use std::cmp::Ordering;
use std::fmt;

/// One component of a version.
#[derive(Debug, Clone)]
enum Part {
    Num(u64),
    Str(String),
}

impl Part {
    /// Sort rank among tags: pre-release < other tags < numbers < post-release.
    fn rank(&self) -> u8 {
        match self {
            Part::Str(s) => match s.as_str() {
                "dev" => 0,
                "a" | "alpha" => 1,
                "b" | "beta" => 2,
                "c" | "rc" | "pre" | "preview" => 3,
                "post" | "rev" | "r" => 6,
                _ => 4,
            },
            Part::Num(_) => 5,
        }
    }

    fn is_post(&self) -> bool {
        matches!(self, Part::Str(s) if matches!(s.as_str(), "post" | "rev" | "r"))
    }

    /// A post tag sits between the implicit `0` of a shorter release and any
    /// real release number, so `1.0 < 1.0.post1 < 1.0.1`.
    fn compare(&self, other: &Part) -> Ordering {
        match (self, other) {
            (Part::Num(a), Part::Num(b)) => a.cmp(b),
            (Part::Str(_), Part::Num(n)) if self.is_post() => {
                if *n == 0 {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Part::Num(_), Part::Str(_)) if other.is_post() => other.compare(self).reverse(),
            (Part::Str(a), Part::Str(b)) if self.rank() == other.rank() => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A parsed, orderable version.
///
/// Epochs (`1!`) and local segments (`+cpu`) are kept in the original text
/// but ignored for ordering.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parts: Vec<Part>,
}

impl Version {
    /// Parse a version string.
    pub fn parse(text: &str) -> Result<Self, String> {
        let raw = text.trim();
        let mut body = raw.strip_prefix('v').unwrap_or(raw);
        if let Some((_, rest)) = body.split_once('!') {
            body = rest;
        }
        if let Some((release, _local)) = body.split_once('+') {
            body = release;
        }
        if body.is_empty() {
            return Err(format!("empty version '{}'", raw));
        }

        let mut parts = Vec::new();
        let mut digits = String::new();
        let mut letters = String::new();

        let flush = |digits: &mut String, letters: &mut String, parts: &mut Vec<Part>| {
            if !digits.is_empty() {
                let n = digits
                    .parse::<u64>()
                    .map_err(|_| format!("version component '{}' is too large", digits))?;
                parts.push(Part::Num(n));
                digits.clear();
            }
            if !letters.is_empty() {
                parts.push(Part::Str(letters.to_lowercase()));
                letters.clear();
            }
            Ok::<(), String>(())
        };

        for c in body.chars() {
            if c.is_ascii_digit() {
                if !letters.is_empty() {
                    flush(&mut digits, &mut letters, &mut parts)?;
                }
                digits.push(c);
            } else if c.is_ascii_alphabetic() {
                if !digits.is_empty() {
                    flush(&mut digits, &mut letters, &mut parts)?;
                }
                letters.push(c);
            } else if matches!(c, '.' | '-' | '_') {
                flush(&mut digits, &mut letters, &mut parts)?;
            } else {
                return Err(format!("unexpected character '{}' in version '{}'", c, raw));
            }
        }
        flush(&mut digits, &mut letters, &mut parts)?;

        if parts.is_empty() {
            return Err(format!("version '{}' has no components", raw));
        }

        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    /// The text this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Smallest version above every version that starts with this one.
    ///
    /// `1.2` becomes `1.3`; `1.2rc1` becomes `1.2rc2`. Returns `None` when the
    /// version has no numeric component to increment.
    pub fn next_prefix(&self) -> Option<Version> {
        let last_num = self.parts.iter().rposition(|p| matches!(p, Part::Num(_)))?;
        let mut parts: Vec<Part> = self.parts[..=last_num].to_vec();
        if let Some(Part::Num(n)) = parts.last_mut() {
            *n = n.saturating_add(1);
        }
        Some(Self::from_parts(parts))
    }

    /// Upper bound for a compatible-release clause (`~=1.4.2` gives `1.5`).
    pub fn compatible_upper(&self) -> Option<Version> {
        let release: Vec<Part> = self
            .parts
            .iter()
            .take_while(|p| matches!(p, Part::Num(_)))
            .cloned()
            .collect();
        if release.len() < 2 {
            return None;
        }
        Self::from_parts(release[..release.len() - 1].to_vec()).next_prefix()
    }

    fn from_parts(parts: Vec<Part>) -> Self {
        let raw = parts
            .iter()
            .map(|p| match p {
                Part::Num(n) => n.to_string(),
                Part::Str(s) => s.clone(),
            })
            .collect::<Vec<_>>()
            .join(".");
        Self { raw, parts }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Part::Num(0);
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).unwrap_or(&zero);
            let b = other.parts.get(i).unwrap_or(&zero);
            match a.compare(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn numeric_ordering() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("2.0.0") > v("1.99.99"));
        assert!(v("0.20") < v("0.21.1"));
    }

    #[test]
    fn trailing_zeros_are_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("3"), v("3.0"));
    }

    #[test]
    fn prerelease_sorts_before_release() {
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b2") < v("1.0rc1"));
        assert!(v("1.0.dev0") < v("1.0a1"));
    }

    #[test]
    fn post_release_sorts_after_release() {
        assert!(v("1.0.post1") > v("1.0"));
        assert!(v("1.0.post1") < v("1.0.1"));
        assert!(v("1.0.post2") > v("1.0.post1"));
        assert!(v("0.6.post1") < v("0.7"));
    }

    #[test]
    fn post_release_constraint_ordering() {
        let below_patch = VersionSet::parse("<1.0.1").unwrap();
        assert!(below_patch.contains(&v("1.0.post1")));
        assert!(!VersionSet::parse("<=1.0").unwrap().contains(&v("1.0.post1")));
    }

    #[test]
    fn local_and_epoch_are_ignored_for_ordering() {
        assert_eq!(v("2.1.0+cpu"), v("2.1.0"));
        assert_eq!(v("1!2.0"), v("2.0"));
        assert_eq!(v("2.1.0+cpu").as_str(), "2.1.0+cpu");
    }

    #[test]
    fn leading_v_is_accepted() {
        assert_eq!(v("v1.2"), v("1.2"));
    }

    #[test]
    fn rejects_operators_and_empty() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse(">=1.0").is_err());
        assert!(Version::parse("1.*").is_err());
    }

    #[test]
    fn next_prefix_increments_last_number() {
        assert_eq!(v("1.2").next_prefix().unwrap(), v("1.3"));
        assert_eq!(v("3.10").next_prefix().unwrap(), v("3.11"));
        assert_eq!(v("1.2rc1").next_prefix().unwrap(), v("1.2rc2"));
    }

    #[test]
    fn compatible_upper_drops_last_release_component() {
        assert_eq!(v("1.4.2").compatible_upper().unwrap(), v("1.5"));
        assert_eq!(v("2.2").compatible_upper().unwrap(), v("3"));
        assert!(v("2").compatible_upper().is_none());
    }
}
