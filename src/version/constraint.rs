//! Version constraint sets.
//!
//! A [`VersionSet`] is a union of [`Interval`]s. Constraint text from conda
//! match specs and pip requirement specifiers both compile into this form, so
//! any two constraints can be intersected regardless of which installer they
//! came from.

use std::cmp::Ordering;
use std::ops::Bound;

use super::Version;

/// A contiguous range of versions.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub lower: Bound<Version>,
    pub upper: Bound<Version>,
}

impl Interval {
    /// The interval containing every version.
    pub fn any() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// The interval containing exactly one version.
    pub fn exact(v: Version) -> Self {
        Self {
            lower: Bound::Included(v.clone()),
            upper: Bound::Included(v),
        }
    }

    fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
            (Bound::Included(lo), Bound::Included(hi)) => lo > hi,
            (Bound::Included(lo), Bound::Excluded(hi))
            | (Bound::Excluded(lo), Bound::Included(hi))
            | (Bound::Excluded(lo), Bound::Excluded(hi)) => lo >= hi,
        }
    }

    fn contains(&self, v: &Version) -> bool {
        let above = match &self.lower {
            Bound::Unbounded => true,
            Bound::Included(lo) => v >= lo,
            Bound::Excluded(lo) => v > lo,
        };
        let below = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(hi) => v <= hi,
            Bound::Excluded(hi) => v < hi,
        };
        above && below
    }

    fn intersect(&self, other: &Interval) -> Option<Interval> {
        let lower = match compare_lower(&self.lower, &other.lower) {
            Ordering::Less => other.lower.clone(),
            _ => self.lower.clone(),
        };
        let upper = match compare_upper(&self.upper, &other.upper) {
            Ordering::Greater => other.upper.clone(),
            _ => self.upper.clone(),
        };
        let interval = Interval { lower, upper };
        (!interval.is_empty()).then_some(interval)
    }
}

/// Order lower bounds from loosest to tightest.
fn compare_lower(a: &Bound<Version>, b: &Bound<Version>) -> Ordering {
    match (a, b) {
        (Bound::Unbounded, Bound::Unbounded) => Ordering::Equal,
        (Bound::Unbounded, _) => Ordering::Less,
        (_, Bound::Unbounded) => Ordering::Greater,
        (Bound::Included(x), Bound::Included(y)) | (Bound::Excluded(x), Bound::Excluded(y)) => {
            x.cmp(y)
        }
        (Bound::Included(x), Bound::Excluded(y)) => x.cmp(y).then(Ordering::Less),
        (Bound::Excluded(x), Bound::Included(y)) => x.cmp(y).then(Ordering::Greater),
    }
}

/// Order upper bounds from tightest to loosest.
fn compare_upper(a: &Bound<Version>, b: &Bound<Version>) -> Ordering {
    match (a, b) {
        (Bound::Unbounded, Bound::Unbounded) => Ordering::Equal,
        (Bound::Unbounded, _) => Ordering::Greater,
        (_, Bound::Unbounded) => Ordering::Less,
        (Bound::Included(x), Bound::Included(y)) | (Bound::Excluded(x), Bound::Excluded(y)) => {
            x.cmp(y)
        }
        (Bound::Included(x), Bound::Excluded(y)) => x.cmp(y).then(Ordering::Greater),
        (Bound::Excluded(x), Bound::Included(y)) => x.cmp(y).then(Ordering::Less),
    }
}

/// A set of acceptable versions.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionSet {
    intervals: Vec<Interval>,
}

impl VersionSet {
    /// Every version.
    pub fn any() -> Self {
        Self {
            intervals: vec![Interval::any()],
        }
    }

    /// No version at all.
    pub fn none() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Parse constraint text.
    ///
    /// `,` joins clauses that must all hold and `|` separates alternatives.
    /// Empty text and `*` mean any version.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() || text == "*" {
            return Ok(Self::any());
        }

        let mut union = Self::none();
        for alternative in text.split('|') {
            let mut set = Self::any();
            for clause in alternative.split(',') {
                let clause = clause.trim();
                if clause.is_empty() {
                    return Err(format!("empty clause in '{}'", text));
                }
                set = set.intersect(&parse_clause(clause)?);
            }
            union.intervals.extend(set.intervals);
        }
        Ok(union)
    }

    /// The versions in both sets.
    pub fn intersect(&self, other: &VersionSet) -> VersionSet {
        let intervals = self
            .intervals
            .iter()
            .flat_map(|a| other.intervals.iter().filter_map(move |b| a.intersect(b)))
            .collect();
        VersionSet { intervals }
    }

    /// Whether no version satisfies the set.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Whether the set places no restriction at all.
    pub fn is_any(&self) -> bool {
        self.intervals
            .iter()
            .any(|i| i.lower == Bound::Unbounded && i.upper == Bound::Unbounded)
    }

    /// Whether `version` satisfies the set.
    pub fn contains(&self, version: &Version) -> bool {
        self.intervals.iter().any(|i| i.contains(version))
    }

    /// The intervals making up this set.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }
}

const OPERATORS: &[&str] = &["===", "==", "!=", "~=", "<=", ">=", "<", ">", "="];

fn parse_clause(clause: &str) -> Result<VersionSet, String> {
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|op| clause.strip_prefix(op).map(|rest| (*op, rest.trim())))
        .unwrap_or(("", clause));

    let (body, wildcard) = match rest.strip_suffix(".*").or_else(|| rest.strip_suffix('*')) {
        Some(body) => (body.trim_end_matches('.'), true),
        None => (rest, false),
    };
    if body.is_empty() {
        return if op.is_empty() || op == "==" || op == "=" {
            Ok(VersionSet::any())
        } else {
            Err(format!("missing version after '{}'", op))
        };
    }
    let version = Version::parse(body)?;

    let set = match op {
        "===" => single(Interval::exact(version)),
        "==" | "" if !wildcard => single(Interval::exact(version)),
        "==" | "" | "=" => prefix_range(version)?,
        "!=" => {
            let excluded = if wildcard {
                prefix_range(version)?
            } else {
                single(Interval::exact(version))
            };
            complement(&excluded)
        }
        "~=" => {
            let upper = version
                .compatible_upper()
                .ok_or_else(|| format!("'~={}' needs at least two release components", body))?;
            single(Interval {
                lower: Bound::Included(version),
                upper: Bound::Excluded(upper),
            })
        }
        "<" => single(Interval {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(version),
        }),
        "<=" => single(Interval {
            lower: Bound::Unbounded,
            upper: Bound::Included(version),
        }),
        ">" => single(Interval {
            lower: Bound::Excluded(version),
            upper: Bound::Unbounded,
        }),
        ">=" => single(Interval {
            lower: Bound::Included(version),
            upper: Bound::Unbounded,
        }),
        other => return Err(format!("unsupported operator '{}'", other)),
    };
    Ok(set)
}

fn single(interval: Interval) -> VersionSet {
    VersionSet {
        intervals: vec![interval],
    }
}

fn prefix_range(version: Version) -> Result<VersionSet, String> {
    let upper = version
        .next_prefix()
        .ok_or_else(|| format!("cannot build a prefix range from '{}'", version))?;
    Ok(single(Interval {
        lower: Bound::Included(version),
        upper: Bound::Excluded(upper),
    }))
}

/// Complement of a single-interval set.
fn complement(set: &VersionSet) -> VersionSet {
    let Some(interval) = set.intervals.first() else {
        return VersionSet::any();
    };
    let mut intervals = Vec::new();
    match &interval.lower {
        Bound::Unbounded => {}
        Bound::Included(v) => intervals.push(Interval {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(v.clone()),
        }),
        Bound::Excluded(v) => intervals.push(Interval {
            lower: Bound::Unbounded,
            upper: Bound::Included(v.clone()),
        }),
    }
    match &interval.upper {
        Bound::Unbounded => {}
        Bound::Included(v) => intervals.push(Interval {
            lower: Bound::Excluded(v.clone()),
            upper: Bound::Unbounded,
        }),
        Bound::Excluded(v) => intervals.push(Interval {
            lower: Bound::Included(v.clone()),
            upper: Bound::Unbounded,
        }),
    }
    VersionSet { intervals }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> VersionSet {
        VersionSet::parse(s).unwrap()
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn empty_text_is_any() {
        assert!(set("").is_any());
        assert!(set("*").is_any());
        assert!(set("").contains(&v("0.0.1")));
    }

    #[test]
    fn range_clauses() {
        let s = set(">=1.10.0,<2");
        assert!(s.contains(&v("1.10.0")));
        assert!(s.contains(&v("1.13.1")));
        assert!(!s.contains(&v("2.0")));
        assert!(!s.contains(&v("1.9")));
    }

    #[test]
    fn exact_pin() {
        let s = set("==0.20");
        assert!(s.contains(&v("0.20.0")));
        assert!(!s.contains(&v("0.20.1")));
    }

    #[test]
    fn conda_fuzzy_equals_is_prefix() {
        let s = set("=1.11");
        assert!(s.contains(&v("1.11.3")));
        assert!(!s.contains(&v("1.12")));
    }

    #[test]
    fn bare_wildcard_is_prefix() {
        let s = set("3.10.*");
        assert!(s.contains(&v("3.10.12")));
        assert!(!s.contains(&v("3.11")));
    }

    #[test]
    fn bare_version_is_exact() {
        let s = set("2.1.0");
        assert!(s.contains(&v("2.1.0")));
        assert!(!s.contains(&v("2.1.1")));
    }

    #[test]
    fn not_equal_splits_range() {
        let s = set("!=1.5");
        assert!(s.contains(&v("1.4")));
        assert!(!s.contains(&v("1.5")));
        assert!(s.contains(&v("1.5.1")));
    }

    #[test]
    fn not_equal_wildcard_excludes_prefix() {
        let s = set("!=1.5.*");
        assert!(!s.contains(&v("1.5.3")));
        assert!(s.contains(&v("1.6")));
    }

    #[test]
    fn compatible_release() {
        let s = set("~=1.4.2");
        assert!(s.contains(&v("1.4.9")));
        assert!(!s.contains(&v("1.5")));
        assert!(VersionSet::parse("~=2").is_err());
    }

    #[test]
    fn alternatives_union() {
        let s = set("1.2.*|>=2.0");
        assert!(s.contains(&v("1.2.7")));
        assert!(s.contains(&v("2.4")));
        assert!(!s.contains(&v("1.9")));
    }

    #[test]
    fn disjoint_constraints_intersect_to_empty() {
        assert!(set(">=2.0").intersect(&set("<1.5")).is_empty());
        assert!(set("==0.20").intersect(&set(">=0.21")).is_empty());
        assert!(set("<1.0").intersect(&set(">=1.0")).is_empty());
    }

    #[test]
    fn touching_inclusive_bounds_intersect() {
        let s = set("<=1.0").intersect(&set(">=1.0"));
        assert!(!s.is_empty());
        assert!(s.contains(&v("1.0")));
    }

    #[test]
    fn overlapping_constraints_intersect() {
        let s = set(">=1.10").intersect(&set("<2.2"));
        assert!(!s.is_empty());
        assert!(s.contains(&v("2.1.0")));
    }

    #[test]
    fn rejects_garbage() {
        assert!(VersionSet::parse(">=").is_err());
        assert!(VersionSet::parse(">=1.0,").is_err());
        assert!(VersionSet::parse("@@").is_err());
    }
}
