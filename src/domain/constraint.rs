//! Version constraint grammar for requirement specifiers
//!
//! Handles the comparison operators found in requirements manifests:
//! - Exact: `==1.0.4`, wildcard `==1.4.*`
//! - Compatible release: `~=1.0.4`
//! - Ordered: `>=1.0`, `>1.0`, `<=2.0`, `<2.0`
//! - Exclusion: `!=1.3`, wildcard `!=1.3.*`
//! - Conjunctions: `>=3.5.0,<4.0.0`

use super::version::{Phase, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a version constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// No recognized comparison operator at the start of the clause
    #[error("missing comparison operator in '{0}'")]
    MissingOperator(String),

    /// Arbitrary equality is not part of the supported grammar
    #[error("arbitrary equality '===' is not supported: '{0}'")]
    ArbitraryEquality(String),

    /// The version part of the clause does not parse
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    /// `.*` suffix on an operator that does not accept it
    #[error("wildcard suffix is only valid with == or != in '{0}'")]
    WildcardNotAllowed(String),

    /// `~=` needs at least two release segments to define a prefix
    #[error("compatible release needs at least two version segments in '~={0}'")]
    CompatiblePrecision(String),
}

/// Comparison operator of a single constraint clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Compatible release (`~=`)
    Compatible,
    /// Exact match (`==`)
    Exact,
    /// Exclusion (`!=`)
    NotEqual,
    /// Greater than or equal (`>=`)
    GreaterEq,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEq,
    /// Less than (`<`)
    Less,
}

impl CompareOp {
    /// Returns the operator as written in a manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Compatible => "~=",
            CompareOp::Exact => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterEq => ">=",
            CompareOp::Greater => ">",
            CompareOp::LessEq => "<=",
            CompareOp::Less => "<",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Two-character operators first so `<` does not shadow `<=`
const OPERATORS: &[(&str, CompareOp)] = &[
    ("~=", CompareOp::Compatible),
    ("==", CompareOp::Exact),
    ("!=", CompareOp::NotEqual),
    (">=", CompareOp::GreaterEq),
    ("<=", CompareOp::LessEq),
    (">", CompareOp::Greater),
    ("<", CompareOp::Less),
];

/// A single constraint clause: an operator applied to a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// The comparison operator
    pub op: CompareOp,
    /// The parsed version operand
    pub version: Version,
    /// True for `==X.Y.*` / `!=X.Y.*` prefix clauses
    pub wildcard: bool,
    /// The version operand as written, including a `.*` suffix
    pub text: String,
}

impl Constraint {
    /// Creates a constraint from parts (mainly for tests and rewrites)
    pub fn new(op: CompareOp, version: Version) -> Self {
        let text = version.to_string();
        Self {
            op,
            version,
            wildcard: false,
            text,
        }
    }

    /// Parses a single clause like `~=1.0.4` or `!=2.1.*`
    pub fn parse(clause: &str) -> Result<Self, ConstraintError> {
        let trimmed = clause.trim();
        if trimmed.starts_with("===") {
            return Err(ConstraintError::ArbitraryEquality(trimmed.to_string()));
        }

        let (op, rest) = OPERATORS
            .iter()
            .find_map(|(token, op)| trimmed.strip_prefix(token).map(|rest| (*op, rest)))
            .ok_or_else(|| ConstraintError::MissingOperator(trimmed.to_string()))?;

        let text = rest.trim().to_string();
        let (version_str, wildcard) = match text.strip_suffix(".*") {
            Some(stem) => (stem, true),
            None => (text.as_str(), false),
        };

        if wildcard && !matches!(op, CompareOp::Exact | CompareOp::NotEqual) {
            return Err(ConstraintError::WildcardNotAllowed(trimmed.to_string()));
        }

        let version: Version = version_str
            .parse()
            .map_err(|_| ConstraintError::InvalidVersion(text.clone()))?;

        if op == CompareOp::Compatible && version.release.len() < 2 {
            return Err(ConstraintError::CompatiblePrecision(text));
        }

        Ok(Self {
            op,
            version,
            wildcard,
            text,
        })
    }

    /// Evaluates this clause against a candidate version
    pub fn matches(&self, candidate: &Version) -> bool {
        match self.op {
            CompareOp::Exact if self.wildcard => self.prefix_matches(candidate),
            CompareOp::Exact => candidate == &self.version,
            CompareOp::NotEqual if self.wildcard => !self.prefix_matches(candidate),
            CompareOp::NotEqual => candidate != &self.version,
            CompareOp::Compatible => {
                let prefix = &self.version.release[..self.version.release.len() - 1];
                candidate >= &self.version
                    && candidate.epoch == self.version.epoch
                    && candidate.release_starts_with(prefix)
            }
            CompareOp::GreaterEq => candidate >= &self.version,
            CompareOp::Greater => candidate > &self.version,
            CompareOp::LessEq => candidate <= &self.version,
            CompareOp::Less => candidate < &self.version,
        }
    }

    fn prefix_matches(&self, candidate: &Version) -> bool {
        candidate.epoch == self.version.epoch
            && candidate.release_starts_with(&self.version.release)
    }

    /// The half-open interval covered by prefix-style clauses
    ///
    /// For `~=1.4.5` the bounds are `[1.4.5, 1.5.dev0)`; for `==1.4.*`
    /// they are `[1.4.dev0, 1.5.dev0)`. Returns None for clauses that do
    /// not define an interval.
    fn interval(&self) -> Option<(Bound, Bound)> {
        match self.op {
            CompareOp::Compatible => {
                let mut bumped = self.version.release[..self.version.release.len() - 1].to_vec();
                if let Some(last) = bumped.last_mut() {
                    *last += 1;
                }
                let upper = Version {
                    epoch: self.version.epoch,
                    release: bumped,
                    phase: Phase::Dev(0),
                };
                Some((
                    Bound::inclusive(self.version.clone()),
                    Bound::exclusive(upper),
                ))
            }
            CompareOp::Exact if self.wildcard => {
                let mut bumped = self.version.release.clone();
                if let Some(last) = bumped.last_mut() {
                    *last += 1;
                }
                let lower = Version {
                    epoch: self.version.epoch,
                    release: self.version.release.clone(),
                    phase: Phase::Dev(0),
                };
                let upper = Version {
                    epoch: self.version.epoch,
                    release: bumped,
                    phase: Phase::Dev(0),
                };
                Some((Bound::inclusive(lower), Bound::exclusive(upper)))
            }
            CompareOp::GreaterEq => Some((
                Bound::inclusive(self.version.clone()),
                Bound::unbounded_upper(),
            )),
            CompareOp::Greater => Some((
                Bound::exclusive(self.version.clone()),
                Bound::unbounded_upper(),
            )),
            CompareOp::LessEq => Some((
                Bound::unbounded_lower(),
                Bound::inclusive(self.version.clone()),
            )),
            CompareOp::Less => Some((
                Bound::unbounded_lower(),
                Bound::exclusive(self.version.clone()),
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.text)
    }
}

#[derive(Debug, Clone)]
struct Bound {
    version: Option<Version>,
    inclusive: bool,
}

impl Bound {
    fn inclusive(version: Version) -> Self {
        Self {
            version: Some(version),
            inclusive: true,
        }
    }

    fn exclusive(version: Version) -> Self {
        Self {
            version: Some(version),
            inclusive: false,
        }
    }

    fn unbounded_lower() -> Self {
        Self {
            version: None,
            inclusive: true,
        }
    }

    fn unbounded_upper() -> Self {
        Self {
            version: None,
            inclusive: true,
        }
    }
}

/// Broad shape of a constraint set, used to decide how to handle updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    /// A single `==` clause naming one version
    Pinned,
    /// A single `~=` clause
    Compatible,
    /// Anything with bounds or multiple clauses
    Range,
    /// Only `!=` clauses
    Exclusion,
    /// No clauses at all
    Unconstrained,
}

impl SpecKind {
    /// Returns true for kinds whose version text can be rewritten in place
    pub fn is_rewritable(&self) -> bool {
        matches!(self, SpecKind::Pinned | SpecKind::Compatible)
    }
}

/// A conjunction of constraint clauses, as written after a package name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    clauses: Vec<Constraint>,
}

impl ConstraintSet {
    /// Creates an empty (unconstrained) set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a set from clauses
    pub fn new(clauses: Vec<Constraint>) -> Self {
        Self { clauses }
    }

    /// Parses a comma-separated conjunction like `>=3.5.0,<4.0.0`
    pub fn parse(text: &str) -> Result<Self, ConstraintError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }
        let mut clauses = Vec::new();
        for clause in trimmed.split(',') {
            clauses.push(Constraint::parse(clause)?);
        }
        Ok(Self { clauses })
    }

    /// Returns true if no clauses are present
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of clauses
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Iterates over the clauses in written order
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.clauses.iter()
    }

    /// Evaluates the whole conjunction against a candidate version
    ///
    /// An empty set matches every version.
    pub fn matches(&self, candidate: &Version) -> bool {
        self.clauses.iter().all(|c| c.matches(candidate))
    }

    /// Classifies the set for update handling
    pub fn kind(&self) -> SpecKind {
        if self.clauses.is_empty() {
            return SpecKind::Unconstrained;
        }
        if self.clauses.len() == 1 {
            let only = &self.clauses[0];
            match only.op {
                CompareOp::Exact if !only.wildcard => return SpecKind::Pinned,
                CompareOp::Compatible => return SpecKind::Compatible,
                _ => {}
            }
        }
        if self.clauses.iter().all(|c| c.op == CompareOp::NotEqual) {
            return SpecKind::Exclusion;
        }
        SpecKind::Range
    }

    /// The version a pinned or compatible-release set is anchored to
    pub fn target_version(&self) -> Option<&Version> {
        match self.kind() {
            SpecKind::Pinned | SpecKind::Compatible => Some(&self.clauses[0].version),
            _ => None,
        }
    }

    /// Checks whether any version at all could satisfy the conjunction
    ///
    /// Exact pins are tested against every other clause; ordered,
    /// compatible-release and wildcard-equality clauses are folded into a
    /// single interval whose emptiness is then decided. `!=` clauses only
    /// participate via the pin test.
    pub fn is_satisfiable(&self) -> bool {
        for (i, clause) in self.clauses.iter().enumerate() {
            if clause.op == CompareOp::Exact && !clause.wildcard {
                let pin_ok = self
                    .clauses
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .all(|(_, other)| other.matches(&clause.version));
                if !pin_ok {
                    return false;
                }
            }
        }

        let mut lower: Option<Bound> = None;
        let mut upper: Option<Bound> = None;
        for clause in &self.clauses {
            let Some((lo, hi)) = clause.interval() else {
                continue;
            };
            if let Some(v) = &lo.version {
                lower = Some(match lower {
                    Some(current) => tighter_lower(current, v, lo.inclusive),
                    None => lo.clone(),
                });
            }
            if let Some(v) = &hi.version {
                upper = Some(match upper {
                    Some(current) => tighter_upper(current, v, hi.inclusive),
                    None => hi.clone(),
                });
            }
        }

        if let (Some(lo), Some(hi)) = (lower, upper) {
            let (lo_v, hi_v) = match (&lo.version, &hi.version) {
                (Some(a), Some(b)) => (a, b),
                _ => return true,
            };
            if lo_v > hi_v {
                return false;
            }
            if lo_v == hi_v && !(lo.inclusive && hi.inclusive) {
                return false;
            }
        }
        true
    }
}

fn tighter_lower(current: Bound, candidate: &Version, inclusive: bool) -> Bound {
    match &current.version {
        Some(v) if candidate > v => Bound {
            version: Some(candidate.clone()),
            inclusive,
        },
        Some(v) if candidate == v && current.inclusive && !inclusive => Bound {
            version: Some(candidate.clone()),
            inclusive: false,
        },
        _ => current,
    }
}

fn tighter_upper(current: Bound, candidate: &Version, inclusive: bool) -> Bound {
    match &current.version {
        Some(v) if candidate < v => Bound {
            version: Some(candidate.clone()),
            inclusive,
        },
        Some(v) if candidate == v && current.inclusive && !inclusive => Bound {
            version: Some(candidate.clone()),
            inclusive: false,
        },
        _ => current,
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for clause in &self.clauses {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", clause)?;
            first = false;
        }
        Ok(())
    }
}
