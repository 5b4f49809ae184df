//! Requirement declaration structures

use super::constraint::{ConstraintSet, SpecKind};
use super::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalizes a package name for comparison
///
/// Lowercases the name and collapses runs of `-`, `_` and `.` into a
/// single `-`, so `Flask-RTD_Theme` and `flask.rtd-theme` refer to the
/// same package.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(ch.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

/// A single dependency declaration from a requirements manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name as written
    pub name: String,
    /// Extras requested for the package (`pkg[extra1,extra2]`)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extras: Vec<String>,
    /// Version constraints applied to the package
    pub constraints: ConstraintSet,
    /// Environment marker text after `;`, stored verbatim
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub marker: Option<String>,
    /// The specifier as written, comments stripped
    pub raw: String,
    /// 1-based line number of the declaration
    pub line: usize,
}

impl Requirement {
    /// Creates a requirement with just a name and constraints
    pub fn new(name: impl Into<String>, constraints: ConstraintSet) -> Self {
        let name = name.into();
        let raw = if constraints.is_empty() {
            name.clone()
        } else {
            format!("{}{}", name, constraints)
        };
        Self {
            name,
            extras: Vec::new(),
            constraints,
            marker: None,
            raw,
            line: 0,
        }
    }

    /// Sets the extras list (builder pattern)
    pub fn with_extras(mut self, extras: Vec<String>) -> Self {
        self.extras = extras;
        self
    }

    /// Sets the environment marker (builder pattern)
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Sets the source line number (builder pattern)
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// The normalized form of the package name
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Broad shape of the constraint set
    pub fn kind(&self) -> SpecKind {
        self.constraints.kind()
    }

    /// Returns true if the requirement pins one exact version
    pub fn is_pinned(&self) -> bool {
        self.kind() == SpecKind::Pinned
    }

    /// The version a pinned or compatible-release requirement anchors to
    pub fn target_version(&self) -> Option<&Version> {
        self.constraints.target_version()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
