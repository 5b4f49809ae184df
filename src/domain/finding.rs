//! Validation findings reported against a manifest

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something worth fixing, but the manifest still works
    Warning,
    /// The manifest violates the format or its invariants
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Kind of validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Line does not parse as a specifier
    ParseError,
    /// Normalized package name declared more than once
    DuplicatePackage,
    /// No version can satisfy the constraint conjunction
    ConflictingConstraints,
    /// `~=` used with a single-segment version
    InvalidCompatibleRelease,
    /// Requirement carries no version constraint at all
    UnpinnedRequirement,
}

impl FindingKind {
    /// Stable identifier used in output
    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::ParseError => "parse-error",
            FindingKind::DuplicatePackage => "duplicate-package",
            FindingKind::ConflictingConstraints => "conflicting-constraints",
            FindingKind::InvalidCompatibleRelease => "invalid-compatible-release",
            FindingKind::UnpinnedRequirement => "unpinned-requirement",
        }
    }

    /// Severity associated with this kind
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::UnpinnedRequirement => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A single validation finding with its location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// What was found
    pub kind: FindingKind,
    /// 1-based line number the finding points at
    pub line: usize,
    /// Package the finding is about, when one is known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub package: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl Finding {
    /// Creates a parse-error finding
    pub fn parse_error(line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::ParseError,
            line,
            package: None,
            message: message.into(),
        }
    }

    /// Creates a duplicate-package finding pointing at the repeat
    pub fn duplicate_package(name: impl Into<String>, first_line: usize, line: usize) -> Self {
        let name = name.into();
        let message = format!(
            "'{}' is already declared on line {}",
            name, first_line
        );
        Self {
            kind: FindingKind::DuplicatePackage,
            line,
            package: Some(name),
            message,
        }
    }

    /// Creates a conflicting-constraints finding
    pub fn conflicting_constraints(name: impl Into<String>, line: usize, spec: &str) -> Self {
        let name = name.into();
        let message = format!("no version can satisfy '{}'", spec);
        Self {
            kind: FindingKind::ConflictingConstraints,
            line,
            package: Some(name),
            message,
        }
    }

    /// Creates an invalid-compatible-release finding
    pub fn invalid_compatible_release(line: usize, version: &str) -> Self {
        Self {
            kind: FindingKind::InvalidCompatibleRelease,
            line,
            package: None,
            message: format!(
                "'~={}' needs at least two version segments to define a compatible range",
                version
            ),
        }
    }

    /// Creates an unpinned-requirement warning
    pub fn unpinned_requirement(name: impl Into<String>, line: usize) -> Self {
        let name = name.into();
        let message = format!("'{}' has no version constraint", name);
        Self {
            kind: FindingKind::UnpinnedRequirement,
            line,
            package: Some(name),
            message,
        }
    }

    /// Severity of this finding
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Returns true for error-severity findings
    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {}: {}: {}",
            self.line,
            self.severity(),
            self.kind.code(),
            self.message
        )
    }
}
