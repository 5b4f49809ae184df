//! Update filter configuration
//!
//! Encapsulates the CLI filter options consulted during update judgment.

use crate::domain::normalize_name;
use std::time::Duration;

/// Filter configuration for update judgment
#[derive(Debug, Clone, Default)]
pub struct UpdateFilter {
    /// Packages to exclude from updates (normalized on comparison)
    pub exclude: Vec<String>,
    /// If non-empty, only update these packages
    pub only: Vec<String>,
    /// Minimum age for versions to be considered
    pub min_age: Option<Duration>,
}

impl UpdateFilter {
    /// Creates a filter with default settings (process all)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets packages to exclude
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Sets packages to include (only list)
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    /// Sets minimum age for versions
    pub fn with_min_age(mut self, age: Duration) -> Self {
        self.min_age = Some(age);
        self
    }

    /// Checks whether a package passes the exclude/only filters
    ///
    /// Names are compared in normalized form, so `--only Sphinx` matches
    /// a `sphinx` declaration.
    pub fn should_process_package(&self, name: &str) -> bool {
        let normalized = normalize_name(name);
        if !self.only.is_empty() {
            return self.only.iter().any(|p| normalize_name(p) == normalized);
        }
        !self.exclude.iter().any(|p| normalize_name(p) == normalized)
    }
}
