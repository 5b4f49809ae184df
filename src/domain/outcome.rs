//! Update decision result types

use super::requirement::Requirement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why a requirement was not updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Package was excluded via --exclude
    Excluded,
    /// Package not in the --only list
    NotInOnlyList,
    /// Requirement carries no version constraint to rewrite
    Unconstrained,
    /// Multi-clause or bound-style constraints are never rewritten
    Range,
    /// Constraint already admits or names the latest version
    AlreadyLatest,
    /// No eligible version found (age filter, only pre-releases, ...)
    NoSuitableVersion,
    /// Registry lookup failed
    FetchFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Excluded => write!(f, "excluded by --exclude"),
            SkipReason::NotInOnlyList => write!(f, "not in --only list"),
            SkipReason::Unconstrained => write!(f, "no version constraint"),
            SkipReason::Range => write!(f, "range constraints are not rewritten"),
            SkipReason::AlreadyLatest => write!(f, "already at latest"),
            SkipReason::NoSuitableVersion => write!(f, "no suitable version"),
            SkipReason::FetchFailed(msg) => write!(f, "fetch failed: {}", msg),
        }
    }
}

/// Result of the update decision for a single requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateResult {
    /// A newer version is available for the requirement
    Update {
        /// The requirement being updated
        requirement: Requirement,
        /// The version to rewrite the constraint to
        new_version: String,
        /// Release date of the new version, when known
        #[serde(skip_serializing_if = "Option::is_none", default)]
        released_at: Option<DateTime<Utc>>,
    },
    /// The requirement is left alone
    Skip {
        /// The requirement that was skipped
        requirement: Requirement,
        /// Why it was skipped
        reason: SkipReason,
    },
}

impl UpdateResult {
    /// Creates an Update result
    pub fn update(requirement: Requirement, new_version: impl Into<String>) -> Self {
        UpdateResult::Update {
            requirement,
            new_version: new_version.into(),
            released_at: None,
        }
    }

    /// Creates an Update result carrying the release date
    pub fn update_with_date(
        requirement: Requirement,
        new_version: impl Into<String>,
        released_at: DateTime<Utc>,
    ) -> Self {
        UpdateResult::Update {
            requirement,
            new_version: new_version.into(),
            released_at: Some(released_at),
        }
    }

    /// Creates a Skip result
    pub fn skip(requirement: Requirement, reason: SkipReason) -> Self {
        UpdateResult::Skip {
            requirement,
            reason,
        }
    }

    /// Creates a Skip result for already-at-latest
    pub fn skip_already_latest(requirement: Requirement) -> Self {
        Self::skip(requirement, SkipReason::AlreadyLatest)
    }

    /// Creates a Skip result for a failed registry lookup
    pub fn skip_fetch_failed(requirement: Requirement, message: impl Into<String>) -> Self {
        Self::skip(requirement, SkipReason::FetchFailed(message.into()))
    }

    /// Returns true if this is an update result
    pub fn is_update(&self) -> bool {
        matches!(self, UpdateResult::Update { .. })
    }

    /// Returns true if this is a skip result
    pub fn is_skip(&self) -> bool {
        matches!(self, UpdateResult::Skip { .. })
    }

    /// Returns the requirement reference
    pub fn requirement(&self) -> &Requirement {
        match self {
            UpdateResult::Update { requirement, .. } => requirement,
            UpdateResult::Skip { requirement, .. } => requirement,
        }
    }

    /// Returns the package name
    pub fn package_name(&self) -> &str {
        &self.requirement().name
    }
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateResult::Update {
                requirement,
                new_version,
                ..
            } => {
                write!(f, "{}: {} → {}", requirement.name, requirement.constraints, new_version)
            }
            UpdateResult::Skip {
                requirement,
                reason,
            } => {
                write!(f, "{}: skipped ({})", requirement.name, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConstraintSet;
    use chrono::TimeZone;

    fn sample_requirement() -> Requirement {
        Requirement::new("sphinx", ConstraintSet::parse("~=5.3.0").unwrap()).at_line(1)
    }

    #[test]
    fn test_update_result() {
        let result = UpdateResult::update(sample_requirement(), "6.0.0");
        assert!(result.is_update());
        assert!(!result.is_skip());
        assert_eq!(result.package_name(), "sphinx");
    }

    #[test]
    fn test_update_with_date() {
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let result = UpdateResult::update_with_date(sample_requirement(), "6.0.0", date);
        if let UpdateResult::Update { released_at, .. } = result {
            assert_eq!(released_at, Some(date));
        } else {
            panic!("expected update");
        }
    }

    #[test]
    fn test_skip_result() {
        let result = UpdateResult::skip(sample_requirement(), SkipReason::Range);
        assert!(result.is_skip());
        assert_eq!(result.package_name(), "sphinx");
    }

    #[test]
    fn test_skip_helpers() {
        let latest = UpdateResult::skip_already_latest(sample_requirement());
        assert!(matches!(
            latest,
            UpdateResult::Skip {
                reason: SkipReason::AlreadyLatest,
                ..
            }
        ));

        let failed = UpdateResult::skip_fetch_failed(sample_requirement(), "timeout");
        assert!(matches!(
            failed,
            UpdateResult::Skip {
                reason: SkipReason::FetchFailed(_),
                ..
            }
        ));
    }

    #[test]
    fn test_display_update() {
        let result = UpdateResult::update(sample_requirement(), "6.0.0");
        let text = format!("{}", result);
        assert!(text.contains("sphinx"));
        assert!(text.contains("6.0.0"));
    }

    #[test]
    fn test_display_skip() {
        let result = UpdateResult::skip(sample_requirement(), SkipReason::Unconstrained);
        assert!(format!("{}", result).contains("skipped"));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::AlreadyLatest.to_string(), "already at latest");
        assert!(SkipReason::FetchFailed("boom".to_string())
            .to_string()
            .contains("boom"));
    }

    #[test]
    fn test_serde_update_result() {
        let result = UpdateResult::update(sample_requirement(), "6.0.0");
        let json = serde_json::to_string(&result).unwrap();
        let parsed: UpdateResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
