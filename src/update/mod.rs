//! Update judgment logic for requirements
//!
//! This module provides:
//! - Update filter configuration from CLI args
//! - Version info from the registry with release dates
//! - The judgment engine deciding whether a pin can move forward

mod filter;
mod version_info;

pub use filter::UpdateFilter;
pub use version_info::VersionInfo;

use crate::domain::{Requirement, SkipReason, SpecKind, UpdateResult};
use chrono::{DateTime, Utc};

/// Decides whether a requirement should be updated
pub struct UpdateJudge {
    /// Filter configuration
    filter: UpdateFilter,
    /// Current time for age calculations
    now: DateTime<Utc>,
}

impl UpdateJudge {
    /// Creates a judge with the given filter
    pub fn new(filter: UpdateFilter) -> Self {
        Self {
            filter,
            now: Utc::now(),
        }
    }

    /// Creates a judge with a fixed current time (for testing)
    pub fn with_time(filter: UpdateFilter, now: DateTime<Utc>) -> Self {
        Self { filter, now }
    }

    /// Checks whether a requirement should be considered at all
    ///
    /// Returns Some(reason) when it is skipped without a registry lookup.
    pub fn should_skip(&self, requirement: &Requirement) -> Option<SkipReason> {
        if !self.filter.should_process_package(&requirement.name) {
            return Some(if self.filter.only.is_empty() {
                SkipReason::Excluded
            } else {
                SkipReason::NotInOnlyList
            });
        }

        match requirement.kind() {
            SpecKind::Unconstrained => Some(SkipReason::Unconstrained),
            SpecKind::Range | SpecKind::Exclusion => Some(SkipReason::Range),
            SpecKind::Pinned | SpecKind::Compatible => None,
        }
    }

    /// Judges a requirement against the versions the registry knows
    pub fn judge(&self, requirement: &Requirement, available: &[VersionInfo]) -> UpdateResult {
        if let Some(reason) = self.should_skip(requirement) {
            return UpdateResult::skip(requirement.clone(), reason);
        }

        let Some(current) = requirement.target_version() else {
            return UpdateResult::skip(requirement.clone(), SkipReason::Range);
        };

        if available.is_empty() {
            return UpdateResult::skip_fetch_failed(
                requirement.clone(),
                "no versions available",
            );
        }

        // stable releases only, unless the manifest already pins a
        // pre-release of this package
        let allow_prerelease = current.is_prerelease();
        let stable: Vec<&VersionInfo> = available
            .iter()
            .filter(|v| allow_prerelease || !v.is_prerelease())
            .collect();

        let eligible: Vec<&VersionInfo> = if let Some(min_age) = self.filter.min_age {
            match chrono::Duration::from_std(min_age) {
                Ok(age) => {
                    let cutoff = self.now - age;
                    stable
                        .into_iter()
                        .filter(|v| v.released_at <= cutoff)
                        .collect()
                }
                Err(_) => stable,
            }
        } else {
            stable
        };

        let Some(latest) = eligible.into_iter().max() else {
            return UpdateResult::skip(requirement.clone(), SkipReason::NoSuitableVersion);
        };

        if latest.parsed <= *current {
            return UpdateResult::skip_already_latest(requirement.clone());
        }

        UpdateResult::update_with_date(requirement.clone(), &latest.version, latest.released_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConstraintSet;
    use chrono::TimeZone;
    use std::time::Duration;

    fn requirement(spec: &str) -> Requirement {
        let (name, constraints) = match spec.find(|c: char| "=~<>!".contains(c)) {
            Some(pos) => (
                &spec[..pos],
                ConstraintSet::parse(&spec[pos..]).unwrap(),
            ),
            None => (spec, ConstraintSet::empty()),
        };
        Requirement::new(name, constraints).at_line(1)
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn version_days_before(version: &str, now: DateTime<Utc>, days: i64) -> VersionInfo {
        VersionInfo::new(version, now - chrono::Duration::days(days)).unwrap()
    }

    fn versions(specs: &[&str]) -> Vec<VersionInfo> {
        let now = fixed_time();
        specs
            .iter()
            .enumerate()
            .map(|(i, v)| version_days_before(v, now, 100 - i as i64))
            .collect()
    }

    #[test]
    fn test_judge_updates_pin() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(
            &requirement("sphinx==5.3.0"),
            &versions(&["5.3.0", "6.0.0", "6.1.0"]),
        );
        assert!(result.is_update());
        if let UpdateResult::Update { new_version, .. } = result {
            assert_eq!(new_version, "6.1.0");
        }
    }

    #[test]
    fn test_judge_updates_compatible_release() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(
            &requirement("sphinx-rtd-theme~=1.0.4"),
            &versions(&["1.0.4", "1.2.0"]),
        );
        assert!(result.is_update());
    }

    #[test]
    fn test_judge_already_latest() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(&requirement("sphinx==6.1.0"), &versions(&["5.3.0", "6.1.0"]));
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::AlreadyLatest,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_prevents_downgrade() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(&requirement("sphinx==7.0.0"), &versions(&["5.3.0", "6.1.0"]));
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::AlreadyLatest,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_numeric_comparison() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(
            &requirement("sphinx==1.9.0"),
            &versions(&["1.8.0", "1.9.0", "1.10.0"]),
        );
        assert!(result.is_update());
        if let UpdateResult::Update { new_version, .. } = result {
            assert_eq!(new_version, "1.10.0");
        }
    }

    #[test]
    fn test_judge_skips_range() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(
            &requirement("docutils>=0.14,<0.18"),
            &versions(&["0.17", "0.19"]),
        );
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::Range,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_skips_unconstrained() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(&requirement("mock"), &versions(&["1.0.0"]));
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::Unconstrained,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_excluded() {
        let filter = UpdateFilter::new().with_exclude(vec!["sphinx".to_string()]);
        let judge = UpdateJudge::with_time(filter, fixed_time());
        let result = judge.judge(&requirement("sphinx==1.0.0"), &versions(&["2.0.0"]));
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::Excluded,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_not_in_only_list() {
        let filter = UpdateFilter::new().with_only(vec!["docutils".to_string()]);
        let judge = UpdateJudge::with_time(filter, fixed_time());
        let result = judge.judge(&requirement("sphinx==1.0.0"), &versions(&["2.0.0"]));
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::NotInOnlyList,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_no_versions() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(&requirement("sphinx==1.0.0"), &[]);
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::FetchFailed(_),
                ..
            }
        ));
    }

    #[test]
    fn test_judge_ignores_prereleases_for_stable_pin() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(
            &requirement("sphinx==6.0.0"),
            &versions(&["6.0.0", "7.0.0rc1", "7.0.0.dev1"]),
        );
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::AlreadyLatest,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_allows_prerelease_when_pinned_to_one() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(
            &requirement("sphinx==7.0.0rc1"),
            &versions(&["7.0.0rc1", "7.0.0rc2"]),
        );
        assert!(result.is_update());
        if let UpdateResult::Update { new_version, .. } = result {
            assert_eq!(new_version, "7.0.0rc2");
        }
    }

    #[test]
    fn test_judge_prefers_stable_over_newer_prerelease() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        let result = judge.judge(
            &requirement("sphinx==6.0.0"),
            &versions(&["6.0.0", "6.1.0", "7.0.0b1"]),
        );
        assert!(result.is_update());
        if let UpdateResult::Update { new_version, .. } = result {
            assert_eq!(new_version, "6.1.0");
        }
    }

    #[test]
    fn test_judge_age_filter() {
        let now = fixed_time();
        let filter = UpdateFilter::new().with_min_age(Duration::from_secs(7 * 24 * 60 * 60));
        let judge = UpdateJudge::with_time(filter, now);

        let available = vec![
            version_days_before("1.5.0", now, 10),
            version_days_before("2.0.0", now, 3),
        ];
        let result = judge.judge(&requirement("sphinx==1.0.0"), &available);
        assert!(result.is_update());
        if let UpdateResult::Update { new_version, .. } = result {
            assert_eq!(new_version, "1.5.0");
        }
    }

    #[test]
    fn test_judge_age_filter_no_suitable() {
        let now = fixed_time();
        let filter = UpdateFilter::new().with_min_age(Duration::from_secs(30 * 24 * 60 * 60));
        let judge = UpdateJudge::with_time(filter, now);

        let available = vec![
            version_days_before("1.5.0", now, 10),
            version_days_before("2.0.0", now, 3),
        ];
        let result = judge.judge(&requirement("sphinx==1.0.0"), &available);
        assert!(matches!(
            result,
            UpdateResult::Skip {
                reason: SkipReason::NoSuitableVersion,
                ..
            }
        ));
    }

    #[test]
    fn test_should_skip_returns_none_for_pin() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        assert!(judge.should_skip(&requirement("sphinx==1.0.0")).is_none());
        assert!(judge.should_skip(&requirement("sphinx~=1.0.0")).is_none());
    }

    #[test]
    fn test_should_skip_exclusion_constraints() {
        let judge = UpdateJudge::with_time(UpdateFilter::new(), fixed_time());
        assert_eq!(
            judge.should_skip(&requirement("sphinx!=5.0")),
            Some(SkipReason::Range)
        );
    }
}
