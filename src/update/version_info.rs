//! Version information from the registry

use crate::domain::Version;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// A package version known to the registry, with its release date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// The version string as published
    pub version: String,
    /// When this version was released
    pub released_at: DateTime<Utc>,
    /// Parsed form used for ordering and matching
    #[serde(skip)]
    pub parsed: Version,
}

impl VersionInfo {
    /// Creates a VersionInfo, returning None for unparseable versions
    pub fn new(version: &str, released_at: DateTime<Utc>) -> Option<Self> {
        let parsed: Version = version.parse().ok()?;
        Some(Self {
            version: version.to_string(),
            released_at,
            parsed,
        })
    }

    /// Returns true for dev/alpha/beta/rc versions
    pub fn is_prerelease(&self) -> bool {
        self.parsed.is_prerelease()
    }
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed
            .cmp(&other.parsed)
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.released_at.cmp(&other.released_at))
    }
}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
