//! PEP 440 version subset used by requirements manifests
//!
//! Handles version formats:
//! - Plain releases: `1.2.3`, `2.0`, `1!2.0` (epoch)
//! - Pre-releases: `1.2a1`, `1.2b2`, `1.2rc1` (also `alpha`/`beta`/`c` spellings)
//! - Post/dev releases: `1.2.post1`, `1.2.dev3`
//!
//! Ordering follows PEP 440: epoch first, release segments compared
//! numerically with zero padding (`1.0` equals `1.0.0`), then
//! `dev < alpha < beta < rc < final < post` within the same release.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^v?(?:(?P<epoch>\d+)!)?(?P<release>\d+(?:\.\d+)*)(?:[._-]?(?P<pre>rc|alpha|beta|a|b|c)(?P<pren>\d*)|\.(?P<tail>post|dev)(?P<tailn>\d+))?$",
    )
    .unwrap()
});

/// Error returned when a version string does not parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version '{0}'")]
pub struct VersionError(pub String);

/// Release phase of a version
///
/// Variant order is the comparison order for versions sharing a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Development release (`.devN`)
    Dev(u64),
    /// Alpha pre-release (`aN`)
    Alpha(u64),
    /// Beta pre-release (`bN`)
    Beta(u64),
    /// Release candidate (`rcN`, also spelled `cN`)
    Rc(u64),
    /// Final release (no suffix)
    Final,
    /// Post release (`.postN`)
    Post(u64),
}

impl Phase {
    /// Returns true for phases that precede the final release
    pub fn is_prerelease(&self) -> bool {
        matches!(
            self,
            Phase::Dev(_) | Phase::Alpha(_) | Phase::Beta(_) | Phase::Rc(_)
        )
    }
}

/// A parsed package version
///
/// The release segments are kept exactly as written; equality and ordering
/// pad with zeros, so `1.0` and `1.0.0` compare equal while still
/// displaying differently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    /// Version epoch (`N!` prefix), 0 when absent
    pub epoch: u64,
    /// Numeric release segments
    pub release: Vec<u64>,
    /// Release phase
    pub phase: Phase,
}

impl Version {
    /// Creates a final-release version from release segments
    pub fn release(segments: impl Into<Vec<u64>>) -> Self {
        Self {
            epoch: 0,
            release: segments.into(),
            phase: Phase::Final,
        }
    }

    /// Returns true if this version is a pre-release (dev/alpha/beta/rc)
    pub fn is_prerelease(&self) -> bool {
        self.phase.is_prerelease()
    }

    /// Returns true if the release segments start with `prefix`
    ///
    /// Missing segments are treated as zero, so `1.4` matches the
    /// prefix `[1, 4, 0]` but not `[1, 5]`.
    pub fn release_starts_with(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, p)| self.release.get(i).copied().unwrap_or(0) == *p)
    }

    fn release_trimmed(&self) -> &[u64] {
        let mut end = self.release.len();
        while end > 1 && self.release[end - 1] == 0 {
            end -= 1;
        }
        &self.release[..end]
    }
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let pa = a.get(i).copied().unwrap_or(0);
        let pb = b.get(i).copied().unwrap_or(0);
        match pa.cmp(&pb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(&self.release, &other.release))
            .then_with(|| self.phase.cmp(&other.phase))
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

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        self.release_trimmed().hash(state);
        self.phase.hash(state);
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = VERSION_RE
            .captures(trimmed)
            .ok_or_else(|| VersionError(trimmed.to_string()))?;

        let epoch = match caps.name("epoch") {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| VersionError(trimmed.to_string()))?,
            None => 0,
        };

        let mut release = Vec::new();
        for part in caps["release"].split('.') {
            release.push(part.parse().map_err(|_| VersionError(trimmed.to_string()))?);
        }

        let phase = if let Some(pre) = caps.name("pre") {
            let n: u64 = match caps.name("pren").map(|m| m.as_str()) {
                Some("") | None => 0,
                Some(digits) => digits
                    .parse()
                    .map_err(|_| VersionError(trimmed.to_string()))?,
            };
            match pre.as_str().to_ascii_lowercase().as_str() {
                "a" | "alpha" => Phase::Alpha(n),
                "b" | "beta" => Phase::Beta(n),
                _ => Phase::Rc(n),
            }
        } else if let Some(tail) = caps.name("tail") {
            let n: u64 = caps["tailn"]
                .parse()
                .map_err(|_| VersionError(trimmed.to_string()))?;
            match tail.as_str().to_ascii_lowercase().as_str() {
                "post" => Phase::Post(n),
                _ => Phase::Dev(n),
            }
        } else {
            Phase::Final
        };

        Ok(Version {
            epoch,
            release,
            phase,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let mut first = true;
        for part in &self.release {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", part)?;
            first = false;
        }
        match self.phase {
            Phase::Dev(n) => write!(f, ".dev{}", n),
            Phase::Alpha(n) => write!(f, "a{}", n),
            Phase::Beta(n) => write!(f, "b{}", n),
            Phase::Rc(n) => write!(f, "rc{}", n),
            Phase::Final => Ok(()),
            Phase::Post(n) => write!(f, ".post{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_plain_release() {
        let version = v("1.2.3");
        assert_eq!(version.epoch, 0);
        assert_eq!(version.release, vec![1, 2, 3]);
        assert_eq!(version.phase, Phase::Final);
    }

    #[test]
    fn test_parse_single_segment() {
        let version = v("2");
        assert_eq!(version.release, vec![2]);
    }

    #[test]
    fn test_parse_epoch() {
        let version = v("1!2.0");
        assert_eq!(version.epoch, 1);
        assert_eq!(version.release, vec![2, 0]);
    }

    #[test]
    fn test_parse_leading_v() {
        let version = v("v1.0.4");
        assert_eq!(version.release, vec![1, 0, 4]);
    }

    #[test]
    fn test_parse_prerelease_forms() {
        assert_eq!(v("1.0a1").phase, Phase::Alpha(1));
        assert_eq!(v("1.0alpha2").phase, Phase::Alpha(2));
        assert_eq!(v("1.0b3").phase, Phase::Beta(3));
        assert_eq!(v("1.0beta1").phase, Phase::Beta(1));
        assert_eq!(v("1.0rc1").phase, Phase::Rc(1));
        assert_eq!(v("1.0c2").phase, Phase::Rc(2));
    }

    #[test]
    fn test_parse_pre_without_number() {
        assert_eq!(v("1.0a").phase, Phase::Alpha(0));
    }

    #[test]
    fn test_parse_post_and_dev() {
        assert_eq!(v("1.0.post2").phase, Phase::Post(2));
        assert_eq!(v("1.0.dev5").phase, Phase::Dev(5));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Version>().is_err());
        assert!("not-a-version".parse::<Version>().is_err());
        assert!("1.0.x".parse::<Version>().is_err());
        assert!("1..0".parse::<Version>().is_err());
    }

    #[test]
    fn test_zero_padding_equality() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1"), v("1.0"));
        assert_ne!(v("1.0"), v("1.0.1"));
    }

    #[test]
    fn test_ordering_releases() {
        assert!(v("1.0.0") < v("2.0.0"));
        assert!(v("1.9.0") < v("1.10.0"));
        assert!(v("1.0") < v("1.0.1"));
    }

    #[test]
    fn test_ordering_phases() {
        assert!(v("1.0.dev1") < v("1.0a1"));
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b1") < v("1.0rc1"));
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0.post1"));
    }

    #[test]
    fn test_ordering_epoch_wins() {
        assert!(v("2.0") < v("1!1.0"));
    }

    #[test]
    fn test_prerelease_detection() {
        assert!(v("1.0a1").is_prerelease());
        assert!(v("1.0rc1").is_prerelease());
        assert!(v("1.0.dev1").is_prerelease());
        assert!(!v("1.0").is_prerelease());
        assert!(!v("1.0.post1").is_prerelease());
    }

    #[test]
    fn test_release_starts_with() {
        assert!(v("1.4.1").release_starts_with(&[1, 4]));
        assert!(v("1.4").release_starts_with(&[1, 4]));
        assert!(v("1.4").release_starts_with(&[1, 4, 0]));
        assert!(!v("1.5").release_starts_with(&[1, 4]));
        assert!(!v("1.0").release_starts_with(&[1, 4]));
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(v("1.2.3").to_string(), "1.2.3");
        assert_eq!(v("1.0a1").to_string(), "1.0a1");
        assert_eq!(v("1.0.post2").to_string(), "1.0.post2");
        assert_eq!(v("1!2.0").to_string(), "1!2.0");
        assert_eq!(v("1.0.dev3").to_string(), "1.0.dev3");
    }

    #[test]
    fn test_display_preserves_segment_count() {
        assert_eq!(v("1.0").to_string(), "1.0");
        assert_eq!(v("1.0.0").to_string(), "1.0.0");
    }

    #[test]
    fn test_serde_round_trip() {
        let version = v("1.2rc1");
        let json = serde_json::to_string(&version).unwrap();
        let parsed: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, version);
    }
}
