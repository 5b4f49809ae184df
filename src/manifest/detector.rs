//! Requirements manifest discovery
//!
//! Finds the requirements files a project typically carries: the top
//! level `requirements.txt` and its variants, plus the conventional
//! `docs/` and `requirements/` locations used by documentation builds.

use std::fs;
use std::path::{Path, PathBuf};

/// A discovered manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestInfo {
    /// Path to the manifest
    pub path: PathBuf,
}

impl ManifestInfo {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Returns true for file names that follow requirements naming
/// conventions: `requirements.txt`, `requirements-docs.txt`,
/// `requirements_dev.txt`, `docs-requirements.txt`, ...
pub fn is_requirements_filename(name: &str) -> bool {
    if name == "requirements.txt" {
        return true;
    }
    if !name.ends_with(".txt") {
        return false;
    }
    name.starts_with("requirements-")
        || name.starts_with("requirements_")
        || name.ends_with("-requirements.txt")
        || name.ends_with("_requirements.txt")
}

/// Discovers requirements manifests under a path
///
/// A file path is returned as-is; a directory is scanned at the top
/// level plus the `docs/` and `requirements/` subdirectories. Inside a
/// `requirements/` directory every `.txt` file counts. Results are
/// sorted by path.
pub fn detect_manifests(path: &Path) -> Vec<ManifestInfo> {
    if path.is_file() {
        return vec![ManifestInfo::new(path)];
    }
    if !path.is_dir() {
        return Vec::new();
    }

    let mut found = Vec::new();
    collect_matching(path, &mut found, false);
    collect_matching(&path.join("docs"), &mut found, false);
    collect_matching(&path.join("requirements"), &mut found, true);

    found.sort_by(|a, b| a.path.cmp(&b.path));
    found
}

fn collect_matching(dir: &Path, found: &mut Vec<ManifestInfo>, any_txt: bool) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let matches = if any_txt {
            name.ends_with(".txt")
        } else {
            is_requirements_filename(name)
        };
        if matches {
            found.push(ManifestInfo::new(path));
        }
    }
}
