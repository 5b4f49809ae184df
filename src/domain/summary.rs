//! Per-file and run-level result aggregation

use super::finding::{Finding, Severity};
use super::outcome::UpdateResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything reported against a single manifest file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Validation findings, ordered by line
    pub findings: Vec<Finding>,
    /// Update decisions, present when a registry check ran
    pub results: Vec<UpdateResult>,
    /// Whether an update will touch this file
    pub modified: bool,
}

impl FileReport {
    /// Creates an empty report for a file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            findings: Vec::new(),
            results: Vec::new(),
            modified: false,
        }
    }

    /// Adds a validation finding
    pub fn add_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Adds an update decision
    pub fn add_result(&mut self, result: UpdateResult) {
        if result.is_update() {
            self.modified = true;
        }
        self.results.push(result);
    }

    /// Number of error-severity findings
    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    /// Number of warning-severity findings
    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity() == Severity::Warning)
            .count()
    }

    /// Number of updates
    pub fn update_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_update()).count()
    }

    /// Number of skipped requirements
    pub fn skip_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_skip()).count()
    }

    /// Iterates over update decisions that are updates
    pub fn updates(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_update())
    }

    /// Iterates over update decisions that are skips
    pub fn skips(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.is_skip())
    }

    /// Returns true if any updates were decided for this file
    pub fn has_updates(&self) -> bool {
        self.update_count() > 0
    }

    /// Returns true if the file is clean: no findings, no pending updates
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && !self.has_updates()
    }
}

/// Aggregated results for a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Report for each manifest processed
    pub files: Vec<FileReport>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates an empty summary
    pub fn new(dry_run: bool) -> Self {
        Self {
            files: Vec::new(),
            dry_run,
        }
    }

    /// Adds a file report
    pub fn add_file(&mut self, report: FileReport) {
        self.files.push(report);
    }

    /// Number of manifests processed
    pub fn files_processed(&self) -> usize {
        self.files.len()
    }

    /// Number of files an update will touch
    pub fn files_modified(&self) -> usize {
        self.files.iter().filter(|f| f.modified).count()
    }

    /// Total findings across all files
    pub fn total_findings(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }

    /// Total error-severity findings
    pub fn total_errors(&self) -> usize {
        self.files.iter().map(|f| f.error_count()).sum()
    }

    /// Total warning-severity findings
    pub fn total_warnings(&self) -> usize {
        self.files.iter().map(|f| f.warning_count()).sum()
    }

    /// Total updates across all files
    pub fn total_updates(&self) -> usize {
        self.files.iter().map(|f| f.update_count()).sum()
    }

    /// Total skips across all files
    pub fn total_skips(&self) -> usize {
        self.files.iter().map(|f| f.skip_count()).sum()
    }

    /// Returns true if any error-severity finding exists
    pub fn has_errors(&self) -> bool {
        self.total_errors() > 0
    }

    /// Iterates over all updates across files
    pub fn all_updates(&self) -> impl Iterator<Item = &UpdateResult> {
        self.files.iter().flat_map(|f| f.updates())
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new(false)
    }
}
