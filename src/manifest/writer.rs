//! Applying version updates to manifest files
//!
//! This module provides:
//! - ManifestWriter for rewriting decided updates into files
//! - Dry-run mode support (no file modifications)
//! - Per-update error handling with graceful continuation

use crate::domain::{FileReport, UpdateResult};
use crate::error::ManifestError;
use crate::manifest::RequirementsParser;
use std::fs;
use std::path::PathBuf;

/// Writer that applies decided updates to manifest files
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of applying updates to one manifest file
#[derive(Debug)]
pub struct WriteResult {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Number of updates successfully applied
    pub updates_applied: usize,
    /// Number of updates that failed
    pub updates_failed: usize,
    /// Whether the file was actually modified
    pub file_modified: bool,
    /// Errors encountered during update
    pub errors: Vec<String>,
}

impl WriteResult {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            updates_applied: 0,
            updates_failed: 0,
            file_modified: false,
            errors: Vec::new(),
        }
    }

    /// Returns true if any updates were successfully applied
    pub fn has_updates(&self) -> bool {
        self.updates_applied > 0
    }

    /// Returns true if any errors occurred
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl ManifestWriter {
    /// Creates a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Creates a ManifestWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Applies the updates recorded in a file report to the file itself
    pub fn apply_updates(&self, report: &FileReport) -> Result<WriteResult, ManifestError> {
        let path = &report.path;
        let mut result = WriteResult::new(path);

        let content = fs::read_to_string(path)
            .map_err(|e| ManifestError::read_error(path.clone(), e))?;

        let parser = RequirementsParser;
        let mut current = content.clone();

        for update in report.results.iter() {
            if let UpdateResult::Update {
                requirement,
                new_version,
                ..
            } = update
            {
                match parser.update_version(&current, &requirement.name, new_version) {
                    Ok(updated) => {
                        current = updated;
                        result.updates_applied += 1;
                    }
                    Err(e) => {
                        result.updates_failed += 1;
                        result
                            .errors
                            .push(format!("failed to update {}: {}", requirement.name, e));
                    }
                }
            }
        }

        if result.updates_applied > 0 && !self.dry_run {
            fs::write(path, &current)
                .map_err(|e| ManifestError::write_error(path.clone(), e))?;
            result.file_modified = true;
        }

        Ok(result)
    }

    /// Applies updates to every file report that has updates
    pub fn apply_all_updates(&self, reports: &[FileReport]) -> Vec<WriteResult> {
        reports
            .iter()
            .filter_map(|report| {
                if !report.has_updates() {
                    return None;
                }
                match self.apply_updates(report) {
                    Ok(result) => Some(result),
                    Err(e) => {
                        let mut result = WriteResult::new(&report.path);
                        result.errors.push(format!("failed to process manifest: {}", e));
                        Some(result)
                    }
                }
            })
            .collect()
    }
}
