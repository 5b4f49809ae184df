//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-file finding display with line numbers and severity colors
//! - Update display with version change class (major/minor/patch)
//! - Skip display with reasons in verbose mode
//! - Run summary with a finding/update breakdown

use crate::domain::{Finding, Severity, UpdateResult, Version};
use crate::orchestrator::OrchestratorResult;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Version change class between two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// First release segment changed (breaking)
    Major,
    /// Second release segment changed (features)
    Minor,
    /// Anything after that (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determines the change class between two version strings
    pub fn from_versions(old: &str, new: &str) -> Self {
        let (old, new) = match (old.parse::<Version>(), new.parse::<Version>()) {
            (Ok(old), Ok(new)) => (old, new),
            _ => return VersionChangeType::Unknown,
        };

        let segment = |v: &Version, i: usize| v.release.get(i).copied().unwrap_or(0);
        if old.epoch != new.epoch || segment(&old, 0) != segment(&new, 0) {
            VersionChangeType::Major
        } else if segment(&old, 1) != segment(&new, 1) {
            VersionChangeType::Minor
        } else {
            VersionChangeType::Patch
        }
    }

    /// Display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
}

impl TextFormatter {
    /// Creates a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self { verbosity, dry_run }
    }

    fn severity_label(severity: Severity) -> String {
        match severity {
            Severity::Error => "error".red().bold().to_string(),
            Severity::Warning => "warning".yellow().to_string(),
        }
    }

    fn write_finding(&self, finding: &Finding, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            writer,
            "  {:>4}  {}  {}  {}",
            finding.line,
            Self::severity_label(finding.severity()),
            finding.kind.code().dimmed(),
            finding.message
        )
    }

    fn write_update(
        &self,
        result: &UpdateResult,
        name_width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if let UpdateResult::Update {
            requirement,
            new_version,
            ..
        } = result
        {
            let old = requirement
                .target_version()
                .map(|v| v.to_string())
                .unwrap_or_default();
            let change = VersionChangeType::from_versions(&old, new_version);
            writeln!(
                writer,
                "  {:<width$}  {} → {}  ({})",
                requirement.name.bold(),
                old,
                new_version.green(),
                change.colored_label(),
                width = name_width
            )?;
        }
        Ok(())
    }

    fn write_skip(&self, result: &UpdateResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if let UpdateResult::Skip {
            requirement,
            reason,
        } = result
        {
            writeln!(
                writer,
                "  {}  {}",
                requirement.name.dimmed(),
                format!("({})", reason).dimmed()
            )?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let summary = &result.summary;

        if summary.files.is_empty() {
            writeln!(writer, "No requirements manifests found.")?;
            return Ok(());
        }

        let prefix = if self.dry_run {
            format!("{} ", "(dry-run)".cyan())
        } else {
            String::new()
        };

        for report in &summary.files {
            if self.verbosity == Verbosity::Quiet && report.is_clean() {
                continue;
            }

            writeln!(writer, "{}{}", prefix, report.path.display().to_string().bold())?;

            for finding in &report.findings {
                self.write_finding(finding, writer)?;
            }

            if report.has_updates() {
                let name_width = report
                    .updates()
                    .map(|u| u.package_name().len())
                    .max()
                    .unwrap_or(0);
                for update in report.updates() {
                    self.write_update(update, name_width, writer)?;
                }
            }

            if self.verbosity == Verbosity::Verbose {
                for skip in report.skips() {
                    self.write_skip(skip, writer)?;
                }
            }

            if report.is_clean() && self.verbosity != Verbosity::Quiet {
                writeln!(writer, "  {}", "ok".green())?;
            }
            writeln!(writer)?;
        }

        if self.verbosity != Verbosity::Quiet {
            let mut parts = vec![format!(
                "{} file{}",
                summary.files_processed(),
                if summary.files_processed() == 1 { "" } else { "s" }
            )];
            if summary.total_findings() > 0 {
                parts.push(format!(
                    "{} finding{} ({} error{}, {} warning{})",
                    summary.total_findings(),
                    if summary.total_findings() == 1 { "" } else { "s" },
                    summary.total_errors(),
                    if summary.total_errors() == 1 { "" } else { "s" },
                    summary.total_warnings(),
                    if summary.total_warnings() == 1 { "" } else { "s" },
                ));
            }
            if result.checked_registry {
                parts.push(format!(
                    "{} update{} available",
                    summary.total_updates(),
                    if summary.total_updates() == 1 { "" } else { "s" }
                ));
            }
            writeln!(writer, "{}{}", prefix, parts.join(", "))?;
        }

        Ok(())
    }
}
