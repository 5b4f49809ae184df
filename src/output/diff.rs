//! Diff output formatter
//!
//! Shows pending rewrites as unified-diff style old/new specifier lines,
//! one hunk per file with updates.

use crate::manifest::rewrite_specifier;
use crate::orchestrator::OrchestratorResult;
use crate::output::OutputFormatter;
use colored::Colorize;
use std::io::Write;

/// Diff formatter
pub struct DiffFormatter {
    /// Whether this is a dry-run
    dry_run: bool,
}

impl DiffFormatter {
    /// Creates a new diff formatter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl OutputFormatter for DiffFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let mut wrote_any = false;

        for report in &result.summary.files {
            if !report.has_updates() {
                continue;
            }
            wrote_any = true;

            writeln!(writer, "--- {}", report.path.display())?;
            writeln!(writer, "+++ {}", report.path.display())?;

            for update in report.updates() {
                if let crate::domain::UpdateResult::Update {
                    requirement,
                    new_version,
                    ..
                } = update
                {
                    writeln!(writer, "{}", format!("-{}", requirement.raw).red())?;
                    writeln!(
                        writer,
                        "{}",
                        format!("+{}", rewrite_specifier(requirement, new_version)).green()
                    )?;
                }
            }
            writeln!(writer)?;
        }

        if !wrote_any {
            let note = if self.dry_run {
                "(dry-run) no updates available"
            } else {
                "no updates available"
            };
            writeln!(writer, "{}", note)?;
        }

        Ok(())
    }
}
