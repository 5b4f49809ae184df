//! JSON output formatter for machine processing

use crate::orchestrator::OrchestratorResult;
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter
pub struct JsonFormatter;

/// Serializable view of a run
#[derive(Serialize)]
struct JsonReport<'a> {
    dry_run: bool,
    files: &'a [crate::domain::FileReport],
    totals: Totals,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct Totals {
    files: usize,
    findings: usize,
    errors: usize,
    warnings: usize,
    updates: usize,
    skips: usize,
}

impl JsonFormatter {
    /// Creates a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let summary = &result.summary;
        let report = JsonReport {
            dry_run: summary.dry_run,
            files: &summary.files,
            totals: Totals {
                files: summary.files_processed(),
                findings: summary.total_findings(),
                errors: summary.total_errors(),
                warnings: summary.total_warnings(),
                updates: summary.total_updates(),
                skips: summary.total_skips(),
            },
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        };

        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConstraintSet, FileReport, Finding, Requirement, RunSummary, UpdateResult};

    fn sample_result() -> OrchestratorResult {
        let mut report = FileReport::new("requirements.txt");
        report.add_finding(Finding::unpinned_requirement("mock", 2));
        report.add_result(UpdateResult::update(
            Requirement::new("sphinx", ConstraintSet::parse("==5.3.0").unwrap()).at_line(1),
            "6.1.0",
        ));

        let mut summary = RunSummary::new(true);
        summary.add_file(report);
        OrchestratorResult {
            summary,
            write_results: Vec::new(),
            errors: Vec::new(),
            checked_registry: true,
        }
    }

    #[test]
    fn test_json_output_is_valid() {
        let formatter = JsonFormatter::new();
        let mut out = Vec::new();
        formatter.format(&sample_result(), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["totals"]["files"], 1);
        assert_eq!(value["totals"]["findings"], 1);
        assert_eq!(value["totals"]["updates"], 1);
    }

    #[test]
    fn test_json_output_includes_findings() {
        let formatter = JsonFormatter::new();
        let mut out = Vec::new();
        formatter.format(&sample_result(), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let findings = &value["files"][0]["findings"];
        assert_eq!(findings[0]["kind"], "unpinned_requirement");
        assert_eq!(findings[0]["line"], 2);
    }

    #[test]
    fn test_json_output_includes_update_results() {
        let formatter = JsonFormatter::new();
        let mut out = Vec::new();
        formatter.format(&sample_result(), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let first = &value["files"][0]["results"][0];
        assert_eq!(first["type"], "update");
        assert_eq!(first["new_version"], "6.1.0");
        assert_eq!(first["requirement"]["name"], "sphinx");
    }

    #[test]
    fn test_json_output_ends_with_newline() {
        let formatter = JsonFormatter::new();
        let mut out = Vec::new();
        formatter.format(&sample_result(), &mut out).unwrap();
        assert_eq!(out.last(), Some(&b'\n'));
    }
}
