//! Offline validation of parsed manifests
//!
//! Checks the syntactic properties a requirements manifest must hold:
//! - Every non-comment, non-directive line parses as a specifier
//! - Package names are unique after normalization
//! - Constraint conjunctions are satisfiable
//!
//! Plus one hygiene warning: requirements without any constraint, since
//! documentation builds expect reproducible installs.

use crate::domain::{ConstraintError, Finding};
use crate::manifest::{Line, ParsedManifest, SpecifierError};

/// Runs all checks over a parsed manifest
///
/// Findings come back ordered by line number.
pub fn lint(parsed: &ParsedManifest) -> Vec<Finding> {
    let mut findings = Vec::new();

    for record in &parsed.records {
        match &record.line {
            Line::Invalid { error, .. } => {
                findings.push(finding_for_specifier_error(record.number, error));
            }
            Line::Spec(requirement) => {
                if !requirement.constraints.is_satisfiable() {
                    findings.push(Finding::conflicting_constraints(
                        requirement.name.clone(),
                        record.number,
                        &requirement.constraints.to_string(),
                    ));
                }
                if requirement.constraints.is_empty() {
                    findings.push(Finding::unpinned_requirement(
                        requirement.name.clone(),
                        record.number,
                    ));
                }
            }
            _ => {}
        }
    }

    let (_, duplicates) = parsed.requirement_set();
    for duplicate in duplicates {
        findings.push(Finding::duplicate_package(
            duplicate.name,
            duplicate.first_line,
            duplicate.line,
        ));
    }

    findings.sort_by_key(|f| f.line);
    findings
}

fn finding_for_specifier_error(line: usize, error: &SpecifierError) -> Finding {
    match error {
        SpecifierError::Constraint(ConstraintError::CompatiblePrecision(version)) => {
            Finding::invalid_compatible_release(line, version)
        }
        other => Finding::parse_error(line, other.to_string()),
    }
}
