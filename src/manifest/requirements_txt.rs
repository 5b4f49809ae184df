//! Line-oriented parser for pip requirements manifests
//!
//! The format, as consumed by documentation build services:
//! - One dependency specifier per line
//! - `#` starts a comment (full-line, or trailing when preceded by
//!   whitespace)
//! - Blank lines are ignored
//! - Lines ending in `\` continue onto the next line
//! - Lines starting with `-` are pip directives (`-r`, `--index-url`, ...)
//!   and are recorded but never parsed as specifiers
//!
//! Parsing never fails as a whole: each line classifies independently, and
//! invalid specifiers are kept with their error for later reporting.

use crate::domain::{normalize_name, ConstraintSet, DuplicateRequirement, Requirement, RequirementSet};
use crate::error::ManifestError;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?").unwrap());

/// Errors produced while parsing a single specifier line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecifierError {
    /// The line does not start with a valid package name
    #[error("invalid package name in '{0}'")]
    InvalidName(String),

    /// Opening `[` without a closing `]`
    #[error("unterminated extras list in '{0}'")]
    UnterminatedExtras(String),

    /// `name @ url` references are outside the supported grammar
    #[error("direct references are not supported: '{0}'")]
    DirectReference(String),

    /// The constraint part failed to parse
    #[error(transparent)]
    Constraint(#[from] crate::domain::ConstraintError),
}

/// Classification of one logical manifest line
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Empty or whitespace-only line
    Blank,
    /// Full-line comment
    Comment,
    /// A pip directive such as `-r common.txt` or `--index-url ...`
    Directive { raw: String },
    /// A parsed dependency specifier
    Spec(Requirement),
    /// A line that should be a specifier but does not parse
    Invalid { raw: String, error: SpecifierError },
}

/// One logical line with its source position
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    /// 1-based number of the first physical line
    pub number: usize,
    /// True when the logical line was joined from continuations
    pub continued: bool,
    /// Classification of the line
    pub line: Line,
}

/// The parsed form of a whole manifest
#[derive(Debug, Clone, Default)]
pub struct ParsedManifest {
    /// All logical lines in file order
    pub records: Vec<LineRecord>,
}

impl ParsedManifest {
    /// Iterates over the successfully parsed requirements in file order
    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.records.iter().filter_map(|r| match &r.line {
            Line::Spec(req) => Some(req),
            _ => None,
        })
    }

    /// Builds the uniqueness-enforcing set; duplicates come back separately
    pub fn requirement_set(&self) -> (RequirementSet, Vec<DuplicateRequirement>) {
        RequirementSet::from_requirements(self.requirements().cloned())
    }
}

/// Parser for requirements manifests
pub struct RequirementsParser;

impl RequirementsParser {
    /// Parses manifest content into classified lines
    pub fn parse(&self, content: &str) -> ParsedManifest {
        let physical: Vec<&str> = content.lines().collect();
        let mut records = Vec::new();
        let mut i = 0;

        while i < physical.len() {
            let start = i;

            // full-line comments never continue, whatever they end with
            if physical[i].trim_start().starts_with('#') {
                records.push(LineRecord {
                    number: start + 1,
                    continued: false,
                    line: Line::Comment,
                });
                i += 1;
                continue;
            }

            let mut logical = String::new();
            loop {
                let line = physical[i];
                match strip_continuation(line) {
                    Some(head) if i + 1 < physical.len() => {
                        logical.push_str(head);
                        logical.push(' ');
                        i += 1;
                    }
                    _ => {
                        logical.push_str(line);
                        break;
                    }
                }
            }
            i += 1;

            records.push(LineRecord {
                number: start + 1,
                continued: i - start > 1,
                line: classify(&logical, start + 1),
            });
        }

        ParsedManifest { records }
    }

    /// Rewrites the version of one package in manifest content
    ///
    /// Only pinned (`==`) and compatible-release (`~=`) specifiers are
    /// rewritten. Leading whitespace and trailing comments of the line are
    /// preserved; the specifier itself is re-rendered.
    pub fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        let parsed = self.parse(content);
        let target = normalize_name(package);

        let (number, continued, requirement) = parsed
            .records
            .iter()
            .find_map(|record| match &record.line {
                Line::Spec(req) if req.normalized_name() == target => {
                    Some((record.number, record.continued, req))
                }
                _ => None,
            })
            .ok_or_else(|| ManifestError::rewrite_failed(package, "not listed in manifest"))?;

        if continued {
            return Err(ManifestError::rewrite_failed(
                package,
                "specifier spans continuation lines",
            ));
        }
        if !requirement.kind().is_rewritable() {
            return Err(ManifestError::rewrite_failed(
                package,
                "constraint is not a pin or compatible release",
            ));
        }

        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        let idx = number - 1;
        let old_line = &lines[idx];
        let (code, comment) = split_comment(old_line);
        let indent = &code[..code.len() - code.trim_start().len()];

        let mut new_line = format!("{}{}", indent, rewrite_specifier(requirement, new_version));
        if let Some(comment) = comment {
            let gap = &code[code.trim_end().len()..];
            new_line.push_str(if gap.is_empty() { "  " } else { gap });
            new_line.push_str(comment);
        }

        lines[idx] = new_line;
        let mut out = lines.join("\n");
        if content.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}

/// Renders a specifier with its version replaced, preserving name,
/// extras, operator style and marker
pub fn rewrite_specifier(requirement: &Requirement, new_version: &str) -> String {
    let mut spec = requirement.name.clone();
    if !requirement.extras.is_empty() {
        spec.push('[');
        spec.push_str(&requirement.extras.join(","));
        spec.push(']');
    }
    let op = match requirement.kind() {
        crate::domain::SpecKind::Compatible => "~=",
        _ => "==",
    };
    spec.push_str(op);
    spec.push_str(new_version);
    if let Some(marker) = &requirement.marker {
        spec.push_str("; ");
        spec.push_str(marker);
    }
    spec
}

/// Splits a physical line at its comment, if any
///
/// A `#` opens a comment only at the start of the line or after
/// whitespace, so `pkg==1.0#egg` keeps its `#`.
pub(crate) fn split_comment(line: &str) -> (&str, Option<&str>) {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return (&line[..i], Some(&line[i..]));
        }
    }
    (line, None)
}

fn strip_continuation(line: &str) -> Option<&str> {
    line.trim_end().strip_suffix('\\')
}

fn classify(logical: &str, number: usize) -> Line {
    let (code, _) = split_comment(logical);
    let trimmed = code.trim();

    if trimmed.is_empty() {
        return if logical.trim().is_empty() {
            Line::Blank
        } else {
            Line::Comment
        };
    }
    if trimmed.starts_with('-') {
        return Line::Directive {
            raw: trimmed.to_string(),
        };
    }
    match parse_specifier(trimmed) {
        Ok(mut requirement) => {
            requirement.line = number;
            Line::Spec(requirement)
        }
        Err(error) => Line::Invalid {
            raw: trimmed.to_string(),
            error,
        },
    }
}

fn parse_specifier(spec: &str) -> Result<Requirement, SpecifierError> {
    let (spec_part, marker) = match spec.find(';') {
        Some(pos) => (
            spec[..pos].trim_end(),
            Some(spec[pos + 1..].trim().to_string()),
        ),
        None => (spec, None),
    };

    let name_match = NAME_RE
        .find(spec_part)
        .ok_or_else(|| SpecifierError::InvalidName(spec.to_string()))?;
    let name = name_match.as_str().to_string();

    let mut rest = spec_part[name_match.end()..].trim_start();
    let mut extras = Vec::new();
    if rest.starts_with('[') {
        let close = rest
            .find(']')
            .ok_or_else(|| SpecifierError::UnterminatedExtras(spec.to_string()))?;
        extras = rest[1..close]
            .split(',')
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        rest = rest[close + 1..].trim_start();
    }
    if rest.starts_with('@') {
        return Err(SpecifierError::DirectReference(spec.to_string()));
    }

    // legacy parenthesized constraints: `pkg (>=1.0)`
    let constraints_text = rest
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();
    let constraints = ConstraintSet::parse(constraints_text)?;

    let mut requirement = Requirement::new(name, constraints);
    requirement.extras = extras;
    requirement.marker = marker;
    requirement.raw = spec.to_string();
    Ok(requirement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SpecKind;

    fn parse(content: &str) -> ParsedManifest {
        RequirementsParser.parse(content)
    }

    fn single_requirement(content: &str) -> Requirement {
        let parsed = parse(content);
        let mut reqs = parsed.requirements();
        let req = reqs.next().expect("expected one requirement").clone();
        assert!(reqs.next().is_none());
        req
    }

    #[test]
    fn test_parse_pinned_specifier() {
        let req = single_requirement("sphinx==5.3.0\n");
        assert_eq!(req.name, "sphinx");
        assert_eq!(req.kind(), SpecKind::Pinned);
        assert_eq!(req.line, 1);
    }

    #[test]
    fn test_parse_compatible_release() {
        let req = single_requirement("sphinx-rtd-theme~=1.0.4\n");
        assert_eq!(req.name, "sphinx-rtd-theme");
        assert_eq!(req.kind(), SpecKind::Compatible);
    }

    #[test]
    fn test_parse_multi_constraint() {
        let req = single_requirement("docutils>=0.14,<0.18\n");
        assert_eq!(req.constraints.len(), 2);
        assert_eq!(req.kind(), SpecKind::Range);
    }

    #[test]
    fn test_parse_unconstrained() {
        let req = single_requirement("mock\n");
        assert!(req.constraints.is_empty());
    }

    #[test]
    fn test_parse_extras() {
        let req = single_requirement("requests[socks,security]>=2.28\n");
        assert_eq!(req.extras, vec!["socks", "security"]);
    }

    #[test]
    fn test_parse_marker_kept_verbatim() {
        let req = single_requirement("tomli>=1.1.0; python_version < \"3.11\"\n");
        assert_eq!(req.marker.as_deref(), Some("python_version < \"3.11\""));
        assert_eq!(req.constraints.len(), 1);
    }

    #[test]
    fn test_parse_legacy_parenthesized() {
        let req = single_requirement("nose (>=1.3)\n");
        assert_eq!(req.name, "nose");
        assert_eq!(req.constraints.len(), 1);
    }

    #[test]
    fn test_blank_and_comment_lines() {
        let parsed = parse("# toolchain\n\nsphinx==5.3.0\n   # indented comment\n");
        let kinds: Vec<_> = parsed
            .records
            .iter()
            .map(|r| match &r.line {
                Line::Blank => "blank",
                Line::Comment => "comment",
                Line::Spec(_) => "spec",
                Line::Directive { .. } => "directive",
                Line::Invalid { .. } => "invalid",
            })
            .collect();
        assert_eq!(kinds, vec!["comment", "blank", "spec", "comment"]);
    }

    #[test]
    fn test_trailing_comment_stripped() {
        let req = single_requirement("sphinx==5.3.0  # keep in sync with CI\n");
        assert_eq!(req.raw, "sphinx==5.3.0");
    }

    #[test]
    fn test_hash_without_whitespace_is_not_comment() {
        let parsed = parse("sphinx==5.3.0#frag\n");
        // the '#' stays attached, so the version fails to parse
        assert!(matches!(parsed.records[0].line, Line::Invalid { .. }));
    }

    #[test]
    fn test_directive_lines() {
        let parsed = parse("-r common.txt\n--index-url https://example.invalid/simple\n");
        assert!(parsed
            .records
            .iter()
            .all(|r| matches!(r.line, Line::Directive { .. })));
    }

    #[test]
    fn test_continuation_lines() {
        let parsed = parse("docutils>=0.14,\\\n    <0.18\n");
        assert_eq!(parsed.records.len(), 1);
        let record = &parsed.records[0];
        assert!(record.continued);
        assert_eq!(record.number, 1);
        match &record.line {
            Line::Spec(req) => assert_eq!(req.constraints.len(), 2),
            other => panic!("expected spec, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_with_backslash_does_not_continue() {
        let parsed = parse("# see notes \\\nsphinx==5.3.0\n");
        assert_eq!(parsed.records.len(), 2);
        assert!(matches!(parsed.records[1].line, Line::Spec(_)));
    }

    #[test]
    fn test_invalid_specifier_reports_error() {
        let parsed = parse("sphinx=5.3.0\n");
        match &parsed.records[0].line {
            Line::Invalid { error, .. } => {
                assert!(matches!(error, SpecifierError::Constraint(_)));
            }
            other => panic!("expected invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_direct_reference_rejected() {
        let parsed = parse("pkg @ https://example.invalid/pkg.tar.gz\n");
        assert!(matches!(
            parsed.records[0].line,
            Line::Invalid {
                error: SpecifierError::DirectReference(_),
                ..
            }
        ));
    }

    #[test]
    fn test_unterminated_extras_rejected() {
        let parsed = parse("requests[socks>=2.28\n");
        assert!(matches!(
            parsed.records[0].line,
            Line::Invalid {
                error: SpecifierError::UnterminatedExtras(_),
                ..
            }
        ));
    }

    #[test]
    fn test_line_numbers() {
        let parsed = parse("# header\nsphinx==5.3.0\n\ndocutils<0.18\n");
        let lines: Vec<_> = parsed.requirements().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn test_requirement_set_collects_duplicates() {
        let parsed = parse("sphinx==5.3.0\nSphinx==5.2.0\n");
        let (set, duplicates) = parsed.requirement_set();
        assert_eq!(set.len(), 1);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].line, 2);
    }

    #[test]
    fn test_update_version_pinned() {
        let content = "sphinx==5.3.0\ndocutils<0.18\n";
        let updated = RequirementsParser
            .update_version(content, "sphinx", "6.1.0")
            .unwrap();
        assert_eq!(updated, "sphinx==6.1.0\ndocutils<0.18\n");
    }

    #[test]
    fn test_update_version_compatible_keeps_operator() {
        let content = "sphinx-rtd-theme~=1.0.4\n";
        let updated = RequirementsParser
            .update_version(content, "sphinx-rtd-theme", "1.2.0")
            .unwrap();
        assert_eq!(updated, "sphinx-rtd-theme~=1.2.0\n");
    }

    #[test]
    fn test_update_version_preserves_comment_and_indent() {
        let content = "  sphinx==5.3.0   # docs toolchain\n";
        let updated = RequirementsParser
            .update_version(content, "sphinx", "6.0.0")
            .unwrap();
        assert_eq!(updated, "  sphinx==6.0.0   # docs toolchain\n");
    }

    #[test]
    fn test_update_version_preserves_extras_and_marker() {
        let content = "requests[socks]==2.28.0; python_version >= \"3.8\"\n";
        let updated = RequirementsParser
            .update_version(content, "requests", "2.31.0")
            .unwrap();
        assert_eq!(
            updated,
            "requests[socks]==2.31.0; python_version >= \"3.8\"\n"
        );
    }

    #[test]
    fn test_update_version_normalized_lookup() {
        let content = "Sphinx_RTD-Theme~=1.0.4\n";
        let updated = RequirementsParser
            .update_version(content, "sphinx-rtd-theme", "1.1.0")
            .unwrap();
        assert_eq!(updated, "Sphinx_RTD-Theme~=1.1.0\n");
    }

    #[test]
    fn test_update_version_missing_package() {
        let err = RequirementsParser
            .update_version("sphinx==5.3.0\n", "docutils", "0.19")
            .unwrap_err();
        assert!(err.to_string().contains("not listed"));
    }

    #[test]
    fn test_update_version_rejects_range() {
        let err = RequirementsParser
            .update_version("docutils>=0.14,<0.18\n", "docutils", "0.19")
            .unwrap_err();
        assert!(err.to_string().contains("not a pin"));
    }

    #[test]
    fn test_update_version_no_trailing_newline() {
        let updated = RequirementsParser
            .update_version("sphinx==5.3.0", "sphinx", "6.0.0")
            .unwrap();
        assert_eq!(updated, "sphinx==6.0.0");
    }

    #[test]
    fn test_rewrite_specifier() {
        let req = single_requirement("requests[socks]~=2.28.0; python_version >= \"3.8\"\n");
        assert_eq!(
            rewrite_specifier(&req, "2.31.0"),
            "requests[socks]~=2.31.0; python_version >= \"3.8\""
        );
    }

    #[test]
    fn test_split_comment() {
        assert_eq!(split_comment("a  # b"), ("a  ", Some("# b")));
        assert_eq!(split_comment("# b"), ("", Some("# b")));
        assert_eq!(split_comment("a#b"), ("a#b", None));
        assert_eq!(split_comment("plain"), ("plain", None));
    }
}
