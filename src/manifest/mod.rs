//! Manifest file detection, parsing and rewriting
//!
//! This module provides functionality to:
//! - Discover requirements manifests in a directory tree
//! - Parse manifest content into classified lines
//! - Rewrite version pins while preserving file layout

mod detector;
mod requirements_txt;
mod writer;

pub use detector::{detect_manifests, is_requirements_filename, ManifestInfo};
pub use requirements_txt::{
    rewrite_specifier, Line, LineRecord, ParsedManifest, RequirementsParser, SpecifierError,
};
pub use writer::{ManifestWriter, WriteResult};

use crate::error::ManifestError;
use std::path::Path;

/// Reads and parses a manifest file
pub fn parse_manifest(path: &Path) -> Result<ParsedManifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ManifestError::not_found(path)
        } else {
            ManifestError::read_error(path, e)
        }
    })?;
    Ok(RequirementsParser.parse(&content))
}
