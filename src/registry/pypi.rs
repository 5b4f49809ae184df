//! PyPI JSON API adapter
//!
//! Fetches package version information from PyPI.
//! API endpoint: https://pypi.org/pypi/{package}/json

use crate::error::RegistryError;
use crate::registry::HttpClient;
use crate::update::VersionInfo;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// PyPI API base URL
const PYPI_API_URL: &str = "https://pypi.org/pypi";

/// Registry display name
pub const REGISTRY_NAME: &str = "PyPI";

/// PyPI adapter
pub struct PyPiAdapter {
    client: HttpClient,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPiResponse {
    /// Release information keyed by version
    releases: HashMap<String, Vec<ReleaseFile>>,
}

/// Release file information
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    /// Upload time for the release file
    upload_time_iso_8601: Option<String>,
    /// Whether this file was yanked from the index
    #[serde(default)]
    yanked: bool,
}

impl PyPiAdapter {
    /// Creates a new PyPI adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Builds the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/json", PYPI_API_URL, package)
    }

    /// Fetches the known versions of a package, sorted ascending
    ///
    /// Versions whose files are all yanked, that carry no upload time, or
    /// that do not parse under the version grammar are skipped.
    pub async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError> {
        let url = self.build_url(package);
        let response: PyPiResponse = self
            .client
            .get_json(&url, package, REGISTRY_NAME)
            .await?;

        let mut versions = Vec::new();

        for (version, release_files) in response.releases {
            let mut earliest: Option<DateTime<Utc>> = None;

            for file in release_files {
                if file.yanked {
                    continue;
                }
                if let Some(time_str) = &file.upload_time_iso_8601 {
                    if let Ok(time) = time_str.parse::<DateTime<Utc>>() {
                        earliest = Some(match earliest {
                            Some(current) if time < current => time,
                            Some(current) => current,
                            None => time,
                        });
                    }
                }
            }

            if let Some(released_at) = earliest {
                if let Some(info) = VersionInfo::new(&version, released_at) {
                    versions.push(info);
                }
            }
        }

        versions.sort();
        Ok(versions)
    }
}
