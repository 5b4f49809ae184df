//! Check orchestrator coordinating the whole workflow
//!
//! This module provides:
//! - Workflow coordination: detect → parse → lint → fetch → judge → write
//! - Registry queries behind a concurrency-limiting semaphore
//! - Dry-run mode support
//! - Error handling with partial continuation

use crate::cli::{CliArgs, Mode};
use crate::domain::{FileReport, RunSummary, UpdateResult};
use crate::lint;
use crate::manifest::{detect_manifests, parse_manifest, ManifestWriter, WriteResult};
use crate::progress::Progress;
use crate::registry::{HttpClient, PyPiAdapter};
use crate::update::{UpdateFilter, UpdateJudge, VersionInfo};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Concurrency limit for registry requests
const REGISTRY_CONCURRENCY: usize = 8;

/// Orchestrator for coordinating the check workflow
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
    /// HTTP client for registry requests
    client: HttpClient,
    /// Semaphore limiting concurrent registry requests
    semaphore: Arc<Semaphore>,
}

/// Result of running the orchestrator
pub struct OrchestratorResult {
    /// Summary with findings and update decisions per file
    pub summary: RunSummary,
    /// Write results for each rewritten manifest
    pub write_results: Vec<WriteResult>,
    /// Errors encountered during processing
    pub errors: Vec<OrchestratorError>,
    /// Whether a registry check ran (outdated/update modes)
    pub checked_registry: bool,
}

/// Errors that can occur during orchestration
#[derive(Debug)]
pub enum OrchestratorError {
    /// Failed to create HTTP client
    HttpClientError(String),
    /// Failed to read or parse a manifest
    ManifestReadError { path: String, message: String },
    /// Failed to fetch versions from the registry
    RegistryError { package: String, message: String },
    /// Failed to write a manifest
    WriteError { path: String, message: String },
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorError::HttpClientError(msg) => write!(f, "HTTP client error: {}", msg),
            OrchestratorError::ManifestReadError { path, message } => {
                write!(f, "Failed to read {}: {}", path, message)
            }
            OrchestratorError::RegistryError { package, message } => {
                write!(f, "Failed to fetch {}: {}", package, message)
            }
            OrchestratorError::WriteError { path, message } => {
                write!(f, "Failed to write {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl Orchestrator {
    /// Creates a new orchestrator with the given CLI arguments
    pub fn new(args: CliArgs) -> Result<Self, OrchestratorError> {
        let client =
            HttpClient::new().map_err(|e| OrchestratorError::HttpClientError(e.to_string()))?;

        Ok(Self {
            args,
            client,
            semaphore: Arc::new(Semaphore::new(REGISTRY_CONCURRENCY)),
        })
    }

    /// Creates an orchestrator with a custom HTTP client (for testing)
    pub fn with_client(args: CliArgs, client: HttpClient) -> Self {
        Self {
            args,
            client,
            semaphore: Arc::new(Semaphore::new(REGISTRY_CONCURRENCY)),
        }
    }

    /// Runs the check workflow
    pub async fn run(&self) -> OrchestratorResult {
        self.run_with_progress(!self.args.quiet).await
    }

    /// Runs the check workflow with optional progress display
    pub async fn run_with_progress(&self, show_progress: bool) -> OrchestratorResult {
        let mode = self.args.mode();
        let dry_run = self.args.dry_run;
        let mut progress = Progress::new(show_progress);
        let mut summary = RunSummary::new(dry_run);
        let mut errors = Vec::new();

        // Step 1: discover manifests
        progress.spinner("Detecting requirements manifests...");
        let manifests = detect_manifests(&self.args.path);
        progress.finish_and_clear();

        if manifests.is_empty() {
            return OrchestratorResult {
                summary,
                write_results: Vec::new(),
                errors,
                checked_registry: mode != Mode::Lint,
            };
        }

        // Step 2: parse and lint each manifest
        progress.spinner("Parsing manifests...");
        let mut parsed_manifests = Vec::new();
        for info in &manifests {
            match parse_manifest(&info.path) {
                Ok(parsed) => parsed_manifests.push((info, parsed)),
                Err(e) => {
                    errors.push(OrchestratorError::ManifestReadError {
                        path: info.path.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        progress.finish_and_clear();

        let judge = UpdateJudge::new(self.build_filter());
        let adapter = PyPiAdapter::new(self.client.clone());

        let total_requirements: usize = parsed_manifests
            .iter()
            .map(|(_, parsed)| parsed.requirements().count())
            .sum();
        if mode != Mode::Lint {
            progress.start(total_requirements as u64, "Checking requirements");
        }

        for (info, parsed) in parsed_manifests {
            let mut report = FileReport::new(&info.path);

            for finding in lint::lint(&parsed) {
                report.add_finding(finding);
            }

            // Step 3: registry check (duplicates are judged once)
            if mode != Mode::Lint {
                let (set, _) = parsed.requirement_set();
                for requirement in set.iter() {
                    progress.set_message(&format!("Checking {}", requirement.name));

                    if let Some(reason) = judge.should_skip(requirement) {
                        report.add_result(UpdateResult::skip(requirement.clone(), reason));
                        progress.inc();
                        continue;
                    }

                    let versions = match self.fetch_versions(&adapter, &requirement.name).await {
                        Ok(v) => v,
                        Err(message) => {
                            errors.push(OrchestratorError::RegistryError {
                                package: requirement.name.clone(),
                                message: message.clone(),
                            });
                            report.add_result(UpdateResult::skip_fetch_failed(
                                requirement.clone(),
                                message,
                            ));
                            progress.inc();
                            continue;
                        }
                    };

                    report.add_result(judge.judge(requirement, &versions));
                    progress.inc();
                }
            }

            summary.add_file(report);
        }
        progress.finish_and_clear();

        // Step 4: apply rewrites (update mode only; writer honors dry-run)
        let mut write_results = Vec::new();
        if mode == Mode::Update {
            if !dry_run {
                progress.spinner("Writing updates...");
            }
            let writer = ManifestWriter::new(dry_run);
            write_results = writer.apply_all_updates(&summary.files);
            progress.finish_and_clear();

            for result in &write_results {
                for error in &result.errors {
                    errors.push(OrchestratorError::WriteError {
                        path: result.path.display().to_string(),
                        message: error.clone(),
                    });
                }
            }
        }

        OrchestratorResult {
            summary,
            write_results,
            errors,
            checked_registry: mode != Mode::Lint,
        }
    }

    /// Builds an UpdateFilter from CLI arguments
    fn build_filter(&self) -> UpdateFilter {
        let mut filter = UpdateFilter::new();

        if !self.args.exclude.is_empty() {
            filter = filter.with_exclude(self.args.exclude.clone());
        }
        if !self.args.only.is_empty() {
            filter = filter.with_only(self.args.only.clone());
        }
        if let Some(age) = self.args.age {
            filter = filter.with_min_age(age);
        }

        filter
    }

    /// Fetches versions from the registry with concurrency control
    async fn fetch_versions(
        &self,
        adapter: &PyPiAdapter,
        package: &str,
    ) -> Result<Vec<VersionInfo>, String> {
        let _permit = self.semaphore.acquire().await.unwrap();
        adapter
            .fetch_versions(package)
            .await
            .map_err(|e| e.to_string())
    }
}
