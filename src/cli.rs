//! CLI argument parsing module for reqcheck

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Parse duration string in format: Nd (days), Nw (weeks), Nm (months)
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, unit) = if let Some(n) = s.strip_suffix('d') {
        (n, 'd')
    } else if let Some(n) = s.strip_suffix('w') {
        (n, 'w')
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 'm')
    } else {
        return Err(format!("invalid duration format: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;

    let seconds = match unit {
        'd' => num * 24 * 60 * 60,      // days
        'w' => num * 7 * 24 * 60 * 60,  // weeks
        'm' => num * 30 * 24 * 60 * 60, // months (30 days)
        _ => unreachable!(),
    };

    Ok(Duration::from_secs(seconds))
}

/// What a run does beyond offline validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Offline validation only
    Lint,
    /// Validation plus a registry check, report only
    Outdated,
    /// Validation, registry check and rewriting of pins
    Update,
}

/// Requirements manifest linter and update checker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "reqcheck",
    version,
    about = "Requirements manifest linter and update checker"
)]
pub struct CliArgs {
    /// Requirements file or directory to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // General options
    /// Dry run mode - with --update, show what would change without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Mode selection
    /// Query PyPI and report pins that are behind the latest release
    #[arg(long)]
    pub outdated: bool,

    /// Rewrite pinned and compatible-release versions to the latest release
    #[arg(long, conflicts_with = "outdated")]
    pub update: bool,

    // Package filters
    /// Exclude specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Check only specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub only: Vec<String>,

    // Age filter
    /// Only accept versions released at least this long ago (e.g., 2w, 10d, 1m)
    #[arg(long, value_parser = parse_duration)]
    pub age: Option<Duration>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show pending rewrites in diff format
    #[arg(long)]
    pub diff: bool,
}

impl CliArgs {
    /// The mode this invocation runs in
    pub fn mode(&self) -> Mode {
        if self.update {
            Mode::Update
        } else if self.outdated {
            Mode::Outdated
        } else {
            Mode::Lint
        }
    }

    /// Returns true when the run needs registry access
    pub fn needs_registry(&self) -> bool {
        self.mode() != Mode::Lint
    }
}
