//! `far scan` command implementation.

use std::path::PathBuf;

use chrono::DateTime;
use clap::Args;
use far_config::{CliSettings, Config, ScanErrorMode};
use far_scan::{ScanReport, Scanner};

use super::resolve_root;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the scan command.
#[derive(Args)]
pub(crate) struct ScanArgs {
    /// Path to configuration file (default: auto-discover far.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watched directory (overrides config).
    #[arg(short, long, env = "FAR_ROOT")]
    root: Option<PathBuf>,

    /// Print only the timestamp, JSON-encoded as served by the endpoint.
    #[arg(long)]
    json: bool,

    /// Skip unreadable entries instead of failing the scan.
    #[arg(long)]
    skip_errors: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ScanArgs {
    /// Execute the scan command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the scan fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            root: self.root,
            on_error: self.skip_errors.then_some(ScanErrorMode::Skip),
            ..CliSettings::default()
        };

        let mut config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        config.watch_resolved.root = resolve_root(&config.watch_resolved.root)?;

        let mut options = config.scan_options();
        if let Some(timeout) = config.scan_timeout() {
            options = options.with_timeout(timeout);
        }

        let report = Scanner::new(&config.watch_config())
            .with_options(options)
            .scan()?;

        if self.json {
            output.result(&report.latest.to_string());
        } else {
            for line in summary(&report) {
                output.result(&line);
            }
            if report.errors_skipped > 0 {
                output.warning(&format!(
                    "{} unreadable entries skipped",
                    report.errors_skipped
                ));
            }
        }

        Ok(())
    }
}

/// Human-readable report lines.
fn summary(report: &ScanReport) -> Vec<String> {
    let when = i64::try_from(report.latest)
        .ok()
        .filter(|&secs| secs > 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(|| "never".to_owned(), |dt| dt.to_rfc3339());

    let mut lines = vec![format!("Latest modification: {} ({when})", report.latest)];
    if let Some(path) = &report.latest_path {
        lines.push(format!("Newest file: {}", path.display()));
    }
    lines.push(format!(
        "Files considered: {}, excluded by extension: {}, directories pruned: {}",
        report.files_considered, report.files_excluded, report.dirs_pruned
    ));
    lines.push(format!(
        "Elapsed: {:.1}ms",
        report.elapsed.as_secs_f64() * 1000.0
    ));
    lines
}
