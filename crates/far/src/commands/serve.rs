//! `far serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use far_config::{CliSettings, Config, ScanErrorMode};
use far_server::{run_server, server_config_from_far_config};

use super::resolve_root;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover far.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watched directory (overrides config).
    #[arg(short, long, env = "FAR_ROOT")]
    root: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Client polling interval in seconds (overrides config).
    #[arg(short, long)]
    interval: Option<i64>,

    /// Skip unreadable entries instead of failing the scan.
    #[arg(long)]
    skip_errors: bool,

    /// Do not register the endpoints (same as `debug = false`).
    #[arg(long)]
    no_debug: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            root: self.root,
            interval: self.interval,
            debug: self.no_debug.then_some(false),
            on_error: self.skip_errors.then_some(ScanErrorMode::Skip),
        };

        let mut config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        config.watch_resolved.root = resolve_root(&config.watch_resolved.root)?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Watched directory: {}",
            config.watch_resolved.root.display()
        ));
        output.info(&format!(
            "Excluded directories: {}",
            config.watch_resolved.excluded_directories.join(", ")
        ));
        output.info(&format!(
            "Excluded extensions: {}",
            config.watch_resolved.excluded_extensions.join(", ")
        ));
        output.info(&format!(
            "Poll interval: {}s",
            config.watch_resolved.interval
        ));

        if config.server.debug {
            output.success(&format!(
                "Include {}/script.js in your pages",
                config.server.base_path
            ));
            if config.server.access_token().is_some() {
                output.info("Access token: required");
            }
        } else {
            output.warning("Debug mode disabled: endpoints are not registered");
        }

        let server_config = server_config_from_far_config(&config, version.to_owned());
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
