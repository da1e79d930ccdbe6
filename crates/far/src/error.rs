//! CLI error types.

use far_config::ConfigError;
use far_scan::ScanError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Scan(#[from] ScanError),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(String),
}
