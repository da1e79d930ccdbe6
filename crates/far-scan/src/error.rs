//! Scan and configuration error types.

use std::path::PathBuf;
use std::time::Duration;

/// Error raised when the watched tree cannot be scanned.
///
/// A failed scan never yields a partial timestamp.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The watched root does not exist.
    #[error("Watched directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The watched root exists but is not a directory.
    #[error("Watched path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),

    /// Listing a directory or reading entry metadata failed.
    #[error("I/O error{}: {source}", path_suffix(.path.as_ref()))]
    Io {
        /// Entry that failed, when known.
        path: Option<PathBuf>,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The walk did not finish before its deadline.
    #[error("Scan exceeded its deadline after {}ms", .0.as_millis())]
    DeadlineExceeded(Duration),
}

fn path_suffix(path: Option<&PathBuf>) -> String {
    path.map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

/// Error raised when a configuration update payload cannot be decoded.
///
/// Callers are expected to ignore the payload and keep the previous
/// configuration.
#[derive(Debug, thiserror::Error)]
#[error("Invalid configuration payload: {0}")]
pub struct ConfigParseError(#[from] serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_with_path() {
        let err = ScanError::Io {
            path: Some(PathBuf::from("/app/templates/locked")),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        let msg = err.to_string();
        assert!(msg.contains("/app/templates/locked"), "got: {msg}");
    }

    #[test]
    fn test_io_error_display_without_path() {
        let err = ScanError::Io {
            path: None,
            source: std::io::Error::other("boom"),
        };

        assert_eq!(err.to_string(), "I/O error: boom");
    }

    #[test]
    fn test_deadline_display() {
        let err = ScanError::DeadlineExceeded(Duration::from_millis(250));
        assert!(err.to_string().contains("250ms"));
    }
}
