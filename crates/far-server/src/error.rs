//! Error types for the HTTP server.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use far_scan::ScanError;
use serde_json::json;

/// Server error type.
///
/// Every variant means "no timestamp this time". Clients treat the
/// response as unchanged and poll again.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The scan itself failed.
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    /// The scan did not finish in time.
    #[error("Scan timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The blocking scan task panicked or was cancelled.
    #[error("Scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Failed to compute latest modification time");

        let body = json!({"error": self.to_string()});
        (StatusCode::SERVICE_UNAVAILABLE, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_scan_error_is_service_unavailable() {
        let err = ServerError::from(ScanError::RootNotFound(PathBuf::from("/gone")));

        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_timeout_display() {
        let err = ServerError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Scan timed out after 1500ms");
    }
}
