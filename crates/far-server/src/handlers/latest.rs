//! Latest modification endpoint.
//!
//! Returns the newest modification time under the watched root as a bare
//! JSON number, e.g. `1700000000`.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use far_scan::Scanner;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET {base}/latest.
///
/// The walk runs on the blocking pool against a configuration snapshot taken
/// at request start.
pub(crate) async fn get_latest(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let start = Instant::now();
    let config = state.watch_snapshot();
    let options = state.scan_options_for_request();

    let task = tokio::task::spawn_blocking(move || {
        Scanner::new(&config).with_options(options).scan()
    });

    let report = match state.scan_timeout {
        Some(timeout) => tokio::time::timeout(timeout, task)
            .await
            .map_err(|_| ServerError::Timeout(timeout))???,
        None => task.await??,
    };

    tracing::debug!(
        latest = report.latest,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Served latest modification time"
    );

    Ok(Json(report.latest))
}
