//! Configuration endpoints.
//!
//! Exposes the current watch configuration and accepts wholesale overwrites
//! of its exclusion sets and interval.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use far_scan::{ConfigUpdate, WatchConfig};

use crate::state::AppState;

/// Handle GET {base}/config.
pub(crate) async fn get_config(State(state): State<Arc<AppState>>) -> Json<WatchConfig> {
    Json(WatchConfig::clone(&state.watch_snapshot()))
}

/// Handle POST {base}/config.
///
/// Present keys replace the current values; absent keys are left alone.
/// A payload that fails to decode changes nothing and is not reported to the
/// client. The response is always the configuration now in effect.
pub(crate) async fn post_config(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<WatchConfig> {
    let current = match ConfigUpdate::from_json(&body) {
        Ok(update) if update.is_empty() => state.watch_snapshot(),
        Ok(update) => {
            let current = state.apply_update(update);
            tracing::info!(
                excluded_directories = ?current.excluded_directories,
                excluded_extensions = ?current.excluded_extensions,
                interval = current.interval,
                "Watch configuration updated"
            );
            current
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring configuration payload");
            state.watch_snapshot()
        }
    };

    Json(WatchConfig::clone(&current))
}
