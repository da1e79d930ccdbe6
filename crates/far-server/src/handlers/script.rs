//! Client polling script.
//!
//! Serves the snippet a page includes to reload itself when the latest
//! modification time advances.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use serde_json::json;

use crate::state::AppState;

/// Script template with `__FAR_*__` placeholders.
const TEMPLATE: &str = include_str!("../assets/reload.js");

/// Handle GET {base}/script.js.
///
/// Uses the interval in effect at request time.
pub(crate) async fn get_script(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let interval = state.watch_snapshot().interval;
    let script = render_script(
        &state.endpoint("latest"),
        interval,
        state.access_token.as_deref(),
    );

    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        script,
    )
}

/// Fill the template. Values are embedded as JSON literals.
///
/// The browser polls at least once per second even if the configured
/// interval is 0 or negative.
fn render_script(endpoint: &str, interval_secs: i64, token: Option<&str>) -> String {
    let interval_ms = interval_secs.max(1).saturating_mul(1000);
    let headers = match token {
        Some(token) => json!({"Authorization": format!("Bearer {token}")}),
        None => json!({}),
    };

    TEMPLATE
        .replace("__FAR_ENDPOINT__", &json!(endpoint).to_string())
        .replace("__FAR_INTERVAL_MS__", &interval_ms.to_string())
        .replace("__FAR_HEADERS__", &headers.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_script_fills_placeholders() {
        let script = render_script("/frontendautoreload/latest", 5, None);

        assert!(script.contains(r#"const endpoint = "/frontendautoreload/latest";"#));
        assert!(script.contains("const interval = 5000;"));
        assert!(script.contains("const headers = {};"));
        assert!(!script.contains("__FAR_"));
    }

    #[test]
    fn test_render_script_with_token() {
        let script = render_script("/r/latest", 2, Some("abc"));

        assert!(script.contains(r#"{"Authorization":"Bearer abc"}"#));
        assert!(script.contains("const interval = 2000;"));
    }

    #[test]
    fn test_render_script_escapes_endpoint() {
        let script = render_script("/a\"b/latest", 5, None);
        assert!(script.contains(r#""/a\"b/latest""#));
    }

    #[test]
    fn test_render_script_zero_interval() {
        let script = render_script("/r/latest", 0, None);
        assert!(script.contains("const interval = 1000;"));
    }

    #[test]
    fn test_render_script_negative_interval() {
        let script = render_script("/r/latest", -1, None);
        assert!(script.contains("const interval = 1000;"));
    }
}
