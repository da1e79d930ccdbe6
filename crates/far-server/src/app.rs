//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tower::ServiceBuilder;

use crate::handlers;
use crate::middleware::{access, security};
use crate::state::AppState;

/// Create the application router.
///
/// Routes are only registered when `debug` is set; otherwise every request
/// falls through to 404.
pub(crate) fn create_router(state: Arc<AppState>, debug: bool) -> Router {
    let mut router = Router::new();

    if debug {
        router = router
            .route(&state.endpoint("latest"), get(handlers::latest::get_latest))
            .route(
                &state.endpoint("config"),
                get(handlers::config::get_config).post(handlers::config::post_config),
            )
            .route(&state.endpoint("script.js"), get(handlers::script::get_script));

        if state.access_token.is_some() {
            router = router.route_layer(from_fn_with_state(
                Arc::clone(&state),
                access::require_token,
            ));
        }
    } else {
        tracing::warn!("Debug mode disabled, auto-reload endpoints are not registered");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(security::content_type_options_layer())
                .layer(security::no_store_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::Path;
    use std::time::{Duration, UNIX_EPOCH};

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use far_scan::{ScanOptions, WatchConfig};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn touch(root: &Path, rel: &str, mtime: u64) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(&path)
            .unwrap()
            .set_modified(UNIX_EPOCH + Duration::from_secs(mtime))
            .unwrap();
    }

    fn state_for(root: &Path, token: Option<&str>) -> Arc<AppState> {
        Arc::new(AppState::new(
            WatchConfig::new(root),
            ScanOptions::default(),
            Some(Duration::from_secs(10)),
            "/frontendautoreload".to_owned(),
            token.map(str::to_owned),
        ))
    }

    fn router(root: &Path) -> Router {
        create_router(state_for(root, None), true)
    }

    async fn send(router: Router, request: Request<Body>) -> Response {
        router.oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_latest_returns_bare_number() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt", 100);
        touch(dir.path(), "images/b.png", 200);

        let response = send(router(dir.path()), get("/frontendautoreload/latest")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(body_json(response).await, serde_json::json!(100));
    }

    #[tokio::test]
    async fn test_latest_empty_tree_is_zero() {
        let dir = tempfile::tempdir().unwrap();

        let response = send(router(dir.path()), get("/frontendautoreload/latest")).await;

        assert_eq!(body_json(response).await, serde_json::json!(0));
    }

    #[tokio::test]
    async fn test_latest_missing_root_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let response = send(router(&missing), get("/frontendautoreload/latest")).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_config_update_changes_next_scan() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt", 100);
        touch(dir.path(), "c.jpg", 300);
        let router = router(dir.path());

        let before = send(router.clone(), get("/frontendautoreload/latest")).await;
        assert_eq!(body_json(before).await, serde_json::json!(100));

        let update = send(
            router.clone(),
            post("/frontendautoreload/config", r#"{"excludedExtensions": ["png"]}"#),
        )
        .await;
        assert_eq!(update.status(), StatusCode::OK);
        let config = body_json(update).await;
        assert_eq!(config["excludedExtensions"], serde_json::json!(["png"]));
        assert_eq!(config["excludedDirectories"], serde_json::json!(["/images"]));

        let after = send(router, get("/frontendautoreload/latest")).await;
        assert_eq!(body_json(after).await, serde_json::json!(300));
    }

    #[tokio::test]
    async fn test_config_interval_only_update() {
        let dir = tempfile::tempdir().unwrap();
        let router = router(dir.path());

        let response = send(
            router.clone(),
            post("/frontendautoreload/config", r#"{"interval": 10}"#),
        )
        .await;
        let config = body_json(response).await;

        assert_eq!(config["interval"], 10);
        assert_eq!(config["excludedDirectories"], serde_json::json!(["/images"]));
        assert_eq!(
            config["excludedExtensions"],
            serde_json::json!(["jpeg", "jpg", "png", "svg", "gif"])
        );

        let current = send(router, get("/frontendautoreload/config")).await;
        assert_eq!(body_json(current).await["interval"], 10);
    }

    #[tokio::test]
    async fn test_malformed_config_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let router = router(dir.path());

        let response = send(
            router.clone(),
            post("/frontendautoreload/config", "{\"interval\": 10"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["interval"], 5);
    }

    #[tokio::test]
    async fn test_config_negative_interval_applied_with_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let router = router(dir.path());

        let response = send(
            router,
            post(
                "/frontendautoreload/config",
                r#"{"excludedExtensions": ["css"], "interval": -1}"#,
            ),
        )
        .await;
        let config = body_json(response).await;

        assert_eq!(config["excludedExtensions"], serde_json::json!(["css"]));
        assert_eq!(config["interval"], -1);
    }

    #[tokio::test]
    async fn test_script_uses_current_interval() {
        let dir = tempfile::tempdir().unwrap();
        let router = router(dir.path());
        send(
            router.clone(),
            post("/frontendautoreload/config", r#"{"interval": 3}"#),
        )
        .await;

        let response = send(router, get("/frontendautoreload/script.js")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let script = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(script.contains("\"/frontendautoreload/latest\""));
        assert!(script.contains("const interval = 3000;"));
    }

    #[tokio::test]
    async fn test_debug_disabled_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let router = create_router(state_for(dir.path(), None), false);

        let response = send(router, get("/frontendautoreload/latest")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_token_required_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.txt", 42);
        let router = create_router(state_for(dir.path(), Some("s3cret")), true);

        let denied = send(router.clone(), get("/frontendautoreload/latest")).await;
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(denied.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());

        let wrong = Request::builder()
            .uri("/frontendautoreload/latest")
            .header(header::AUTHORIZATION, "Bearer nope")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(router.clone(), wrong).await.status(), StatusCode::FORBIDDEN);

        let bearer = Request::builder()
            .uri("/frontendautoreload/latest")
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let allowed = send(router.clone(), bearer).await;
        assert_eq!(allowed.status(), StatusCode::OK);
        assert_eq!(body_json(allowed).await, serde_json::json!(42));

        let query = send(router, get("/frontendautoreload/script.js?token=s3cret")).await;
        assert_eq!(query.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let response = send(router(dir.path()), get("/frontendautoreload/other")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
