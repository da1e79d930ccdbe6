//! HTTP polling endpoint for FrontendAutoReload.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - `GET  {base}/latest` - latest modification time as a bare JSON number
//! - `GET  {base}/config` - current watch configuration
//! - `POST {base}/config` - wholesale overwrite of exclusions and interval
//! - `GET  {base}/script.js` - polling script to include in pages
//!
//! Endpoints exist only when `debug` is set, and require a bearer token when
//! one is configured.
//!
//! # Quick Start
//!
//! ```ignore
//! use far_scan::{ScanOptions, WatchConfig};
//! use far_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         watch: WatchConfig::new("site/templates"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser timer ──HTTP──► axum server (far-server)
//!                              │
//!                              ├─► GET latest ──► spawn_blocking ──► Scanner (far-scan)
//!                              │                       ▲
//!                              │                       │ snapshot
//!                              └─► POST config ──► RwLock<Arc<WatchConfig>>
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use far_scan::{ScanOptions, WatchConfig};
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// URL prefix of the endpoints (leading `/`, no trailing `/`).
    pub base_path: String,
    /// Development flag. Endpoints are only registered when set.
    pub debug: bool,
    /// Bearer token required on every request, if set.
    pub access_token: Option<String>,
    /// Initial watch configuration.
    pub watch: WatchConfig,
    /// Options applied to every scan.
    pub scan: ScanOptions,
    /// Upper bound for a single scan (`None` disables it).
    pub scan_timeout: Option<Duration>,
    /// Application version.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7980,
            base_path: "/frontendautoreload".to_owned(),
            debug: true,
            access_token: None,
            watch: WatchConfig::new("templates"),
            scan: ScanOptions::default(),
            scan_timeout: Some(Duration::from_secs(5)),
            version: String::new(),
        }
    }
}

/// Build the router without binding a socket.
///
/// Lets a host application merge the endpoints into its own axum app.
#[must_use]
pub fn router(config: ServerConfig) -> axum::Router {
    let debug = config.debug;
    let state = Arc::new(AppState::new(
        config.watch,
        config.scan,
        config.scan_timeout,
        config.base_path,
        config.access_token,
    ));
    app::create_router(state, debug)
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;

    tracing::info!(
        root = %config.watch.root.display(),
        base_path = %config.base_path,
        version = %config.version,
        "Watching for changes"
    );

    let app = router(config);

    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from FAR config.
///
/// # Arguments
///
/// * `config` - FAR configuration
/// * `version` - Application version
#[must_use]
pub fn server_config_from_far_config(config: &far_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        base_path: config.server.base_path.clone(),
        debug: config.server.debug,
        access_token: config.server.access_token().map(str::to_owned),
        watch: config.watch_config(),
        scan: config.scan_options(),
        scan_timeout: config.scan_timeout(),
        version,
    }
}
