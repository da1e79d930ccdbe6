//! Configuration management for FrontendAutoReload.
//!
//! Parses `far.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `server.access_token`
//! - `watch.root`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use far_scan::{DEFAULT_INTERVAL, ErrorPolicy, ScanOptions, WatchConfig};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override watched directory.
    pub root: Option<PathBuf>,
    /// Override polling interval.
    pub interval: Option<i64>,
    /// Override the development flag gating the endpoints.
    pub debug: Option<bool>,
    /// Override error handling during scans.
    pub on_error: Option<ScanErrorMode>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "far.toml";

/// Default watched directory, relative to the config file.
const DEFAULT_ROOT: &str = "templates";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Watch configuration (root is a relative string from TOML).
    watch: WatchConfigRaw,
    /// Scan behavior.
    pub scan: ScanConfig,

    /// Resolved watch configuration (set after loading).
    #[serde(skip)]
    pub watch_resolved: WatchSettings,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Development flag. Endpoints are only registered when set.
    pub debug: bool,
    /// Bearer token required on every request, if set.
    pub access_token: Option<String>,
    /// URL prefix of the endpoints.
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7980,
            debug: true,
            access_token: None,
            base_path: "/frontendautoreload".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Access token, treating an empty string as unset.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Raw watch configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WatchConfigRaw {
    root: Option<String>,
    excluded_directories: Option<Vec<String>>,
    excluded_extensions: Option<Vec<String>>,
    interval: Option<i64>,
}

/// Resolved watch configuration with an absolute root.
#[derive(Debug)]
pub struct WatchSettings {
    /// Watched directory.
    pub root: PathBuf,
    /// Root-relative directories to prune.
    pub excluded_directories: Vec<String>,
    /// File extensions to ignore.
    pub excluded_extensions: Vec<String>,
    /// Client polling interval in seconds.
    pub interval: i64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        let defaults = WatchConfig::new(DEFAULT_ROOT);
        Self {
            root: defaults.root,
            excluded_directories: defaults.excluded_directories,
            excluded_extensions: defaults.excluded_extensions,
            interval: defaults.interval,
        }
    }
}

/// How scans react to unreadable entries below the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanErrorMode {
    /// Fail the scan.
    #[default]
    Abort,
    /// Skip the entry and keep walking.
    Skip,
}

impl From<ScanErrorMode> for ErrorPolicy {
    fn from(mode: ScanErrorMode) -> Self {
        match mode {
            ScanErrorMode::Abort => Self::Abort,
            ScanErrorMode::Skip => Self::Skip,
        }
    }
}

/// Scan configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Error handling below the root.
    pub on_error: ScanErrorMode,
    /// Follow symbolic links.
    pub follow_links: bool,
    /// Upper bound for a single scan in milliseconds (0 disables it).
    pub timeout_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            on_error: ScanErrorMode::Abort,
            follow_links: false,
            timeout_ms: 5000,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.access_token`").
        field: String,
        /// Error message (e.g., "${`FAR_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `far.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Initial watch configuration for the server.
    #[must_use]
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig::new(self.watch_resolved.root.clone())
            .with_excluded_directories(self.watch_resolved.excluded_directories.clone())
            .with_excluded_extensions(self.watch_resolved.excluded_extensions.clone())
            .with_interval(self.watch_resolved.interval)
    }

    /// Scan options without a deadline (set per scan from [`Self::scan_timeout`]).
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            on_error: self.scan.on_error.into(),
            follow_links: self.scan.follow_links,
            deadline: None,
        }
    }

    /// Upper bound for a single scan, if any.
    #[must_use]
    pub fn scan_timeout(&self) -> Option<Duration> {
        (self.scan.timeout_ms > 0).then(|| Duration::from_millis(self.scan.timeout_ms))
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(root) = &settings.root {
            self.watch_resolved.root.clone_from(root);
        }
        if let Some(interval) = settings.interval {
            self.watch_resolved.interval = interval;
        }
        if let Some(debug) = settings.debug {
            self.server.debug = debug;
        }
        if let Some(on_error) = settings.on_error {
            self.scan.on_error = on_error;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            watch: WatchConfigRaw::default(),
            scan: ScanConfig::default(),
            watch_resolved: WatchSettings {
                root: base.join(DEFAULT_ROOT),
                ..WatchSettings::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file. Runtime updates pushed
    /// by clients are not validated.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_watch()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        let base_path = &self.server.base_path;
        if !base_path.starts_with('/') || base_path.len() < 2 || base_path.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "server.base_path must start with '/' and not end with '/', got '{base_path}'"
            )));
        }

        Ok(())
    }

    /// Validate watch configuration.
    fn validate_watch(&self) -> Result<(), ConfigError> {
        if self.watch_resolved.interval <= 0 {
            return Err(ConfigError::Validation(
                "watch.interval must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref token) = self.server.access_token {
            self.server.access_token = Some(expand::expand_env(token, "server.access_token")?);
        }

        if let Some(ref root) = self.watch.root {
            self.watch.root = Some(expand::expand_env(root, "watch.root")?);
        }

        Ok(())
    }

    /// Resolve the watched root against the config directory and fill defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = WatchSettings::default();
        self.watch_resolved = WatchSettings {
            root: config_dir.join(self.watch.root.as_deref().unwrap_or(DEFAULT_ROOT)),
            excluded_directories: self
                .watch
                .excluded_directories
                .clone()
                .unwrap_or(defaults.excluded_directories),
            excluded_extensions: self
                .watch
                .excluded_extensions
                .clone()
                .unwrap_or(defaults.excluded_extensions),
            interval: self.watch.interval.unwrap_or(DEFAULT_INTERVAL),
        };
    }
}
