//! Watch configuration and runtime updates.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ConfigParseError;

/// Directories excluded by default (relative to the watched root).
pub const DEFAULT_EXCLUDED_DIRECTORIES: &[&str] = &["/images"];

/// File extensions excluded by default.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "svg", "gif"];

/// Default polling interval in seconds.
pub const DEFAULT_INTERVAL: i64 = 5;

/// What to watch and what to ignore.
///
/// The root is fixed for the lifetime of the process. The exclusion sets and
/// the interval can be overwritten at runtime through [`ConfigUpdate`].
///
/// Serializes to the client-facing view, which omits the root:
///
/// ```json
/// {"excludedDirectories": ["/images"], "excludedExtensions": ["png"], "interval": 5}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchConfig {
    /// Watched directory.
    #[serde(skip)]
    pub root: PathBuf,
    /// Root-relative directory paths to prune, e.g. `/images`.
    pub excluded_directories: Vec<String>,
    /// File extensions to ignore, without the dot.
    pub excluded_extensions: Vec<String>,
    /// Client polling interval in seconds. Not validated; clients clamp it.
    pub interval: i64,
}

impl WatchConfig {
    /// Create a configuration for `root` with the default exclusions.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded_directories: to_owned_vec(DEFAULT_EXCLUDED_DIRECTORIES),
            excluded_extensions: to_owned_vec(DEFAULT_EXCLUDED_EXTENSIONS),
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Replace the excluded directories.
    #[must_use]
    pub fn with_excluded_directories(mut self, dirs: Vec<String>) -> Self {
        self.excluded_directories = dirs;
        self
    }

    /// Replace the excluded extensions.
    #[must_use]
    pub fn with_excluded_extensions(mut self, extensions: Vec<String>) -> Self {
        self.excluded_extensions = extensions;
        self
    }

    /// Replace the polling interval.
    #[must_use]
    pub fn with_interval(mut self, interval: i64) -> Self {
        self.interval = interval;
        self
    }

    /// Watched directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Apply a runtime update.
    ///
    /// Every key present in the update replaces the corresponding field
    /// wholesale. Values are not validated.
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(dirs) = update.excluded_directories {
            self.excluded_directories = dirs;
        }
        if let Some(extensions) = update.excluded_extensions {
            self.excluded_extensions = extensions;
        }
        if let Some(interval) = update.interval {
            self.interval = interval;
        }
    }
}

fn to_owned_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(|&v| v.to_owned()).collect()
}

/// Partial configuration pushed by a client.
///
/// Keys are decoded one by one: unknown keys and keys whose value has the
/// wrong shape are dropped without affecting the others.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigUpdate {
    /// New excluded directories.
    pub excluded_directories: Option<Vec<String>>,
    /// New excluded extensions.
    pub excluded_extensions: Option<Vec<String>>,
    /// New polling interval in seconds.
    pub interval: Option<i64>,
}

impl ConfigUpdate {
    /// Decode an update from a JSON request body.
    ///
    /// An empty (or whitespace-only) body decodes to an empty update.
    ///
    /// # Errors
    ///
    /// Fails only when the body is not JSON or not a JSON object.
    pub fn from_json(body: &[u8]) -> Result<Self, ConfigParseError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let object: Map<String, Value> = serde_json::from_slice(body)?;

        Ok(Self {
            excluded_directories: string_list(&object, "excludedDirectories"),
            excluded_extensions: string_list(&object, "excludedExtensions"),
            interval: typed(&object, "interval", Value::as_i64),
        })
    }

    /// True when the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.excluded_directories.is_none()
            && self.excluded_extensions.is_none()
            && self.interval.is_none()
    }
}

/// A list of strings under `key`, or `None` if absent or mistyped.
fn string_list(object: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    typed(object, key, |value| {
        value
            .as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect()
    })
}

fn typed<T>(
    object: &Map<String, Value>,
    key: &str,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = object.get(key)?;
    let converted = convert(value);
    if converted.is_none() {
        tracing::debug!(key, %value, "Ignoring configuration key with unexpected type");
    }
    converted
}
