//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use far_scan::{ConfigUpdate, ScanOptions, WatchConfig};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Current watch configuration snapshot (atomically swappable).
    watch: RwLock<Arc<WatchConfig>>,
    /// Options applied to every scan.
    pub(crate) scan_options: ScanOptions,
    /// Upper bound for a single scan.
    pub(crate) scan_timeout: Option<Duration>,
    /// URL prefix of all endpoints.
    pub(crate) base_path: String,
    /// Bearer token required on every request, if set.
    pub(crate) access_token: Option<String>,
}

impl AppState {
    pub(crate) fn new(
        watch: WatchConfig,
        scan_options: ScanOptions,
        scan_timeout: Option<Duration>,
        base_path: String,
        access_token: Option<String>,
    ) -> Self {
        Self {
            watch: RwLock::new(Arc::new(watch)),
            scan_options,
            scan_timeout,
            base_path,
            access_token,
        }
    }

    /// Get the current configuration snapshot.
    ///
    /// The returned `Arc` stays valid (and unchanged) for the whole request
    /// even if an update lands concurrently.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub(crate) fn watch_snapshot(&self) -> Arc<WatchConfig> {
        Arc::clone(&self.watch.read().unwrap())
    }

    /// Apply an update and publish the new snapshot.
    ///
    /// Holds the write lock across read-modify-write so concurrent updates
    /// never lose each other's keys.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub(crate) fn apply_update(&self, update: ConfigUpdate) -> Arc<WatchConfig> {
        let mut guard = self.watch.write().unwrap();
        let mut next = WatchConfig::clone(&guard);
        next.apply(update);
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        next
    }

    /// URL of an endpoint below the base path.
    pub(crate) fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.base_path)
    }

    /// Scan options with the deadline set from `scan_timeout`.
    pub(crate) fn scan_options_for_request(&self) -> ScanOptions {
        match self.scan_timeout {
            Some(timeout) => self.scan_options.with_timeout(timeout),
            None => self.scan_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state() -> AppState {
        AppState::new(
            WatchConfig::new("/app/templates"),
            ScanOptions::default(),
            Some(Duration::from_secs(1)),
            "/frontendautoreload".to_owned(),
            None,
        )
    }

    #[test]
    fn test_snapshot_survives_update() {
        let state = state();
        let before = state.watch_snapshot();

        state.apply_update(ConfigUpdate {
            interval: Some(30),
            ..ConfigUpdate::default()
        });

        assert_eq!(before.interval, 5);
        assert_eq!(state.watch_snapshot().interval, 30);
    }

    #[test]
    fn test_sequential_updates_accumulate_keys() {
        let state = state();

        state.apply_update(ConfigUpdate {
            excluded_extensions: Some(vec!["css".to_owned()]),
            ..ConfigUpdate::default()
        });
        let current = state.apply_update(ConfigUpdate {
            interval: Some(1),
            ..ConfigUpdate::default()
        });

        assert_eq!(current.excluded_extensions, vec!["css".to_owned()]);
        assert_eq!(current.interval, 1);
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(state().endpoint("latest"), "/frontendautoreload/latest");
    }

    #[test]
    fn test_scan_options_deadline() {
        assert!(state().scan_options_for_request().deadline.is_some());

        let mut unbounded = state();
        unbounded.scan_timeout = None;
        assert!(unbounded.scan_options_for_request().deadline.is_none());
    }
}
