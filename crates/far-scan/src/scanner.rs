//! Tree scanner.
//!
//! Walks the watched root depth-first (parents before children), prunes
//! excluded directories, skips excluded files and keeps the largest
//! modification time seen. Only regular files contribute, including symlinks
//! to regular files; directories never do. Linked directories are entered
//! only with [`ScanOptions::follow_links`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use ignore::{DirEntry, WalkBuilder};

use crate::config::WatchConfig;
use crate::error::ScanError;
use crate::filter::{EntryKind, ExclusionFilter};

/// What to do with an I/O error below the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the whole scan, returning no timestamp.
    #[default]
    Abort,
    /// Log the error and continue without the offending entry.
    Skip,
}

/// Knobs for a single scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Handling of per-entry I/O errors. Root errors are always fatal.
    pub on_error: ErrorPolicy,
    /// Follow symbolic links.
    pub follow_links: bool,
    /// Abort with [`ScanError::DeadlineExceeded`] once this instant passes.
    pub deadline: Option<Instant>,
}

impl ScanOptions {
    /// Set the deadline to `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }
}

/// Outcome of a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Latest modification time in Unix seconds, 0 if no file qualified.
    pub latest: u64,
    /// File that carries `latest` (the first one found on ties).
    pub latest_path: Option<PathBuf>,
    /// Files whose timestamp was compared.
    pub files_considered: usize,
    /// Files skipped because of their extension.
    pub files_excluded: usize,
    /// Directories whose subtree was pruned.
    pub dirs_pruned: usize,
    /// Entries dropped under [`ErrorPolicy::Skip`].
    pub errors_skipped: usize,
    /// Wall time spent walking.
    pub elapsed: Duration,
}

/// Computes the latest modification time under a watched root.
pub struct Scanner {
    filter: ExclusionFilter,
    options: ScanOptions,
}

impl Scanner {
    /// Create a scanner over a configuration snapshot.
    #[must_use]
    pub fn new(config: &WatchConfig) -> Self {
        Self {
            filter: ExclusionFilter::new(config),
            options: ScanOptions::default(),
        }
    }

    /// Replace the scan options.
    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Walk the tree and report the latest modification time.
    ///
    /// # Errors
    ///
    /// Fails if the root is missing, not a directory or unreadable, if the
    /// deadline passes, or on any I/O error below the root under
    /// [`ErrorPolicy::Abort`].
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let root = self.filter.root();
        check_root(root)?;

        let pruned = Arc::new(AtomicUsize::new(0));
        let walker = self.walker(Arc::clone(&pruned));

        let mut report = ScanReport::default();

        for result in walker {
            if let Some(deadline) = self.options.deadline
                && Instant::now() >= deadline
            {
                return Err(ScanError::DeadlineExceeded(start.elapsed()));
            }

            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    self.handle_error(walk_error(err), &mut report)?;
                    continue;
                }
            };

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            // Unfollowed links still count when they point at a regular file.
            let link_target = if file_type.is_symlink() {
                match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_file() => Some(meta),
                    _ => continue,
                }
            } else if file_type.is_file() {
                None
            } else {
                continue;
            };

            if self.filter.rejects(entry.path(), EntryKind::File) {
                report.files_excluded += 1;
                continue;
            }

            let meta = match link_target {
                Some(meta) => meta,
                None => match entry.metadata() {
                    Ok(meta) => meta,
                    Err(err) => {
                        self.handle_error(walk_error(err), &mut report)?;
                        continue;
                    }
                },
            };
            let mtime = match meta.modified() {
                Ok(mtime) => unix_seconds(mtime),
                Err(source) => {
                    let err = ScanError::Io {
                        path: Some(entry.path().to_path_buf()),
                        source,
                    };
                    self.handle_error(err, &mut report)?;
                    continue;
                }
            };

            report.files_considered += 1;
            if mtime > report.latest || report.latest_path.is_none() {
                report.latest = report.latest.max(mtime);
                report.latest_path = Some(entry.into_path());
            }
        }

        report.dirs_pruned = pruned.load(Ordering::Relaxed);
        report.elapsed = start.elapsed();

        tracing::debug!(
            root = %root.display(),
            latest = report.latest,
            files_considered = report.files_considered,
            files_excluded = report.files_excluded,
            dirs_pruned = report.dirs_pruned,
            elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
            "Scan completed"
        );

        Ok(report)
    }

    /// Build the depth-first walker with directory pruning.
    ///
    /// Standard filters (hidden files, ignore files) are disabled: every entry
    /// under the root is a candidate.
    fn walker(&self, pruned: Arc<AtomicUsize>) -> ignore::Walk {
        let filter = self.filter.clone();
        WalkBuilder::new(self.filter.root())
            .standard_filters(false)
            .follow_links(self.options.follow_links)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry: &DirEntry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                if is_dir && filter.rejects(entry.path(), EntryKind::Directory) {
                    tracing::trace!(path = %entry.path().display(), "Pruned excluded directory");
                    pruned.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                true
            })
            .build()
    }

    /// Apply the error policy: propagate under `Abort`, count and log under `Skip`.
    fn handle_error(&self, err: ScanError, report: &mut ScanReport) -> Result<(), ScanError> {
        match self.options.on_error {
            ErrorPolicy::Abort => Err(err),
            ErrorPolicy::Skip => {
                tracing::warn!(error = %err, "Skipping unreadable entry");
                report.errors_skipped += 1;
                Ok(())
            }
        }
    }
}

/// Scan `config.root` with default options and return the latest timestamp.
///
/// # Errors
///
/// See [`Scanner::scan`].
pub fn scan_latest(config: &WatchConfig) -> Result<u64, ScanError> {
    Scanner::new(config).scan().map(|report| report.latest)
}

/// Verify the root exists, is a directory and can be listed.
fn check_root(root: &Path) -> Result<(), ScanError> {
    let meta = fs::metadata(root).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ScanError::RootNotFound(root.to_path_buf())
        } else {
            ScanError::Io {
                path: Some(root.to_path_buf()),
                source,
            }
        }
    })?;
    if !meta.is_dir() {
        return Err(ScanError::RootNotDirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|source| ScanError::Io {
        path: Some(root.to_path_buf()),
        source,
    })?;
    Ok(())
}

/// Convert a walker error, keeping the offending path when one is attached.
fn walk_error(err: ignore::Error) -> ScanError {
    let path = error_path(&err).map(Path::to_path_buf);
    let source = match innermost(err) {
        ignore::Error::Io(io) => io,
        other => std::io::Error::other(other.to_string()),
    };
    ScanError::Io { path, source }
}

/// Strip the path, depth and line wrappers.
fn innermost(err: ignore::Error) -> ignore::Error {
    match err {
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => innermost(*err),
        other => other,
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        _ => None,
    }
}

/// Whole seconds since the Unix epoch; times before it clamp to 0.
fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
