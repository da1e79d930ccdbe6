//! Exclusion predicate.
//!
//! Directories are matched by their root-relative path (`/images`), files by
//! their extension. Matching is exact: a subdirectory of an excluded directory
//! is only skipped because the walk never descends into its parent.

use std::path::{Component, Path, PathBuf};

use crate::config::WatchConfig;

/// Kind of a filesystem entry met during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory (pruned as a whole when excluded).
    Directory,
    /// Regular file (contributes a timestamp unless excluded).
    File,
}

/// Decides which entries the scanner skips.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    root: PathBuf,
    excluded_directories: Vec<String>,
    excluded_extensions: Vec<String>,
}

impl ExclusionFilter {
    /// Build a filter from a configuration snapshot.
    #[must_use]
    pub fn new(config: &WatchConfig) -> Self {
        Self {
            root: config.root.clone(),
            excluded_directories: config.excluded_directories.clone(),
            excluded_extensions: config.excluded_extensions.clone(),
        }
    }

    /// Watched root this filter resolves relative paths against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True if the entry should be skipped (and, for directories, pruned).
    #[must_use]
    pub fn rejects(&self, path: &Path, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Directory => self.is_excluded_dir(path),
            EntryKind::File => self.is_excluded_file(path),
        }
    }

    /// True if the directory's root-relative path is listed verbatim.
    ///
    /// The root itself is never excluded.
    #[must_use]
    pub fn is_excluded_dir(&self, path: &Path) -> bool {
        let Some(relative) = relative_path(&self.root, path) else {
            return false;
        };
        if relative.is_empty() {
            return false;
        }
        self.excluded_directories.iter().any(|d| *d == relative)
    }

    /// True if the file's extension is listed, ignoring ASCII case.
    #[must_use]
    pub fn is_excluded_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        let Some(ext) = file_extension(&name) else {
            return false;
        };
        self.excluded_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Compute `path` relative to `root` as a `/`-separated string with a leading
/// separator and no trailing one.
///
/// Returns `""` for the root itself and `None` when `path` is not inside
/// `root`.
///
/// ```
/// use std::path::Path;
/// use far_scan::relative_path;
///
/// let rel = relative_path(Path::new("/app/templates"), Path::new("/app/templates/images"));
/// assert_eq!(rel.as_deref(), Some("/images"));
/// ```
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut out = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                out.push('/');
                out.push_str(&segment.to_string_lossy());
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}

/// Extension of a file name: everything after the last `.`.
///
/// `photo.JPG` gives `JPG`, `.htaccess` gives `htaccess`, `Makefile` and
/// `archive.` give nothing.
#[must_use]
pub fn file_extension(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}
