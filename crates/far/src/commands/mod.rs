//! CLI command implementations.

pub(crate) mod scan;
pub(crate) mod serve;

pub(crate) use scan::ScanArgs;
pub(crate) use serve::ServeArgs;

use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Resolve the watched root to an existing, canonical directory.
///
/// The root is fixed for the lifetime of the process, so it is checked once
/// up front.
pub(crate) fn resolve_root(root: &Path) -> Result<PathBuf, CliError> {
    let canonical = root.canonicalize().map_err(|e| {
        CliError::Validation(format!(
            "Watched directory {} is not accessible: {e}",
            root.display()
        ))
    })?;
    if !canonical.is_dir() {
        return Err(CliError::Validation(format!(
            "Watched path {} is not a directory",
            root.display()
        )));
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("templates");
        std::fs::create_dir(&nested).unwrap();

        let resolved = resolve_root(&nested.join("..").join("templates")).unwrap();

        assert_eq!(resolved, nested.canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_root_missing() {
        let dir = tempfile::tempdir().unwrap();

        let err = resolve_root(&dir.path().join("missing")).unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("not accessible"));
    }

    #[test]
    fn test_resolve_root_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        let err = resolve_root(&file).unwrap_err();

        assert!(err.to_string().contains("not a directory"));
    }
}
