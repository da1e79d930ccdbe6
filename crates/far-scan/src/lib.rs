//! Latest-modification scanner for FrontendAutoReload.
//!
//! Walks a watched directory tree and reduces the modification times of all
//! non-excluded files to a single Unix timestamp. A browser script polls this
//! value and reloads the page when it advances.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`WatchConfig`] with the watched root and exclusion sets
//! - [`ConfigUpdate`] for wholesale overwrites pushed at runtime
//! - [`ExclusionFilter`] deciding which entries are skipped or pruned
//! - [`Scanner`] performing the depth-first walk
//!
//! # Example
//!
//! ```ignore
//! use far_scan::{WatchConfig, scan_latest};
//!
//! let config = WatchConfig::new("site/templates");
//! let latest = scan_latest(&config)?;
//! println!("latest change at {latest}");
//! ```

mod config;
mod error;
mod filter;
mod scanner;

pub use config::{
    ConfigUpdate, DEFAULT_EXCLUDED_DIRECTORIES, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_INTERVAL,
    WatchConfig,
};
pub use error::{ConfigParseError, ScanError};
pub use filter::{EntryKind, ExclusionFilter, file_extension, relative_path};
pub use scanner::{ErrorPolicy, ScanOptions, ScanReport, Scanner, scan_latest};
