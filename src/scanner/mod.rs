//! Scanner module for directory traversal and content fingerprinting.
//!
//! This module provides:
//! - Cooperative, cancellable directory walking ([`walker`])
//! - Pre-walk entry estimation for progress reporting ([`estimate`])
//! - SHA-256 prefix fingerprints ([`fingerprint`])
//!
//! # Example
//!
//! ```no_run
//! use diskscout::scanner::{Walker, WalkOptions};
//! use std::path::Path;
//!
//! let options = WalkOptions {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/home/user"), options);
//! for record in walker.walk().unwrap() {
//!     println!("{}: {} bytes", record.path.display(), record.size);
//! }
//! ```

pub mod estimate;
pub mod fingerprint;
pub mod walker;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

// Re-export main types
pub use estimate::{estimate_entries, ESTIMATE_FLOOR};
pub use fingerprint::{
    fingerprint_file, fingerprint_to_hex, Fingerprint, FingerprintError, FINGERPRINT_PREFIX_LEN,
};
pub use walker::Walker;

use crate::classify::FileType;

/// Immutable snapshot of a regular file taken at visit time.
///
/// Records are produced only during an active walk and are never
/// re-validated against the live filesystem until an external action
/// (trash, open) is requested by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileRecord {
    /// File name (final path component)
    pub name: String,
    /// Absolute path to the file
    pub path: PathBuf,
    /// Exact size in bytes at scan time
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Semantic category derived from the extension
    pub file_type: FileType,
}

impl FileRecord {
    /// Create a record from a path, size, and modification time.
    ///
    /// The name and file type are derived from the path.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_type = FileType::from_path(&path);
        Self {
            name,
            path,
            size,
            modified,
            file_type,
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Skip hidden entries (names starting with `.`).
    pub skip_hidden: bool,

    /// Do not descend into package bundles (`.app`, `.framework`, ...).
    pub skip_package_interiors: bool,

    /// Maximum depth in path segments relative to the root. `None` means
    /// unbounded. When a branch exceeds the bound the walker stops
    /// descending there without failing the walk.
    pub max_depth: Option<u32>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            skip_hidden: true,
            skip_package_interiors: true,
            max_depth: None,
        }
    }
}

/// Errors that abort a walk before it produces any records.
///
/// Per-entry failures during the walk (permission denied, entries that
/// vanish mid-scan) are skipped silently and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The root path does not exist.
    #[error("Path not found: {0}")]
    RootNotFound(PathBuf),

    /// The root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root directory could not be opened.
    #[error("Cannot open {path}: {source}")]
    RootUnreadable {
        /// Root path that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Validate that `root` exists, is a directory, and can be listed.
    pub(crate) fn check_root(root: &Path) -> Result<(), ScanError> {
        let metadata = match std::fs::symlink_metadata(root) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScanError::RootNotFound(root.to_path_buf()));
            }
            Err(e) => {
                return Err(ScanError::RootUnreadable {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
        };
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        std::fs::read_dir(root)
            .map(|_| ())
            .map_err(|e| ScanError::RootUnreadable {
                path: root.to_path_buf(),
                source: e,
            })
    }
}
