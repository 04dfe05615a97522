//! Incremental scan aggregates: totals, per-type, and per-directory.
//!
//! The [`Aggregator`] consumes the walker's record stream and maintains
//! three running totals without retaining the file list itself:
//!
//! - overall `(count, size)`
//! - per-[`FileType`] `(count, size)`
//! - cumulative size per top-level subdirectory of the scan root
//!
//! The top-level subdirectory of a record is the first path segment of
//! its path relative to the scan root, computed from the path itself (the
//! walker never yields directories). Files sitting directly under the
//! root accumulate under a `"Root"` sentinel entry.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::classify::FileType;
use crate::scanner::FileRecord;

/// Sentinel directory name for files directly under the scan root.
pub const ROOT_SENTINEL: &str = "Root";

/// Running `(count, size)` pair for one file type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    /// Number of files of this type
    pub count: u64,
    /// Cumulative size in bytes
    pub size: u64,
}

/// Cumulative size of one top-level child of the scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySize {
    /// Directory name (or the `"Root"` sentinel)
    pub name: String,
    /// Absolute path of the directory
    pub path: PathBuf,
    /// Cumulative size of all files beneath it, in bytes
    pub total_size: u64,
}

/// Pure aggregate snapshot of one completed scan.
///
/// Regenerated wholesale on every completed scan, never patched
/// incrementally after completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Total number of regular files visited
    pub total_files: u64,
    /// Total size of all visited files in bytes
    pub total_size: u64,
    /// Per-type `(count, size)` breakdown
    pub by_type: HashMap<FileType, TypeTotals>,
}

/// Streaming aggregate builder for one walk.
#[derive(Debug)]
pub struct Aggregator {
    root: PathBuf,
    total_files: u64,
    total_size: u64,
    by_type: HashMap<FileType, TypeTotals>,
    by_directory: HashMap<String, u64>,
}

impl Aggregator {
    /// Create an aggregator for a scan rooted at `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            total_files: 0,
            total_size: 0,
            by_type: HashMap::new(),
            by_directory: HashMap::new(),
        }
    }

    /// Fold one record into the running totals.
    pub fn record(&mut self, record: &FileRecord) {
        self.total_files += 1;
        self.total_size += record.size;

        let totals = self.by_type.entry(record.file_type).or_default();
        totals.count += 1;
        totals.size += record.size;

        let segment = self.top_level_segment(&record.path);
        *self.by_directory.entry(segment).or_default() += record.size;
    }

    /// First path segment of `path` relative to the scan root, or the
    /// root sentinel for direct children.
    fn top_level_segment(&self, path: &Path) -> String {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            // Records always come from under the root; anything else is
            // attributed to the root bucket rather than dropped.
            return ROOT_SENTINEL.to_string();
        };

        let mut components = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>();

        if components.len() >= 2 {
            components.remove(0)
        } else {
            ROOT_SENTINEL.to_string()
        }
    }

    /// Current file count.
    #[must_use]
    pub fn total_files(&self) -> u64 {
        self.total_files
    }

    /// Current cumulative size.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Finalize into a summary and directory sizes sorted descending by
    /// size (ties broken by name ascending for determinism).
    ///
    /// Truncating the directory list to a top-N for reporting is purely
    /// presentational and is left to the caller; it never affects the
    /// summary totals.
    #[must_use]
    pub fn finish(self) -> (ScanSummary, Vec<DirectorySize>) {
        let summary = ScanSummary {
            total_files: self.total_files,
            total_size: self.total_size,
            by_type: self.by_type,
        };

        let root = self.root;
        let mut directories: Vec<DirectorySize> = self
            .by_directory
            .into_iter()
            .map(|(name, total_size)| {
                let path = if name == ROOT_SENTINEL {
                    root.clone()
                } else {
                    root.join(&name)
                };
                DirectorySize {
                    name,
                    path,
                    total_size,
                }
            })
            .collect();

        directories.sort_by(|a, b| {
            b.total_size
                .cmp(&a.total_size)
                .then_with(|| a.name.cmp(&b.name))
        });

        (summary, directories)
    }
}
