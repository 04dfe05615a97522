//! Rough upper-bound estimation of entries a walk will visit.
//!
//! The estimate is produced from a single shallow listing of the root's
//! immediate children: each subdirectory is weighted as a fixed constant,
//! each file as one. The result is clamped to a floor so progress
//! fractions never divide by zero and shallow trees never appear to
//! complete instantly.
//!
//! This is explicitly an approximation, never a correctness dependency.
//! The actual traversal may exceed or fall short of it; consumers clamp
//! displayed progress to [0, 0.99] until the walk truly finishes.

use std::path::Path;

/// Assumed entry count per immediate subdirectory of the root.
pub const DIR_WEIGHT: u64 = 100;

/// Minimum estimate regardless of how shallow the root looks.
pub const ESTIMATE_FLOOR: u64 = 1000;

/// Estimate the number of entries a walk of `root` will visit.
///
/// Performs one `read_dir` of the root only. Listing failures (including
/// an unreadable root) fall back to the floor; the walker reports root
/// errors properly, so this stays silent.
#[must_use]
pub fn estimate_entries(root: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(root) else {
        return ESTIMATE_FLOOR;
    };

    let mut estimate = 0u64;
    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        estimate += if is_dir { DIR_WEIGHT } else { 1 };
    }

    estimate.max(ESTIMATE_FLOOR)
}
