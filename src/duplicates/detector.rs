//! Two-phase duplicate detection over a finalized listing.
//!
//! # Overview
//!
//! The detector runs on a previously produced listing (typically the
//! retained listing of a completed scan), never on the live tree:
//!
//! 1. **Size grouping**: group records by exact size; singleton groups
//!    cannot contain duplicates and are discarded.
//! 2. **Fingerprinting**: compute the SHA-256 prefix fingerprint of each
//!    surviving candidate and group by `(size, fingerprint)`.
//! 3. **Reporting**: groups of 2+ members become [`DuplicateGroup`]s with
//!    members ordered by name ascending; groups are sorted descending by
//!    reclaimable space, ties broken by the first member's name.
//!
//! Progress is reported as `processed / total candidates` across the
//! fingerprint step, which dominates cost. Fingerprints cover only the
//! first 64 KiB of each file: two files with identical size and identical
//! prefix but diverging content beyond it are still reported as
//! duplicates. This is a deliberate accuracy/performance trade-off, not
//! a bug.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::progress::ProgressCallback;
use crate::scanner::{fingerprint_file, FileRecord, Fingerprint};

use super::DuplicateGroup;

/// Configuration for a duplicate-detection pass.
#[derive(Clone, Default)]
pub struct DetectorConfig {
    /// Optional cancellation flag checked between fingerprints.
    pub cancel_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("cancel_flag", &self.cancel_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl DetectorConfig {
    /// Set the cancellation flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from a duplicate-detection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorStats {
    /// Records in the input listing
    pub input_files: usize,
    /// Records that survived size grouping (fingerprint candidates)
    pub candidate_files: usize,
    /// Candidates successfully fingerprinted
    pub fingerprinted: usize,
    /// Candidates excluded because fingerprinting failed
    pub failed: usize,
    /// Reported duplicate groups
    pub duplicate_groups: usize,
    /// Total space reclaimable across all groups
    pub reclaimable_space: u64,
    /// Whether the pass was interrupted by cancellation
    pub interrupted: bool,
}

/// Find duplicate groups in a finalized listing.
///
/// # Arguments
///
/// * `listing` - Records from a completed scan
/// * `config` - Cancellation and progress hooks
///
/// # Returns
///
/// A tuple of:
/// - `Vec<DuplicateGroup>` - groups of 2+ byte-prefix-identical files,
///   sorted descending by reclaimable space
/// - [`DetectorStats`] - counts and totals for the pass
///
/// Files that cannot be opened for fingerprinting (removed since the
/// scan, permission revoked) are excluded from their group silently; the
/// pass itself never fails. On cancellation the partial result is
/// discarded and `stats.interrupted` is set.
#[must_use]
pub fn find_duplicates(
    listing: &[FileRecord],
    config: &DetectorConfig,
) -> (Vec<DuplicateGroup>, DetectorStats) {
    let mut stats = DetectorStats {
        input_files: listing.len(),
        ..Default::default()
    };

    // Phase 1: group by exact size, discard singletons
    let mut by_size: HashMap<u64, Vec<&FileRecord>> = HashMap::new();
    for record in listing {
        by_size.entry(record.size).or_default().push(record);
    }
    by_size.retain(|_, members| members.len() > 1);

    let total_candidates: usize = by_size.values().map(Vec::len).sum();
    stats.candidate_files = total_candidates;

    if total_candidates == 0 {
        log::debug!("No same-size candidates in listing of {}", listing.len());
        return (Vec::new(), stats);
    }

    log::info!(
        "Fingerprinting {} candidates across {} size groups",
        total_candidates,
        by_size.len()
    );

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("fingerprint", total_candidates);
    }

    // Phase 2: fingerprint candidates, group by (size, fingerprint).
    // Sequential on purpose: the cancellation flag must be honored
    // between every fingerprint.
    let mut by_fingerprint: HashMap<(u64, Fingerprint), Vec<FileRecord>> = HashMap::new();
    let mut processed = 0usize;

    'outer: for (size, members) in by_size {
        for record in members {
            if config.is_cancelled() {
                log::info!("Duplicate detection cancelled after {processed} fingerprints");
                stats.interrupted = true;
                break 'outer;
            }

            processed += 1;
            if let Some(ref callback) = config.progress_callback {
                callback.on_progress(processed, record.path.to_string_lossy().as_ref());
            }

            match fingerprint_file(&record.path) {
                Ok(fp) => {
                    stats.fingerprinted += 1;
                    by_fingerprint
                        .entry((size, fp))
                        .or_default()
                        .push(record.clone());
                }
                Err(e) => {
                    // Vanished or unreadable since the scan: drop silently
                    stats.failed += 1;
                    log::debug!("Excluding {}: {e}", record.path.display());
                }
            }
        }
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("fingerprint");
    }

    if stats.interrupted {
        return (Vec::new(), stats);
    }

    // Phase 3: report groups of 2+, deterministically ordered
    let mut groups: Vec<DuplicateGroup> = by_fingerprint
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|((size, fp), members)| DuplicateGroup::new(fp, size, members))
        .collect();

    groups.sort_by(|a, b| {
        b.reclaimable_space()
            .cmp(&a.reclaimable_space())
            .then_with(|| a.first_name().cmp(b.first_name()))
    });

    stats.duplicate_groups = groups.len();
    stats.reclaimable_space = groups.iter().map(DuplicateGroup::reclaimable_space).sum();

    log::info!(
        "Found {} duplicate groups, {} bytes reclaimable",
        stats.duplicate_groups,
        stats.reclaimable_space
    );

    (groups, stats)
}
