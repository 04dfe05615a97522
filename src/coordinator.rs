//! Scan orchestration: state machine, cancellation, and result ownership.
//!
//! # Overview
//!
//! A [`ScanCoordinator`] runs one directory walk at a time on a background
//! thread and owns every scan-produced field (state, summary, retained
//! listing, directory sizes). Observers read point-in-time snapshots via
//! accessors or subscribe to the single state channel.
//!
//! # State machine
//!
//! ```text
//! Idle --start--> Scanning(progress, files_found)
//! Scanning --complete--> Complete
//! Scanning --root error--> Error(message)
//! Scanning --cancel / new start--> Idle (partial state discarded)
//! ```
//!
//! # Ordering guarantees
//!
//! State transitions are totally ordered per coordinator: every publish
//! happens with the state lock held and is guarded by a scan-generation
//! check, so a `Complete` or `Error` is never followed by a stale
//! `Scanning` update from an abandoned walk. Cancellation is cooperative:
//! the flag is polled between visited entries and checked immediately
//! before every publish.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::aggregate::{Aggregator, DirectorySize, ScanSummary};
use crate::scanner::{estimate_entries, FileRecord, WalkOptions, Walker};

/// Entries visited between progress republications.
pub const PROGRESS_BATCH: u64 = 100;

/// Displayed progress ceiling until the walk truly finishes.
pub const PROGRESS_CEILING: f64 = 0.99;

/// Default minimum retained size for large-file scans (100 MiB).
pub const DEFAULT_MIN_RETAINED_SIZE: u64 = 100 * 1024 * 1024;

/// Externally observable scan state.
///
/// Cancellation is observed as a return to `Idle`; there is no separate
/// terminal variant for it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    /// No scan has run, or the last one was cancelled.
    Idle,
    /// A walk is in flight.
    Scanning {
        /// Estimated completion fraction, clamped to [0, 0.99]
        progress: f64,
        /// Regular files visited so far
        files_found: u64,
    },
    /// The last scan finished; results are valid.
    Complete,
    /// The last scan failed opening its root. Terminal until a new start.
    Error(String),
}

/// Per-scan configuration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Walker behavior
    pub walk: WalkOptions,
    /// Minimum size (bytes) for a file to be retained in the listing.
    /// Sub-minimum files still count toward the summary totals.
    pub min_retained_size: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::large_files()
    }
}

impl ScanOptions {
    /// Large-file mode: 100 MiB retention threshold, hidden files skipped.
    #[must_use]
    pub fn large_files() -> Self {
        Self {
            walk: WalkOptions::default(),
            min_retained_size: DEFAULT_MIN_RETAINED_SIZE,
        }
    }

    /// Storage-overview mode: everything retained, hidden files included.
    #[must_use]
    pub fn storage_overview() -> Self {
        Self {
            walk: WalkOptions {
                skip_hidden: false,
                ..Default::default()
            },
            min_retained_size: 0,
        }
    }

    /// Override the retention threshold.
    #[must_use]
    pub fn with_min_retained_size(mut self, bytes: u64) -> Self {
        self.min_retained_size = bytes;
        self
    }

    /// Override the walker options.
    #[must_use]
    pub fn with_walk_options(mut self, walk: WalkOptions) -> Self {
        self.walk = walk;
        self
    }
}

/// Scan-owned fields, mutated only by the active scan task (or by
/// `cancel_scan`, under the state lock) and read by observers.
struct Shared {
    state: Mutex<ScanState>,
    summary: Mutex<ScanSummary>,
    listing: Mutex<Vec<FileRecord>>,
    directory_sizes: Mutex<Vec<DirectorySize>>,
    /// Identity of the current scan; bumped on every start and cancel so
    /// abandoned walks can never publish stale updates.
    generation: AtomicU64,
    events_tx: Sender<ScanState>,
}

impl Shared {
    /// Publish a state transition for scan `generation`.
    ///
    /// The state lock is held across the generation check, the state
    /// write, and the channel send; that single critical section is what
    /// makes transitions totally ordered. Returns false (and does
    /// nothing) if the generation is stale.
    fn publish(&self, generation: u64, next: ScanState) -> bool {
        let mut state = self.state.lock().unwrap();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *state = next.clone();
        let _ = self.events_tx.send(next);
        true
    }

    /// Clear scan-owned results on behalf of scan `generation`.
    ///
    /// Guarded like `publish`: the state lock is held across the
    /// generation check and the clears, so a superseded starter can
    /// never wipe results a newer scan has already installed.
    fn clear_results(&self, generation: u64) {
        let _state = self.state.lock().unwrap();
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        *self.summary.lock().unwrap() = ScanSummary::default();
        self.listing.lock().unwrap().clear();
        self.directory_sizes.lock().unwrap().clear();
    }
}

/// Coordinates directory scans: at most one active walk at a time.
///
/// Cloning yields another handle to the same coordinator.
///
/// # Example
///
/// ```no_run
/// use diskscout::coordinator::{ScanCoordinator, ScanOptions, ScanState};
/// use std::path::Path;
///
/// let coordinator = ScanCoordinator::new();
/// let events = coordinator.subscribe();
/// coordinator.start_scan(Path::new("/data"), ScanOptions::large_files());
///
/// for state in events {
///     match state {
///         ScanState::Complete => break,
///         ScanState::Error(msg) => { eprintln!("scan failed: {msg}"); break; }
///         _ => {}
///     }
/// }
/// println!("{} large files", coordinator.listing().len());
/// ```
#[derive(Clone)]
pub struct ScanCoordinator {
    shared: Arc<Shared>,
    /// Cancellation flag of the current scan generation.
    cancel: Arc<Mutex<Arc<AtomicBool>>>,
    events_rx: Receiver<ScanState>,
}

impl Default for ScanCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanCoordinator {
    /// Create an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ScanState::Idle),
                summary: Mutex::new(ScanSummary::default()),
                listing: Mutex::new(Vec::new()),
                directory_sizes: Mutex::new(Vec::new()),
                generation: AtomicU64::new(0),
                events_tx,
            }),
            cancel: Arc::new(Mutex::new(Arc::new(AtomicBool::new(false)))),
            events_rx,
        }
    }

    /// Subscribe to state transitions.
    ///
    /// All receivers share one totally-ordered stream; no update is ever
    /// observed out of order.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<ScanState> {
        self.events_rx.clone()
    }

    /// Start a scan, implicitly cancelling and discarding any in-flight
    /// one. Fire-and-forget: observe completion via [`subscribe`].
    ///
    /// [`subscribe`]: ScanCoordinator::subscribe
    pub fn start_scan(&self, root: &Path, options: ScanOptions) {
        let fresh_flag = Arc::new(AtomicBool::new(false));
        let generation = {
            // Retire the previous scan: trip its flag, bump the
            // generation, and install the new flag, all before the new
            // walk can publish anything.
            let mut current = self.cancel.lock().unwrap();
            current.store(true, Ordering::SeqCst);
            *current = Arc::clone(&fresh_flag);
            self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        self.shared.clear_results(generation);
        self.shared.publish(
            generation,
            ScanState::Scanning {
                progress: 0.0,
                files_found: 0,
            },
        );

        log::info!("Starting scan of {}", root.display());

        let shared = Arc::clone(&self.shared);
        let root = root.to_path_buf();
        thread::spawn(move || run_scan(&shared, generation, &fresh_flag, &root, &options));
    }

    /// Cancel the in-flight scan, if any. Idempotent; safe when idle.
    ///
    /// The transition to `Idle` is performed here, synchronously, so an
    /// observer always sees `Idle` without waiting for the walk thread
    /// to notice the flag. The abandoned walk can never publish again
    /// because its generation is retired.
    pub fn cancel_scan(&self) {
        let generation = {
            let current = self.cancel.lock().unwrap();
            current.store(true, Ordering::SeqCst);
            self.shared.generation.load(Ordering::SeqCst)
        };

        let scanning = matches!(
            *self.shared.state.lock().unwrap(),
            ScanState::Scanning { .. }
        );
        if !scanning {
            return;
        }

        log::info!("Cancelling scan generation {generation}");
        // Retire the walk's generation, then publish Idle under the new one
        let next = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.clear_results(next);
        self.shared.publish(next, ScanState::Idle);
    }

    /// Point-in-time state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.shared.state.lock().unwrap().clone()
    }

    /// Summary of the last completed scan (default/empty before one).
    #[must_use]
    pub fn summary(&self) -> ScanSummary {
        self.shared.summary.lock().unwrap().clone()
    }

    /// Retained listing of the last completed scan, sorted by size
    /// descending.
    #[must_use]
    pub fn listing(&self) -> Vec<FileRecord> {
        self.shared.listing.lock().unwrap().clone()
    }

    /// Per-top-level-directory sizes of the last completed scan, sorted
    /// by size descending.
    #[must_use]
    pub fn directory_sizes(&self) -> Vec<DirectorySize> {
        self.shared.directory_sizes.lock().unwrap().clone()
    }

    /// Drop one entry from the retained listing after a collaborator has
    /// confirmed an external delete. Returns whether an entry matched.
    ///
    /// The engine never deletes files itself; this only reconciles the
    /// in-memory result set. The summary is a snapshot of scan time and
    /// is deliberately left untouched.
    pub fn remove_from_listing(&self, path: &Path) -> bool {
        let mut listing = self.shared.listing.lock().unwrap();
        let before = listing.len();
        listing.retain(|record| record.path != path);
        before != listing.len()
    }
}

/// Walk `root` on behalf of scan `generation`, publishing progress and
/// finalizing results. Runs on a background thread.
fn run_scan(
    shared: &Shared,
    generation: u64,
    cancel: &Arc<AtomicBool>,
    root: &Path,
    options: &ScanOptions,
) {
    let estimate = estimate_entries(root);
    log::debug!("Pre-walk estimate for {}: {estimate} entries", root.display());

    let walker = Walker::new(root, options.walk.clone()).with_cancel_flag(Arc::clone(cancel));
    let records = match walker.walk() {
        Ok(records) => records,
        Err(e) => {
            log::error!("Scan failed: {e}");
            publish_guarded(shared, generation, cancel, ScanState::Error(e.to_string()));
            return;
        }
    };

    let mut aggregator = Aggregator::new(root);
    let mut retained: Vec<FileRecord> = Vec::new();
    let mut visited = 0u64;

    for record in records {
        aggregator.record(&record);
        if record.size >= options.min_retained_size {
            retained.push(record);
        }
        visited += 1;

        if visited % PROGRESS_BATCH == 0 {
            let progress = (visited as f64 / estimate as f64).min(PROGRESS_CEILING);
            let published = publish_guarded(
                shared,
                generation,
                cancel,
                ScanState::Scanning {
                    progress,
                    files_found: visited,
                },
            );
            if !published {
                // Cancelled or superseded; partial state is discarded
                return;
            }
        }
    }

    if cancel.load(Ordering::SeqCst) {
        log::debug!("Scan generation {generation} cancelled during walk");
        return;
    }

    let (summary, directory_sizes) = aggregator.finish();
    retained.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

    log::info!(
        "Scan complete: {} files, {} bytes, {} retained",
        summary.total_files,
        summary.total_size,
        retained.len()
    );

    // Install results and flip to Complete atomically with respect to
    // the generation check, so observers never see Complete paired with
    // another scan's data.
    let mut state = shared.state.lock().unwrap();
    if shared.generation.load(Ordering::SeqCst) != generation || cancel.load(Ordering::SeqCst) {
        return;
    }
    *shared.summary.lock().unwrap() = summary;
    *shared.listing.lock().unwrap() = retained;
    *shared.directory_sizes.lock().unwrap() = directory_sizes;
    *state = ScanState::Complete;
    let _ = shared.events_tx.send(ScanState::Complete);
}

/// Publish with the cancellation flag checked immediately before the
/// send, in addition to the generation guard.
fn publish_guarded(
    shared: &Shared,
    generation: u64,
    cancel: &Arc<AtomicBool>,
    next: ScanState,
) -> bool {
    if cancel.load(Ordering::SeqCst) {
        return false;
    }
    shared.publish(generation, next)
}
