//! Progress reporting utilities using indicatif.
//!
//! The engine reports progress through the [`ProgressCallback`] trait;
//! [`Progress`] is the CLI implementation that renders indicatif bars.
//! Progress display is cosmetic: the engine works identically with no
//! callback attached.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for long-running engine phases.
///
/// Implement this trait to receive updates from the directory walk and
/// the duplicate-detection fingerprint pass.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "walking", "fingerprint")
    /// * `total` - Total number of items to process (0 when unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called as items are processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `detail` - Path or message describing the current item
    fn on_progress(&self, current: usize, detail: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter rendering indicatif bars for CLI runs.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    fingerprint: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            fingerprint: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn fingerprint_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "walking" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Scanning");
                pb.enable_steady_tick(Duration::from_millis(100));
                *self.walking.lock().unwrap() = Some(pb);
            }
            "fingerprint" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::fingerprint_style());
                pb.set_message("Fingerprinting");
                *self.fingerprint.lock().unwrap() = Some(pb);
            }
            _ => {}
        }
    }

    fn on_progress(&self, current: usize, detail: &str) {
        if self.quiet {
            return;
        }

        let message = truncate_path(detail, 40);
        if let Some(ref pb) = *self.fingerprint.lock().unwrap() {
            pb.set_position(current as u64);
            pb.set_message(message);
        } else if let Some(ref pb) = *self.walking.lock().unwrap() {
            pb.set_position(current as u64);
            pb.set_message(message);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            "walking" => {
                if let Some(pb) = self.walking.lock().unwrap().take() {
                    pb.finish_with_message("Scan complete");
                }
            }
            "fingerprint" => {
                if let Some(pb) = self.fingerprint.lock().unwrap().take() {
                    pb.finish_with_message("Fingerprinting complete");
                }
            }
            _ => {}
        }
    }
}

/// Truncate a path for display in a progress bar.
///
/// Measures and cuts in characters, never raw bytes, so multi-byte
/// names are split only on character boundaries.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let keep = max_len.saturating_sub(3);
        let tail: String = file_name.chars().skip(name_len - keep).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
