//! Directory walker built on single-threaded, deterministic traversal.
//!
//! # Overview
//!
//! The [`Walker`] performs one cooperative pass over a directory tree and
//! yields a [`FileRecord`] per regular file. The traversal is:
//!
//! - **Cancellable**: an optional shared flag is checked between every
//!   visited entry; once observed, no further records are yielded.
//! - **Depth-bounded**: an optional maximum depth (in path segments
//!   relative to the root) stops descent without failing the walk.
//! - **Degrading gracefully**: per-entry failures (permission denied,
//!   entries that vanish mid-walk) are skipped silently. Only a root that
//!   cannot be opened at all fails the walk, and it fails fast, before
//!   any record is produced.
//! - **Loop-safe**: symbolic links are never followed during descent.
//!
//! A walk is finite and not restartable; a fresh [`Walker::walk`] call
//! re-walks from scratch.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError, WalkOptions};

/// Directory extensions treated as opaque package bundles.
///
/// When `skip_package_interiors` is set, directories with these
/// extensions are not descended into.
const PACKAGE_EXTENSIONS: &[&str] = &[
    "app",
    "appex",
    "framework",
    "bundle",
    "kext",
    "plugin",
    "photoslibrary",
    "musiclibrary",
    "xcodeproj",
];

/// Cooperative, cancellable directory walker.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walk configuration
    options: WalkOptions,
    /// Optional cancellation flag checked between entries
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path, options: WalkOptions) -> Self {
        Self {
            root: root.to_path_buf(),
            options,
            cancel_flag: None,
        }
    }

    /// Attach a cancellation flag.
    ///
    /// When the flag becomes `true` the walk stops at the next entry
    /// boundary. Cancellation is best-effort: one filesystem call already
    /// in flight may still complete, but no further records are yielded.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Decide whether to visit an entry (and descend, if a directory).
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        // The root itself is always traversed
        if entry.depth() == 0 {
            return true;
        }

        let name = entry.file_name().to_string_lossy();

        if self.options.skip_hidden && name.starts_with('.') {
            log::trace!("Skipping hidden entry: {}", entry.path().display());
            return false;
        }

        if self.options.skip_package_interiors
            && entry.file_type().is_dir()
            && is_package_bundle(entry.path())
        {
            log::trace!("Skipping package bundle: {}", entry.path().display());
            return false;
        }

        true
    }

    /// Walk the tree, yielding one record per regular file.
    ///
    /// Directories are traversed for structure but never yielded.
    /// Symbolic links are treated as leaves and never recursed through.
    /// Enumeration order is deterministic (sorted by file name).
    ///
    /// # Errors
    ///
    /// Fails fast with [`ScanError`] if the root does not exist, is not a
    /// directory, or cannot be opened. After that point the walk never
    /// errors; it degrades by omission.
    pub fn walk(&self) -> Result<impl Iterator<Item = FileRecord> + '_, ScanError> {
        ScanError::check_root(&self.root)?;

        let mut walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(depth) = self.options.max_depth {
            walk_dir = walk_dir.max_depth(depth as usize);
        }

        let mut entries = walk_dir.into_iter().filter_entry(|e| self.keep_entry(e));

        Ok(std::iter::from_fn(move || loop {
            if self.is_cancelled() {
                log::debug!("Walker: cancellation observed, stopping");
                return None;
            }

            let entry = match entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    // Per-entry failure: skip and continue
                    log::debug!("Skipping unreadable entry: {e}");
                    continue;
                }
            };

            // Only regular files become records; symlinks are leaves
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    log::debug!("Skipping {} (stat failed: {e})", entry.path().display());
                    continue;
                }
            };

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            return Some(FileRecord::new(entry.into_path(), metadata.len(), modified));
        }))
    }
}

/// Check whether a directory path looks like an opaque package bundle.
fn is_package_bundle(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            PACKAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &[u8]) {
        let mut f = File::create(path).unwrap();
        f.write_all(content).unwrap();
    }

    fn create_test_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("file1.txt"), b"Hello, world!");
        write_file(&dir.path().join("file2.txt"), b"Another file");
        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        write_file(&subdir.join("nested.txt"), b"Nested file content");
        dir
    }

    #[test]
    fn test_walker_finds_regular_files() {
        let dir = create_test_tree();
        let walker = Walker::new(dir.path(), WalkOptions::default());

        let records: Vec<_> = walker.walk().unwrap().collect();

        assert_eq!(records.len(), 3);
        for record in &records {
            assert!(record.size > 0);
            assert!(record.path.exists());
        }
    }

    #[test]
    fn test_walker_deterministic_order() {
        let dir = create_test_tree();
        let walker = Walker::new(dir.path(), WalkOptions::default());

        let first: Vec<_> = walker.walk().unwrap().map(|r| r.path).collect();
        let second: Vec<_> = walker.walk().unwrap().map(|r| r.path).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_walker_skips_hidden_entries() {
        let dir = create_test_tree();
        write_file(&dir.path().join(".hidden"), b"secret");
        let hidden_dir = dir.path().join(".cache");
        fs::create_dir(&hidden_dir).unwrap();
        write_file(&hidden_dir.join("inner.txt"), b"inside hidden dir");

        let walker = Walker::new(dir.path(), WalkOptions::default());
        let records: Vec<_> = walker.walk().unwrap().collect();

        assert_eq!(records.len(), 3);
        for record in &records {
            assert!(!record.name.starts_with('.'));
        }
    }

    #[test]
    fn test_walker_includes_hidden_when_configured() {
        let dir = create_test_tree();
        write_file(&dir.path().join(".hidden"), b"secret");

        let options = WalkOptions {
            skip_hidden: false,
            ..Default::default()
        };
        let walker = Walker::new(dir.path(), options);
        let records: Vec<_> = walker.walk().unwrap().collect();

        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_walker_skips_package_interiors() {
        let dir = create_test_tree();
        let bundle = dir.path().join("Tool.app");
        fs::create_dir_all(bundle.join("Contents")).unwrap();
        write_file(&bundle.join("Contents").join("binary"), b"mach-o bits");

        let walker = Walker::new(dir.path(), WalkOptions::default());
        let records: Vec<_> = walker.walk().unwrap().collect();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| !r.path.starts_with(&bundle)));
    }

    #[test]
    fn test_walker_descends_packages_when_configured() {
        let dir = TempDir::new().unwrap();
        let bundle = dir.path().join("Tool.app");
        fs::create_dir(&bundle).unwrap();
        write_file(&bundle.join("binary"), b"mach-o bits");

        let options = WalkOptions {
            skip_package_interiors: false,
            ..Default::default()
        };
        let walker = Walker::new(dir.path(), options);
        let records: Vec<_> = walker.walk().unwrap().collect();

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_walker_max_depth_bounds_descent() {
        let dir = TempDir::new().unwrap();
        // One file per level, 6 levels deep
        let mut current = dir.path().to_path_buf();
        for level in 1..=6 {
            write_file(&current.join(format!("level{level}.txt")), b"data");
            current = current.join(format!("d{level}"));
            fs::create_dir(&current).unwrap();
        }

        let options = WalkOptions {
            max_depth: Some(2),
            ..Default::default()
        };
        let walker = Walker::new(dir.path(), options);
        let records: Vec<_> = walker.walk().unwrap().collect();

        // level1.txt at depth 1 and level2.txt at depth 2; nothing deeper
        assert_eq!(records.len(), 2);
        for record in &records {
            let depth = record.path.strip_prefix(dir.path()).unwrap().components().count();
            assert!(depth <= 2, "{} too deep", record.path.display());
        }
    }

    #[test]
    fn test_walker_fails_fast_on_missing_root() {
        let walker = Walker::new(Path::new("/nonexistent/path/12345"), WalkOptions::default());
        assert!(matches!(walker.walk(), Err(ScanError::RootNotFound(_))));
    }

    #[test]
    fn test_walker_fails_fast_on_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        write_file(&file, b"not a dir");

        let walker = Walker::new(&file, WalkOptions::default());
        assert!(matches!(walker.walk(), Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn test_walker_cancel_flag_stops_iteration() {
        let dir = create_test_tree();
        for i in 0..20 {
            write_file(&dir.path().join(format!("extra{i}.txt")), b"data");
        }

        let flag = Arc::new(AtomicBool::new(false));
        let walker =
            Walker::new(dir.path(), WalkOptions::default()).with_cancel_flag(Arc::clone(&flag));

        let mut iter = walker.walk().unwrap();
        assert!(iter.next().is_some());

        flag.store(true, Ordering::SeqCst);
        assert!(iter.next().is_none());
    }

    #[test]
    #[cfg(unix)]
    fn test_walker_does_not_follow_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = create_test_tree();
        // Symlink cycle back to the root; following it would never terminate
        symlink(dir.path(), dir.path().join("loop")).unwrap();
        // Symlink to a file is a leaf, not a regular file
        symlink(dir.path().join("file1.txt"), dir.path().join("alias.txt")).unwrap();

        let walker = Walker::new(dir.path(), WalkOptions::default());
        let records: Vec<_> = walker.walk().unwrap().collect();

        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_walker_ignores_empty_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("empty1")).unwrap();
        fs::create_dir(dir.path().join("empty2")).unwrap();

        let walker = Walker::new(dir.path(), WalkOptions::default());
        assert_eq!(walker.walk().unwrap().count(), 0);
    }
}
