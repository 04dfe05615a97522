//! SHA-256 content fingerprints over a bounded file prefix.
//!
//! A fingerprint is the SHA-256 digest of the first [`FINGERPRINT_PREFIX_LEN`]
//! bytes of a file (the whole file if shorter). It is a cheap duplicate
//! candidate test, not a proof of identity: two files that agree on size and
//! prefix but diverge later will share a fingerprint. The duplicate detector
//! documents this trade-off.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Number of leading bytes hashed per file (64 KiB).
pub const FINGERPRINT_PREFIX_LEN: u64 = 64 * 1024;

/// A SHA-256 digest (32 bytes).
pub type Fingerprint = [u8; 32];

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The file was not found (may have vanished since the scan).
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl FingerprintError {
    fn from_io(path: &Path, source: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match source.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Compute the prefix fingerprint of a file.
///
/// Reads at most [`FINGERPRINT_PREFIX_LEN`] bytes through a buffered
/// reader, so memory use is bounded regardless of file size.
///
/// # Errors
///
/// Returns [`FingerprintError`] if the file cannot be opened or read.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, FingerprintError> {
    let file = File::open(path).map_err(|e| FingerprintError::from_io(path, e))?;
    let mut reader = BufReader::new(file).take(FINGERPRINT_PREFIX_LEN);

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| FingerprintError::from_io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().into())
}

/// Render a fingerprint as a lowercase hexadecimal string.
#[must_use]
pub fn fingerprint_to_hex(fp: &Fingerprint) -> String {
    fp.iter().fold(String::with_capacity(64), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{b:02x}");
        s
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_identical_content_identical_fingerprint() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"same content");
        let b = write_file(&dir, "b.bin", b"same content");

        assert_eq!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn test_different_content_different_fingerprint() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"content one");
        let b = write_file(&dir, "b.bin", b"content two");

        assert_ne!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn test_only_prefix_is_hashed() {
        let dir = TempDir::new().unwrap();
        let prefix = vec![0xAB_u8; FINGERPRINT_PREFIX_LEN as usize];

        let mut tail_x = prefix.clone();
        tail_x.extend_from_slice(b"tail x");
        let mut tail_y = prefix.clone();
        tail_y.extend_from_slice(b"tail yyyy");

        let a = write_file(&dir, "a.bin", &tail_x);
        let b = write_file(&dir, "b.bin", &tail_y);

        // Same first 64 KiB, so the fingerprints collide by design.
        assert_eq!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn test_short_file_hashes_whole_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"tiny");
        let b = write_file(&dir, "b.bin", b"tinz");

        assert_ne!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.bin");

        match fingerprint_file(&missing) {
            Err(FingerprintError::NotFound(p)) => assert_eq!(p, missing),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_hex_rendering() {
        let fp: Fingerprint = [0u8; 32];
        assert_eq!(fingerprint_to_hex(&fp), "0".repeat(64));

        let mut fp: Fingerprint = [0u8; 32];
        fp[0] = 0xff;
        assert!(fingerprint_to_hex(&fp).starts_with("ff"));
    }
}
