//! Duplicate group representation.

use serde::Serialize;

use crate::scanner::{fingerprint_to_hex, FileRecord, Fingerprint};

/// A set of files sharing exact size and prefix fingerprint.
///
/// Members are ordered by name ascending for determinism. The group
/// back-references files by record; it never owns them on disk and the
/// engine never deletes them.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// SHA-256 prefix fingerprint shared by all members
    pub fingerprint: Fingerprint,
    /// Exact size in bytes shared by all members
    pub size: u64,
    /// Member records, sorted by name ascending
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a group, sorting members by name ascending.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, size: u64, mut members: Vec<FileRecord>) -> Self {
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            fingerprint,
            size,
            members,
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check whether the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Space reclaimable if all but one copy were removed.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.size * (self.members.len() as u64).saturating_sub(1)
    }

    /// Fingerprint as a hexadecimal string.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        fingerprint_to_hex(&self.fingerprint)
    }

    /// Name of the first member (ties in group ordering break on this).
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.members.first().map_or("", |m| m.name.as_str())
    }
}
