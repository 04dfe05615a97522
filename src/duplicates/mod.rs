//! Duplicate detection over a finalized file listing.
//!
//! This module provides:
//! - Size-based candidate grouping followed by prefix-fingerprint
//!   confirmation ([`detector`])
//! - Duplicate group management ([`groups`])

pub mod detector;
pub mod groups;

// Re-export main types
pub use detector::{find_duplicates, DetectorConfig, DetectorStats};
pub use groups::DuplicateGroup;
