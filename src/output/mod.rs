//! Result rendering and export.
//!
//! This module provides:
//! - CSV export of the retained listing ([`csv`])
//! - Plain-text report rendering for terminal output ([`text`])

pub mod csv;
pub mod text;

// Re-export main types
pub use csv::{ExportError, ListingCsv};
pub use text::TextReport;
