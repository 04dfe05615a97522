//! Plain-text report rendering.

use std::fmt::Write;

use bytesize::ByteSize;

use crate::aggregate::{DirectorySize, ScanSummary};
use crate::classify::FileType;
use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecord;

/// Terminal report over a completed scan.
///
/// Renders the summary totals, a per-type breakdown, the largest
/// top-level directories, and the retained listing. The directory and
/// file sections are each truncated to `top` entries.
pub struct TextReport<'a> {
    summary: &'a ScanSummary,
    listing: &'a [FileRecord],
    directory_sizes: &'a [DirectorySize],
    top: usize,
}

impl<'a> TextReport<'a> {
    /// Create a report. `top` caps how many entries the directory and
    /// file sections each print; the truncation note shows the remainder.
    #[must_use]
    pub fn new(
        summary: &'a ScanSummary,
        listing: &'a [FileRecord],
        directory_sizes: &'a [DirectorySize],
        top: usize,
    ) -> Self {
        Self {
            summary,
            listing,
            directory_sizes,
            top,
        }
    }

    /// Render the full report.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Scan summary");
        let _ = writeln!(out, "============");
        let _ = writeln!(
            out,
            "Total: {} files, {}",
            self.summary.total_files,
            ByteSize::b(self.summary.total_size)
        );
        let _ = writeln!(out);

        self.render_type_breakdown(&mut out);
        self.render_directories(&mut out);
        self.render_listing(&mut out);

        out
    }

    fn render_type_breakdown(&self, out: &mut String) {
        if self.summary.by_type.is_empty() {
            return;
        }

        let _ = writeln!(out, "By type:");
        // Fixed type order keeps output stable across runs
        for file_type in FileType::all() {
            if let Some(totals) = self.summary.by_type.get(file_type) {
                let _ = writeln!(
                    out,
                    "  {:<12} {:>8} files  {:>10}",
                    file_type.name(),
                    totals.count,
                    ByteSize::b(totals.size).to_string()
                );
            }
        }
        let _ = writeln!(out);
    }

    fn render_directories(&self, out: &mut String) {
        if self.directory_sizes.is_empty() {
            return;
        }

        let shown = self.directory_sizes.len().min(self.top);
        let _ = writeln!(out, "Largest top-level directories:");
        for dir in &self.directory_sizes[..shown] {
            let _ = writeln!(
                out,
                "  {:>10}  {}",
                ByteSize::b(dir.total_size).to_string(),
                dir.name
            );
        }
        if self.directory_sizes.len() > shown {
            let _ = writeln!(
                out,
                "  ... and {} more",
                self.directory_sizes.len() - shown
            );
        }
        let _ = writeln!(out);
    }

    fn render_listing(&self, out: &mut String) {
        if self.listing.is_empty() {
            let _ = writeln!(out, "No files matched the size threshold.");
            return;
        }

        let shown = self.listing.len().min(self.top);
        let _ = writeln!(out, "Largest files:");
        for record in &self.listing[..shown] {
            let _ = writeln!(
                out,
                "  {:>10}  {}",
                ByteSize::b(record.size).to_string(),
                record.path.display()
            );
        }
        if self.listing.len() > shown {
            let _ = writeln!(out, "  ... and {} more", self.listing.len() - shown);
        }
    }
}

/// Render duplicate groups with per-group and total reclaimable space.
#[must_use]
pub fn render_duplicates(groups: &[DuplicateGroup]) -> String {
    let mut out = String::new();

    if groups.is_empty() {
        let _ = writeln!(out, "No duplicates found.");
        return out;
    }

    let total_reclaimable: u64 = groups.iter().map(DuplicateGroup::reclaimable_space).sum();
    let _ = writeln!(
        out,
        "Found {} duplicate group(s), {} reclaimable",
        groups.len(),
        ByteSize::b(total_reclaimable)
    );
    let _ = writeln!(out);

    for (i, group) in groups.iter().enumerate() {
        let _ = writeln!(
            out,
            "Group {} ({} x {}, {} reclaimable):",
            i + 1,
            group.len(),
            ByteSize::b(group.size),
            ByteSize::b(group.reclaimable_space())
        );
        for member in &group.members {
            let _ = writeln!(out, "  {}", member.path.display());
        }
        let _ = writeln!(out);
    }

    out
}
