//! CSV export of scan listings.
//!
//! Writes the retained file listing as RFC 4180 CSV with a header row.
//! All values come from scan-time records; files are never re-statted
//! at export time, so the output reflects the scan snapshot even when
//! the tree has changed since.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use bytesize::ByteSize;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::scanner::FileRecord;

/// Errors during CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O failure creating or writing the output file
    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// CSV renderer for a retained listing.
///
/// # Example
///
/// ```no_run
/// use diskscout::output::ListingCsv;
///
/// # let listing = vec![];
/// let export = ListingCsv::new(&listing);
/// export.write_to(std::path::Path::new("large-files.csv"))?;
/// # Ok::<(), diskscout::output::ExportError>(())
/// ```
pub struct ListingCsv<'a> {
    listing: &'a [FileRecord],
}

impl<'a> ListingCsv<'a> {
    /// Create a CSV renderer over `listing`. Rows appear in listing order.
    #[must_use]
    pub fn new(listing: &'a [FileRecord]) -> Self {
        Self { listing }
    }

    /// Write the listing to `path`, creating or truncating the file.
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.write(file)
    }

    /// Render the listing to a string.
    pub fn to_csv_string(&self) -> Result<String, ExportError> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(String::from_utf8(buf).expect("CSV output is UTF-8"))
    }

    fn write<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "name",
            "path",
            "size_bytes",
            "size_human",
            "file_type",
            "modified",
        ])?;

        for record in self.listing {
            wtr.write_record([
                record.name.as_str(),
                &record.path.display().to_string(),
                &record.size.to_string(),
                &ByteSize::b(record.size).to_string(),
                record.file_type.name(),
                &format_timestamp(record.modified),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn format_timestamp(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.to_rfc3339()
}
