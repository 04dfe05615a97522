//! Command-line interface definitions for diskscout.
//!
//! This module defines all CLI arguments, subcommands, and options using
//! the clap derive API. Global options (verbosity, quiet, JSON errors)
//! apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Find files over 100 MiB under ~/Downloads
//! diskscout scan ~/Downloads
//!
//! # Lower the threshold and also look for duplicates
//! diskscout scan ~/Downloads --min-size 10MiB --duplicates
//!
//! # Full storage overview including hidden files
//! diskscout overview ~
//!
//! # Export the listing as CSV
//! diskscout scan ~/Videos --output csv --export large-files.csv
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Disk usage scanner and duplicate finder.
///
/// diskscout walks a directory tree, reports where the space went, and
/// optionally confirms duplicate files by content fingerprint.
#[derive(Debug, Parser)]
#[command(name = "diskscout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit errors as JSON on stderr (for scripting)
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for diskscout.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find large files (and optionally duplicates) under a directory
    Scan(ScanArgs),
    /// Full storage breakdown: every file counted, hidden included
    Overview(OverviewArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Minimum file size to list (e.g., 1KB, 1MiB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB.
    /// Smaller files still count toward the summary totals.
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum directory depth in path segments below the root
    #[arg(long, value_name = "N")]
    pub max_depth: Option<u32>,

    /// Include hidden files and directories (starting with .)
    #[arg(long)]
    pub include_hidden: bool,

    /// Descend into application bundles (.app, .framework, ...)
    #[arg(long)]
    pub scan_packages: bool,

    /// Detect duplicate files among the listed results
    #[arg(short, long)]
    pub duplicates: bool,

    /// How many entries the directory and file sections each show
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Write the listing as CSV to this file (in addition to stdout output)
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

/// Arguments for the overview subcommand.
#[derive(Debug, Args)]
pub struct OverviewArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Maximum directory depth in path segments below the root
    #[arg(long, value_name = "N")]
    pub max_depth: Option<u32>,

    /// Descend into application bundles (.app, .framework, ...)
    #[arg(long)]
    pub scan_packages: bool,

    /// How many entries the directory and file sections each show
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Write the listing as CSV to this file (in addition to stdout output)
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report
    Text,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB.
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use diskscout::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_size_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1024B").unwrap(), 1024);
        assert_eq!(parse_size("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_size_binary_and_decimal() {
        assert_eq!(parse_size("1KB").unwrap(), 1_000);
        assert_eq!(parse_size("1KiB").unwrap(), 1_024);
        assert_eq!(parse_size("1kib").unwrap(), 1_024);
        assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
        assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
        assert_eq!(parse_size("1GiB").unwrap(), 1_073_741_824);
        assert_eq!(parse_size("1TiB").unwrap(), 1_099_511_627_776);
    }

    #[test]
    fn test_parse_size_fractional() {
        assert_eq!(parse_size("1.5KB").unwrap(), 1_500);
        assert_eq!(parse_size("0.5GiB").unwrap(), 536_870_912);
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("10XB").is_err());
    }

    #[test]
    fn test_scan_args_defaults() {
        let cli = Cli::parse_from(["diskscout", "scan", "/tmp"]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.path, PathBuf::from("/tmp"));
                assert!(args.min_size.is_none());
                assert!(!args.include_hidden);
                assert!(!args.duplicates);
                assert_eq!(args.output, OutputFormat::Text);
            }
            Commands::Overview(_) => panic!("expected scan"),
        }
    }

    #[test]
    fn test_scan_args_flags() {
        let cli = Cli::parse_from([
            "diskscout",
            "scan",
            "/data",
            "--min-size",
            "10MiB",
            "--max-depth",
            "3",
            "--include-hidden",
            "--duplicates",
            "--output",
            "csv",
        ]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.min_size, Some(10 * 1024 * 1024));
                assert_eq!(args.max_depth, Some(3));
                assert!(args.include_hidden);
                assert!(args.duplicates);
                assert_eq!(args.output, OutputFormat::Csv);
            }
            Commands::Overview(_) => panic!("expected scan"),
        }
    }

    #[test]
    fn test_overview_args() {
        let cli = Cli::parse_from(["diskscout", "-v", "overview", "/home"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Overview(args) => assert_eq!(args.path, PathBuf::from("/home")),
            Commands::Scan(_) => panic!("expected overview"),
        }
    }
}
