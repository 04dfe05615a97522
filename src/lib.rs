//! diskscout - Disk Usage Scanner and Duplicate Finder
//!
//! A cross-platform Rust CLI application for finding where disk space
//! went: large-file listings, per-type and per-directory breakdowns, and
//! content-fingerprint duplicate detection.

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::cli::{Cli, Commands, OutputFormat, OverviewArgs, ScanArgs};
use crate::config::AppConfig;
use crate::coordinator::{ScanCoordinator, ScanOptions, ScanState};
use crate::duplicates::{find_duplicates, DetectorConfig};
use crate::error::ExitCode;
use crate::output::text::render_duplicates;
use crate::output::{ListingCsv, TextReport};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::WalkOptions;
use crate::signal::ShutdownHandler;

/// How often the event loop wakes to poll the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code on orderly completion; hard failures propagate
/// as errors for `main` to render.
///
/// # Errors
///
/// Returns an error if the scan root cannot be opened or an export file
/// cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let config = AppConfig::load();
    let shutdown = signal::install_handler()?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Scan(args) => run_scan_command(&args, &config, &shutdown, quiet),
        Commands::Overview(args) => run_overview_command(&args, &config, &shutdown, quiet),
    }
}

fn run_scan_command(
    args: &ScanArgs,
    config: &AppConfig,
    shutdown: &ShutdownHandler,
    quiet: bool,
) -> anyhow::Result<ExitCode> {
    let walk = WalkOptions {
        skip_hidden: !args.include_hidden,
        skip_package_interiors: !args.scan_packages,
        max_depth: args.max_depth,
    };
    let options = ScanOptions::large_files()
        .with_min_retained_size(args.min_size.unwrap_or(config.min_retained_size))
        .with_walk_options(walk);

    let outcome = run_to_completion(&args.path, options, shutdown, quiet)?;
    let Outcome::Complete(coordinator) = outcome else {
        return Ok(ExitCode::Interrupted);
    };

    let summary = coordinator.summary();
    let listing = coordinator.listing();
    let directory_sizes = coordinator.directory_sizes();
    let top = args.top.unwrap_or(config.top_files);

    match args.output {
        OutputFormat::Text => {
            print!(
                "{}",
                TextReport::new(&summary, &listing, &directory_sizes, top).render()
            );
        }
        OutputFormat::Csv => {
            print!("{}", ListingCsv::new(&listing).to_csv_string()?);
        }
    }

    if let Some(path) = &args.export {
        ListingCsv::new(&listing)
            .write_to(path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        log::info!("Exported {} entries to {}", listing.len(), path.display());
    }

    if !args.duplicates {
        return Ok(ExitCode::Success);
    }

    // Duplicate pass over the retained listing
    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(quiet));
    let detector_config = DetectorConfig::default()
        .with_cancel_flag(shutdown.get_flag())
        .with_progress_callback(progress);
    let (groups, stats) = find_duplicates(&listing, &detector_config);

    if stats.interrupted {
        return Ok(ExitCode::Interrupted);
    }

    print!("{}", render_duplicates(&groups));

    if stats.failed > 0 {
        log::warn!("{} file(s) could not be fingerprinted", stats.failed);
        return Ok(ExitCode::PartialSuccess);
    }
    Ok(ExitCode::Success)
}

fn run_overview_command(
    args: &OverviewArgs,
    config: &AppConfig,
    shutdown: &ShutdownHandler,
    quiet: bool,
) -> anyhow::Result<ExitCode> {
    let walk = WalkOptions {
        skip_hidden: false,
        skip_package_interiors: !args.scan_packages,
        max_depth: args.max_depth,
    };
    let options = ScanOptions::storage_overview().with_walk_options(walk);

    let outcome = run_to_completion(&args.path, options, shutdown, quiet)?;
    let Outcome::Complete(coordinator) = outcome else {
        return Ok(ExitCode::Interrupted);
    };

    let summary = coordinator.summary();
    let listing = coordinator.listing();
    let directory_sizes = coordinator.directory_sizes();
    let top = args.top.unwrap_or(config.top_files);

    match args.output {
        OutputFormat::Text => {
            print!(
                "{}",
                TextReport::new(&summary, &listing, &directory_sizes, top).render()
            );
        }
        OutputFormat::Csv => {
            print!("{}", ListingCsv::new(&listing).to_csv_string()?);
        }
    }

    if let Some(path) = &args.export {
        ListingCsv::new(&listing)
            .write_to(path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        log::info!("Exported {} entries to {}", listing.len(), path.display());
    }

    Ok(ExitCode::Success)
}

enum Outcome {
    Complete(ScanCoordinator),
    Interrupted,
}

/// Start a scan and block until it reaches a terminal state, polling the
/// shutdown flag so Ctrl+C cancels the walk cooperatively.
fn run_to_completion(
    root: &Path,
    options: ScanOptions,
    shutdown: &ShutdownHandler,
    quiet: bool,
) -> anyhow::Result<Outcome> {
    let coordinator = ScanCoordinator::new();
    let events = coordinator.subscribe();
    let progress = Progress::new(quiet);
    progress.on_phase_start("walking", 0);

    coordinator.start_scan(root, options);

    loop {
        if shutdown.is_shutdown_requested() {
            coordinator.cancel_scan();
            progress.on_phase_end("walking");
            return Ok(Outcome::Interrupted);
        }

        match events.recv_timeout(POLL_INTERVAL) {
            Ok(ScanState::Scanning { files_found, .. }) => {
                progress.on_progress(files_found as usize, "");
            }
            Ok(ScanState::Complete) => {
                progress.on_phase_end("walking");
                return Ok(Outcome::Complete(coordinator));
            }
            Ok(ScanState::Error(message)) => {
                progress.on_phase_end("walking");
                return Err(anyhow::anyhow!(message));
            }
            Ok(ScanState::Idle) => {
                // Cancelled out from under us
                progress.on_phase_end("walking");
                return Ok(Outcome::Interrupted);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("Scan worker disconnected unexpectedly");
            }
        }
    }
}
