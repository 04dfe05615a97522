//! Duplicate detection over completed scans.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crossbeam_channel::Receiver;
use tempfile::TempDir;

use diskscout::coordinator::{ScanCoordinator, ScanOptions, ScanState};
use diskscout::duplicates::{find_duplicates, DetectorConfig};

const WAIT: Duration = Duration::from_secs(10);

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(path).unwrap();
    f.write_all(content).unwrap();
}

fn wait_terminal(events: &Receiver<ScanState>) -> ScanState {
    loop {
        match events.recv_timeout(WAIT).expect("scan did not settle") {
            ScanState::Scanning { .. } => continue,
            terminal => return terminal,
        }
    }
}

#[test]
fn scan_then_detect_reports_confirmed_pairs_only() {
    let dir = TempDir::new().unwrap();
    // a and b share content; c matches their size but not their bytes
    write_file(&dir.path().join("a.bin"), b"same same same bytes");
    write_file(&dir.path().join("sub/b.bin"), b"same same same bytes");
    write_file(&dir.path().join("c.bin"), b"other other different");
    write_file(&dir.path().join("unique.bin"), b"xx");

    let coordinator = ScanCoordinator::new();
    let events = coordinator.subscribe();
    coordinator.start_scan(dir.path(), ScanOptions::storage_overview());
    assert_eq!(wait_terminal(&events), ScanState::Complete);

    let listing = coordinator.listing();
    let (groups, stats) = find_duplicates(&listing, &DetectorConfig::default());

    assert_eq!(groups.len(), 1);
    let names: Vec<&str> = groups[0].members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["a.bin", "b.bin"]);
    assert_eq!(groups[0].size, 20);
    assert_eq!(groups[0].reclaimable_space(), 20);
    assert_eq!(stats.reclaimable_space, 20);
    // c.bin was size-matched against nothing (different length), so only
    // same-size candidates were fingerprinted
    assert_eq!(stats.fingerprinted, stats.candidate_files);
}

#[test]
fn triple_copy_reclaims_two_file_sizes() {
    let dir = TempDir::new().unwrap();
    let payload = vec![0x42u8; 1000];
    write_file(&dir.path().join("one.dat"), &payload);
    write_file(&dir.path().join("two.dat"), &payload);
    write_file(&dir.path().join("three.dat"), &payload);

    let coordinator = ScanCoordinator::new();
    let events = coordinator.subscribe();
    coordinator.start_scan(dir.path(), ScanOptions::storage_overview());
    assert_eq!(wait_terminal(&events), ScanState::Complete);

    let (groups, stats) = find_duplicates(&coordinator.listing(), &DetectorConfig::default());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0].reclaimable_space(), 2000);
    assert_eq!(stats.duplicate_groups, 1);
}

#[test]
fn detection_respects_scan_filters() {
    let dir = TempDir::new().unwrap();
    // Hidden duplicates never enter a filtered listing
    write_file(&dir.path().join(".hidden-a.bin"), b"ghost content");
    write_file(&dir.path().join(".hidden-b.bin"), b"ghost content");
    write_file(&dir.path().join("plain.bin"), b"one of a kind");

    let coordinator = ScanCoordinator::new();
    let events = coordinator.subscribe();
    coordinator.start_scan(
        dir.path(),
        ScanOptions::large_files().with_min_retained_size(0),
    );
    assert_eq!(wait_terminal(&events), ScanState::Complete);

    let listing = coordinator.listing();
    assert_eq!(listing.len(), 1);

    let (groups, stats) = find_duplicates(&listing, &DetectorConfig::default());
    assert!(groups.is_empty());
    assert_eq!(stats.input_files, 1);
}

#[test]
fn files_deleted_between_scan_and_detection_are_skipped() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("keep-a.bin"), b"duplicated payload");
    write_file(&dir.path().join("keep-b.bin"), b"duplicated payload");
    write_file(&dir.path().join("gone.bin"), b"duplicated payload");

    let coordinator = ScanCoordinator::new();
    let events = coordinator.subscribe();
    coordinator.start_scan(dir.path(), ScanOptions::storage_overview());
    assert_eq!(wait_terminal(&events), ScanState::Complete);

    fs::remove_file(dir.path().join("gone.bin")).unwrap();

    let (groups, stats) = find_duplicates(&coordinator.listing(), &DetectorConfig::default());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(stats.failed, 1);
}
