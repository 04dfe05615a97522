//! Property-based invariants for aggregation.

use std::path::PathBuf;
use std::time::SystemTime;

use proptest::prelude::*;

use diskscout::aggregate::Aggregator;
use diskscout::scanner::FileRecord;

const ROOT: &str = "/scan-root";

#[derive(Debug, Clone)]
struct GenFile {
    dir: Option<String>,
    name: String,
    size: u64,
}

fn gen_file() -> impl Strategy<Value = GenFile> {
    (
        proptest::option::of("[a-z]{1,8}"),
        "[a-z]{1,8}",
        prop_oneof![
            Just("txt".to_string()),
            Just("jpg".to_string()),
            Just("mp4".to_string()),
            Just("zip".to_string()),
            Just("bin".to_string()),
        ],
        0u64..100_000,
    )
        .prop_map(|(dir, stem, ext, size)| GenFile {
            dir,
            name: format!("{stem}.{ext}"),
            size,
        })
}

fn to_record(file: &GenFile) -> FileRecord {
    let mut path = PathBuf::from(ROOT);
    if let Some(dir) = &file.dir {
        path.push(dir);
    }
    path.push(&file.name);
    FileRecord::new(path, file.size, SystemTime::UNIX_EPOCH)
}

proptest! {
    #[test]
    fn type_totals_sum_to_overall_totals(files in proptest::collection::vec(gen_file(), 0..64)) {
        let mut aggregator = Aggregator::new(PathBuf::from(ROOT).as_path());
        for file in &files {
            aggregator.record(&to_record(file));
        }
        let (summary, _) = aggregator.finish();

        let type_count: u64 = summary.by_type.values().map(|t| t.count).sum();
        let type_size: u64 = summary.by_type.values().map(|t| t.size).sum();

        prop_assert_eq!(type_count, summary.total_files);
        prop_assert_eq!(type_size, summary.total_size);
        prop_assert_eq!(summary.total_files, files.len() as u64);
    }

    #[test]
    fn directory_sizes_partition_total_size(files in proptest::collection::vec(gen_file(), 0..64)) {
        let mut aggregator = Aggregator::new(PathBuf::from(ROOT).as_path());
        for file in &files {
            aggregator.record(&to_record(file));
        }
        let (summary, dirs) = aggregator.finish();

        let dir_total: u64 = dirs.iter().map(|d| d.total_size).sum();
        prop_assert_eq!(dir_total, summary.total_size);
    }

    #[test]
    fn directory_sizes_are_sorted_descending(files in proptest::collection::vec(gen_file(), 0..64)) {
        let mut aggregator = Aggregator::new(PathBuf::from(ROOT).as_path());
        for file in &files {
            aggregator.record(&to_record(file));
        }
        let (_, dirs) = aggregator.finish();

        for pair in dirs.windows(2) {
            prop_assert!(pair[0].total_size >= pair[1].total_size
                || (pair[0].total_size == pair[1].total_size && pair[0].name <= pair[1].name));
        }
    }
}
