//! Pure, synchronous transforms over the generated-file catalog. Fetching
//! the records lives on `StageClient`; everything here is offline.

use crate::domain::model::GeneratedFileRecord;
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// Sort keys supported by the catalog view, all descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSortKey {
    Timestamp,
    Records,
    SizeMb,
}

/// Substring match over `filename` OR `step`, case-insensitive. An empty
/// query matches everything.
pub fn filter_by_text(files: &[GeneratedFileRecord], query: &str) -> Vec<GeneratedFileRecord> {
    let query = query.to_lowercase();
    files
        .iter()
        .filter(|file| {
            file.filename.to_lowercase().contains(&query)
                || file.step.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Exact match on `step`, order preserved relative to the input.
pub fn filter_by_step(files: &[GeneratedFileRecord], step: &str) -> Vec<GeneratedFileRecord> {
    files
        .iter()
        .filter(|file| file.step == step)
        .cloned()
        .collect()
}

/// Descending stable sort; ties keep their input order. Timestamps use the
/// backend's `%Y%m%d_%H%M%S` format and unparseable values sort last.
pub fn sort_files(files: &mut [GeneratedFileRecord], key: CatalogSortKey) {
    match key {
        CatalogSortKey::Timestamp => files.sort_by(|a, b| {
            match (parse_timestamp(&a.timestamp), parse_timestamp(&b.timestamp)) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        CatalogSortKey::Records => files.sort_by(|a, b| b.records.cmp(&a.records)),
        CatalogSortKey::SizeMb => files.sort_by(|a, b| b.size_mb.total_cmp(&a.size_mb)),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y%m%d_%H%M%S").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(filename: &str, step: &str, timestamp: &str, records: u64, size_mb: f64) -> GeneratedFileRecord {
        GeneratedFileRecord {
            filename: filename.to_string(),
            filepath: format!("output/{}", filename),
            step: step.to_string(),
            timestamp: timestamp.to_string(),
            records,
            columns: 7,
            size_mb,
        }
    }

    fn fixture() -> Vec<GeneratedFileRecord> {
        vec![
            record("ca_split_20240101_120000.csv", "A", "20240101_120000", 400, 1.2),
            record("ny_split_20240102_090000.csv", "B", "20240102_090000", 550, 2.5),
            record("ca_merged_20240103_150000.csv", "A", "20240103_150000", 380, 1.1),
        ]
    }

    #[test]
    fn test_filter_by_step_exact() {
        let files = fixture();
        let matched = filter_by_step(&files, "A");
        assert_eq!(matched.len(), 2);
        // Order preserved relative to input.
        assert_eq!(matched[0].filename, "ca_split_20240101_120000.csv");
        assert_eq!(matched[1].filename, "ca_merged_20240103_150000.csv");
    }

    #[test]
    fn test_filter_by_text_matches_filename_or_step() {
        let files = vec![
            record("ca_split.csv", "State Split", "20240101_120000", 1, 0.1),
            record("dedup_result.csv", "Deduplication", "20240101_120000", 1, 0.1),
        ];

        let by_name = filter_by_text(&files, "SPLIT");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].filename, "ca_split.csv");

        let by_step = filter_by_text(&files, "dedup");
        assert_eq!(by_step.len(), 1);
        assert_eq!(by_step[0].filename, "dedup_result.csv");

        assert_eq!(filter_by_text(&files, "").len(), 2);
        assert!(filter_by_text(&files, "nomatch").is_empty());
    }

    #[test]
    fn test_sort_by_timestamp_descending() {
        let mut files = fixture();
        sort_files(&mut files, CatalogSortKey::Timestamp);
        assert_eq!(files[0].timestamp, "20240103_150000");
        assert_eq!(files[2].timestamp, "20240101_120000");
    }

    #[test]
    fn test_unparseable_timestamps_sort_last() {
        let mut files = vec![
            record("a.csv", "A", "unknown", 1, 0.1),
            record("b.csv", "A", "20240101_120000", 1, 0.1),
        ];
        sort_files(&mut files, CatalogSortKey::Timestamp);
        assert_eq!(files[0].filename, "b.csv");
        assert_eq!(files[1].filename, "a.csv");
    }

    #[test]
    fn test_sort_by_records_descending_is_stable() {
        let mut files = vec![
            record("first.csv", "A", "t", 100, 0.1),
            record("second.csv", "A", "t", 500, 0.1),
            record("third.csv", "A", "t", 100, 0.1),
        ];
        sort_files(&mut files, CatalogSortKey::Records);
        assert_eq!(files[0].filename, "second.csv");
        // Equal keys keep input order.
        assert_eq!(files[1].filename, "first.csv");
        assert_eq!(files[2].filename, "third.csv");
    }

    #[test]
    fn test_sort_by_size_descending() {
        let mut files = fixture();
        sort_files(&mut files, CatalogSortKey::SizeMb);
        assert_eq!(files[0].size_mb, 2.5);
        assert_eq!(files[2].size_mb, 1.1);
    }
}
