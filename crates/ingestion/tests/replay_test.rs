//! Integration tests for replaying captured traffic through the collector.
//!
//! These tests verify that the collector, the event parser and the rating
//! extraction work together on a realistic capture file.

use data_loader::{RatingEvent, extract_ratings};
use ingestion::{Collector, LineSource};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn write_capture(lines: &[&str]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movielog.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    (dir, path)
}

#[test]
fn test_capture_to_rating_events() {
    let (_dir, path) = write_capture(&[
        "2024-01-01T00:00:00,42,GET /rate/inception+2010=5",
        "2024-01-01T00:00:01,42,GET /data/m/inception+2010/10.mpg",
        "2024-01-01T00:00:02,43,GET /rate/the+matrix+1999=7",
        "2024-01-01T00:00:03,notanumber,GET /rate/heat+1995=4",
        "2024-01-01T00:00:04,44,GET /rate/heat+1995=3",
        "2024-01-01T00:00:05,45,GET /recommendation request server, status 200",
    ]);

    let collector = Collector::new(Duration::from_secs(5));
    let collection = collector.collect_with(|| LineSource::open(&path));

    assert_eq!(collection.records.len(), 5);
    assert_eq!(collection.stats.parse.invalid_user_id, 1);
    assert!(collection.stats.exhausted);

    let events = extract_ratings(&collection.records);
    assert_eq!(
        events,
        vec![
            RatingEvent::new(42, "inception+2010", 5).unwrap(),
            RatingEvent::new(44, "heat+1995", 3).unwrap(),
        ]
    );
}

#[test]
fn test_missing_capture_is_empty_collection() {
    let collector = Collector::new(Duration::from_millis(100));
    let collection = collector.collect_with(|| LineSource::open(std::path::Path::new("/no/such/capture.txt")));

    assert!(collection.is_empty());
    assert!(collection.stats.connect_failed);
    assert!(extract_ratings(&collection.records).is_empty());
}
