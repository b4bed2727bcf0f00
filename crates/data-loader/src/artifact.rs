//! Training artifact: the JSON handoff between rating extraction and training.
//!
//! Format: a JSON array of records
//! `[{"userid": 42, "movieid": "inception+2010", "rating": 5}, ...]`
//!
//! The file is written wholesale at the end of extraction and read wholesale
//! at the start of training. There is no append contract.

use crate::error::{DataLoadError, Result};
use crate::types::{MovieId, RatingEvent, UserId};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Artifact row as written by any producer; validated into a `RatingEvent`.
///
/// The rating stays a raw JSON number so one out-of-range or fractional
/// value costs its own row, not the whole file.
#[derive(Debug, Deserialize)]
struct ArtifactRecord {
    userid: UserId,
    movieid: MovieId,
    rating: serde_json::Number,
}

impl ArtifactRecord {
    fn into_event(self) -> Result<RatingEvent> {
        let rating = self.rating.as_i64();
        rating
            .and_then(|r| RatingEvent::new(self.userid, self.movieid, r))
            .ok_or_else(|| DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: self.rating.to_string(),
            })
    }
}

/// Read every rating record from the artifact.
///
/// Records whose rating is not an integer in 1..=5 are skipped with a
/// warning; a file that is not a JSON array of records is an error.
pub fn read_artifact(path: &Path) -> Result<Vec<RatingEvent>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let records: Vec<ArtifactRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DataLoadError::Json {
            path: path.display().to_string(),
            source,
        })?;

    let total = records.len();
    let mut events = Vec::with_capacity(total);
    for record in records {
        match record.into_event() {
            Ok(event) => events.push(event),
            Err(e) => debug!("Skipping artifact record: {}", e),
        }
    }
    if events.len() < total {
        warn!(
            "Skipped {} invalid ratings in {}",
            total - events.len(),
            path.display()
        );
    }

    info!("Read {} ratings from {}", events.len(), path.display());
    Ok(events)
}

/// Write the full rating set, replacing any previous artifact.
///
/// The records go to a sibling temporary file first and are renamed into
/// place, so a reader never observes a half-written artifact.
pub fn write_artifact(path: &Path, events: &[RatingEvent]) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    if let Err(e) = write_records(&tmp_path, events) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path)?;

    info!("Wrote {} ratings to {}", events.len(), path.display());
    Ok(())
}

fn write_records(tmp_path: &Path, events: &[RatingEvent]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(tmp_path)?);
    serde_json::to_writer(&mut writer, events).map_err(|source| DataLoadError::Json {
        path: tmp_path.display().to_string(),
        source,
    })?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RatingStore;

    #[test]
    fn test_round_trip_preserves_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");

        let events = vec![
            RatingEvent::new(1, "a", 5).unwrap(),
            RatingEvent::new(1, "b", 3).unwrap(),
            RatingEvent::new(2, "a", 4).unwrap(),
            RatingEvent::new(3, "c", 1).unwrap(),
        ];
        write_artifact(&path, &events).unwrap();
        let loaded = read_artifact(&path).unwrap();

        assert_eq!(loaded, events);
        assert_eq!(
            RatingStore::from_events(&loaded).to_matrix(),
            RatingStore::from_events(&events).to_matrix()
        );
    }

    #[test]
    fn test_reads_pandas_style_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");
        fs::write(
            &path,
            r#"[{"userid":42,"movieid":"inception+2010","rating":5},{"userid":7,"movieid":"heat+1995","rating":9}]"#,
        )
        .unwrap();

        let loaded = read_artifact(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].movie_id, "inception+2010");
    }

    #[test]
    fn test_unrepresentable_ratings_skip_only_their_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");
        fs::write(
            &path,
            r#"[{"userid":1,"movieid":"a","rating":5},
                {"userid":2,"movieid":"b","rating":300},
                {"userid":3,"movieid":"c","rating":-1},
                {"userid":4,"movieid":"d","rating":4.5},
                {"userid":5,"movieid":"e","rating":3.0}]"#,
        )
        .unwrap();

        let loaded = read_artifact(&path).unwrap();
        assert_eq!(loaded, vec![RatingEvent::new(1, "a", 5).unwrap()]);
    }

    #[test]
    fn test_refused_record_names_the_value() {
        let record: ArtifactRecord =
            serde_json::from_str(r#"{"userid":2,"movieid":"b","rating":300}"#).unwrap();
        match record.into_event() {
            Err(DataLoadError::InvalidValue { field, value }) => {
                assert_eq!(field, "rating");
                assert_eq!(value, "300");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        if !Path::new("/dev/full").exists() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");
        let tmp_path = path.with_extension("json.tmp");
        // Writes through this link fail with ENOSPC at flush
        std::os::unix::fs::symlink("/dev/full", &tmp_path).unwrap();

        let events = vec![RatingEvent::new(1, "a", 5).unwrap()];
        assert!(write_artifact(&path, &events).is_err());
        assert!(fs::symlink_metadata(&tmp_path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");
        write_artifact(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(read_artifact(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            read_artifact(&missing),
            Err(DataLoadError::FileNotFound { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(read_artifact(&bad), Err(DataLoadError::Json { .. })));
    }
}
