//! Parser for the raw activity stream.
//!
//! Each message is one comma-separated line:
//! - `<timestamp>,<user_id>,<request>`
//! - e.g. `2024-01-01T00:00:00,42,GET /rate/inception+2010=5`
//!
//! Parsing happens in two stages:
//! 1. `parse_activity` turns a payload into a `RawActivityRecord` or rejects it
//! 2. `extract_ratings` keeps the `GET /rate` requests and validates their ratings
//!
//! Neither stage ever fails a batch because of one bad message.

use crate::error::ActivityParseError;
use crate::types::*;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// `/rate/<movie_id>=<digits>`, movie id matched lazily up to the first `=<digits>`
static RATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/rate/(.*?)=([0-9]+)").expect("rate pattern is valid"));

/// Layouts accepted after RFC 3339 fails, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// =============================================================================
// Stage 1: activity records
// =============================================================================

/// Counters for one batch of parsed messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub received: usize,
    pub accepted: usize,
    pub not_utf8: usize,
    pub missing_fields: usize,
    pub invalid_timestamp: usize,
    pub invalid_user_id: usize,
}

impl ParseStats {
    /// Count the outcome of one `parse_activity` call
    pub fn observe(&mut self, outcome: &Result<RawActivityRecord, ActivityParseError>) {
        self.received += 1;
        match outcome {
            Ok(_) => self.accepted += 1,
            Err(ActivityParseError::NotUtf8) => self.not_utf8 += 1,
            Err(ActivityParseError::MissingFields { .. }) => self.missing_fields += 1,
            Err(ActivityParseError::InvalidTimestamp(_)) => self.invalid_timestamp += 1,
            Err(ActivityParseError::InvalidUserId(_)) => self.invalid_user_id += 1,
        }
    }

    /// Total number of rejected messages
    pub fn dropped(&self) -> usize {
        self.received - self.accepted
    }
}

/// Parse one raw message payload into an activity record.
///
/// Only the first three fields are used; anything after a third comma is
/// ignored.
pub fn parse_activity(payload: &[u8]) -> Result<RawActivityRecord, ActivityParseError> {
    let line = std::str::from_utf8(payload).map_err(|_| ActivityParseError::NotUtf8)?;
    let line = line.trim_end_matches(['\r', '\n']);

    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 3 {
        return Err(ActivityParseError::MissingFields { found: parts.len() });
    }

    let timestamp = parse_timestamp(parts[0])
        .ok_or_else(|| ActivityParseError::InvalidTimestamp(parts[0].to_string()))?;
    let user_id = parts[1]
        .trim()
        .parse::<UserId>()
        .map_err(|_| ActivityParseError::InvalidUserId(parts[1].to_string()))?;

    Ok(RawActivityRecord {
        timestamp,
        user_id,
        request: parts[2].to_string(),
    })
}

/// Lenient timestamp parsing; `None` stands for "not a datetime"
///
/// Example: "2024-01-01T00:00:00" -> Some(..)
///          "yesterday" -> None
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a whole batch of payloads, keeping only the records that parsed
pub fn parse_batch<'a, I>(payloads: I) -> (Vec<RawActivityRecord>, ParseStats)
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut stats = ParseStats::default();
    let mut records = Vec::new();

    for payload in payloads {
        let outcome = parse_activity(payload);
        stats.observe(&outcome);
        match outcome {
            Ok(record) => records.push(record),
            Err(e) => debug!("Dropping activity message: {}", e),
        }
    }

    (records, stats)
}

// =============================================================================
// Stage 2: rating events
// =============================================================================

/// A `GET /rate` request whose rating text has not been converted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingCandidate {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating_text: String,
}

/// Pull movie id and rating text out of a rating request.
///
/// Returns `None` for non-rating requests and for rating requests that do not
/// match `/rate/<movie_id>=<digits>`.
pub fn extract_rating_candidate(record: &RawActivityRecord) -> Option<RatingCandidate> {
    if !record.is_rating_request() {
        return None;
    }
    let caps = RATE_PATTERN.captures(&record.request)?;
    Some(RatingCandidate {
        user_id: record.user_id,
        movie_id: caps[1].to_string(),
        rating_text: caps[2].to_string(),
    })
}

/// Convert rating candidates into validated rating events.
///
/// The conversion is all-or-nothing: if any rating text fails to convert to
/// an integer, the whole batch is dropped. Ratings that convert but fall
/// outside 1..=5 are removed one by one.
pub fn validate_candidates(candidates: Vec<RatingCandidate>) -> Vec<RatingEvent> {
    let converted: Result<Vec<(RatingCandidate, i64)>, _> = candidates
        .into_iter()
        .map(|c| {
            let value = c.rating_text.parse::<i64>();
            value.map(|v| (c, v))
        })
        .collect();

    let converted = match converted {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Rating value in wrong format or range, dropping batch: {}", e);
            return Vec::new();
        }
    };

    converted
        .into_iter()
        .filter_map(|(c, value)| RatingEvent::new(c.user_id, c.movie_id, value))
        .collect()
}

/// Separate the rating events from a batch of activity records
pub fn extract_ratings(records: &[RawActivityRecord]) -> Vec<RatingEvent> {
    let candidates: Vec<RatingCandidate> =
        records.iter().filter_map(extract_rating_candidate).collect();
    let candidate_count = candidates.len();

    let events = validate_candidates(candidates);
    debug!(
        "Extracted {} rating events from {} candidates ({} records)",
        events.len(),
        candidate_count,
        records.len()
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(request: &str) -> RawActivityRecord {
        parse_activity(format!("2024-01-01T00:00:00,7,{}", request).as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_scenario_message() {
        let rec = parse_activity(b"2024-01-01T00:00:00,42,GET /rate/inception+2010=5").unwrap();
        assert_eq!(rec.user_id, 42);
        assert_eq!(rec.request, "GET /rate/inception+2010=5");

        let events = extract_ratings(&[rec]);
        assert_eq!(
            events,
            vec![RatingEvent {
                user_id: 42,
                movie_id: "inception+2010".to_string(),
                rating: 5,
            }]
        );
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        assert!(parse_timestamp("2024-01-01T00:00:00").is_some());
        assert!(parse_timestamp("2024-01-01T00:00:00.123").is_some());
        assert!(parse_timestamp("2024-01-01 10:30:00").is_some());
        assert!(parse_timestamp("2024-01-01T10:30").is_some());
        assert!(parse_timestamp("2024-01-01").is_some());
        assert!(parse_timestamp("2024-01-01T00:00:00+02:00").is_some());
        assert!(parse_timestamp(" 2024-01-01T00:00:00 ").is_some());

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2024-13-01T00:00:00").is_none());
    }

    #[test]
    fn test_rfc3339_offset_is_normalized_to_utc() {
        let ts = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, parse_timestamp("2024-01-01T00:00:00").unwrap());
    }

    #[test]
    fn test_rejects() {
        assert_eq!(
            parse_activity(b"2024-01-01T00:00:00,42"),
            Err(ActivityParseError::MissingFields { found: 2 })
        );
        assert!(matches!(
            parse_activity(b"garbage,42,GET /rate/x=5"),
            Err(ActivityParseError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            parse_activity(b"2024-01-01T00:00:00,abc,GET /rate/x=5"),
            Err(ActivityParseError::InvalidUserId(_))
        ));
        assert_eq!(parse_activity(&[0xff, 0xfe, b',']), Err(ActivityParseError::NotUtf8));
    }

    #[test]
    fn test_request_truncated_at_comma() {
        let rec = parse_activity(b"2024-01-01T00:00:00,1,GET /data/m/x/1.mpg,extra\n").unwrap();
        assert_eq!(rec.request, "GET /data/m/x/1.mpg");
    }

    #[test]
    fn test_parse_batch_counts() {
        let payloads: Vec<&[u8]> = vec![
            b"2024-01-01T00:00:00,1,GET /rate/a=4",
            b"bad,1,GET /rate/a=4",
            b"2024-01-01T00:00:00,x,GET /rate/a=4",
            b"2024-01-01T00:00:00",
        ];
        let (records, stats) = parse_batch(payloads);
        assert_eq!(records.len(), 1);
        assert_eq!(stats.received, 4);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.invalid_timestamp, 1);
        assert_eq!(stats.invalid_user_id, 1);
        assert_eq!(stats.missing_fields, 1);
        assert_eq!(stats.dropped(), 3);
    }

    #[test]
    fn test_rating_acceptance_property() {
        for r in 0..=12 {
            let events = extract_ratings(&[record(&format!("GET /rate/m+2000={}", r))]);
            assert_eq!(events.len() == 1, (1..=5).contains(&r), "rating {}", r);
        }
        // Leading zeros still convert
        let events = extract_ratings(&[record("GET /rate/m+2000=05")]);
        assert_eq!(events[0].rating, 5);
    }

    #[test]
    fn test_non_numeric_rating_is_not_a_rating_event() {
        assert!(extract_rating_candidate(&record("GET /rate/m+2000=five")).is_none());
        assert!(extract_rating_candidate(&record("GET /rate/m+2000=-3")).is_none());
    }

    #[test]
    fn test_out_of_range_is_excluded() {
        let events = extract_ratings(&[
            record("GET /rate/a=7"),
            record("GET /rate/b=3"),
        ]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].movie_id, "b");
    }

    #[test]
    fn test_only_rate_requests_are_candidates() {
        assert!(extract_rating_candidate(&record("GET /data/m/a/1.mpg")).is_none());
        assert!(extract_rating_candidate(&record("POST /rate/a=5")).is_none());
        assert!(extract_rating_candidate(&record("GET /rate/a")).is_none());
    }

    #[test]
    fn test_movie_id_stops_at_first_rating_assignment() {
        let c = extract_rating_candidate(&record("GET /rate/a=b=4")).unwrap();
        assert_eq!(c.movie_id, "a=b");
        assert_eq!(c.rating_text, "4");
    }

    #[test]
    fn test_unconvertible_rating_drops_whole_batch() {
        let events = extract_ratings(&[
            record("GET /rate/a=4"),
            record("GET /rate/b=99999999999999999999999"),
        ]);
        assert!(events.is_empty());
    }
}
