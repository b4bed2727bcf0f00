//! Time-bounded collection of activity records.
//!
//! ## Algorithm
//! 1. Fetch with a wait equal to the time left in the window
//! 2. Check the deadline before touching the fetched message
//! 3. Parse it (a bad message is counted and skipped)
//! 4. Stop at the deadline or when the source is exhausted
//! 5. Close the source; a failed close is logged, never raised

use crate::error::Result;
use crate::source::{Fetch, MessageSource};
use data_loader::{ParseStats, RawActivityRecord, parse_activity};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Counters for one collection window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub parse: ParseStats,
    /// Messages that arrived after the deadline and were discarded
    pub late: usize,
    pub transport_errors: usize,
    /// Whether the source ran dry before the window closed
    pub exhausted: bool,
    /// Whether the transport could not be reached at all
    pub connect_failed: bool,
}

/// Records gathered in one window
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub records: Vec<RawActivityRecord>,
    pub stats: CollectionStats,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Drives a `MessageSource` for a fixed wall-clock window.
#[derive(Debug, Clone, Copy)]
pub struct Collector {
    window: Duration,
}

impl Collector {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Consume `source` until the window closes, then release it.
    #[instrument(skip(self, source), fields(source = source.name(), window_ms = self.window.as_millis() as u64))]
    pub fn collect<S: MessageSource>(&self, mut source: S) -> Collection {
        let start = Instant::now();
        let mut collection = Collection::default();

        loop {
            let remaining = self.window.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }

            let fetched = source.fetch(remaining);

            if start.elapsed() >= self.window {
                if matches!(fetched, Ok(Fetch::Message(_))) {
                    collection.stats.late += 1;
                }
                break;
            }

            match fetched {
                Ok(Fetch::Message(payload)) => {
                    let outcome = parse_activity(&payload);
                    collection.stats.parse.observe(&outcome);
                    match outcome {
                        Ok(record) => collection.records.push(record),
                        Err(e) => debug!("Failed to process message: {}", e),
                    }
                }
                Ok(Fetch::Idle) => {}
                Ok(Fetch::Exhausted) => {
                    debug!("Source {} exhausted", source.name());
                    collection.stats.exhausted = true;
                    break;
                }
                Err(e) => {
                    collection.stats.transport_errors += 1;
                    warn!("Transport error on {}: {}", source.name(), e);
                }
            }
        }

        let name = source.name().to_string();
        if let Err(e) = source.close() {
            error!("Failed to close {}: {}", name, e);
        }

        let stats = &collection.stats;
        info!(
            "Data collection complete: {} records kept, {} dropped, {} late, {} transport errors in {:.2?}",
            collection.records.len(),
            stats.parse.dropped(),
            stats.late,
            stats.transport_errors,
            start.elapsed()
        );
        collection
    }

    /// Connect with `connect` and collect; a failed connect yields an empty
    /// collection instead of an error.
    pub fn collect_with<S, F>(&self, connect: F) -> Collection
    where
        S: MessageSource,
        F: FnOnce() -> Result<S>,
    {
        match connect() {
            Ok(source) => self.collect(source),
            Err(e) => {
                error!("Failed to create consumer: {}", e);
                Collection {
                    records: Vec::new(),
                    stats: CollectionStats {
                        connect_failed: true,
                        ..CollectionStats::default()
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::source::LineSource;
    use std::io::Cursor;

    /// Never produces anything and fails to close
    struct SilentSource;

    impl MessageSource for SilentSource {
        fn name(&self) -> &str {
            "silent"
        }

        fn fetch(&mut self, wait: Duration) -> Result<Fetch> {
            std::thread::sleep(wait.min(Duration::from_millis(5)));
            Ok(Fetch::Idle)
        }

        fn close(self) -> Result<()> {
            Err(TransportError::Close("already gone".to_string()))
        }
    }

    #[test]
    fn test_replay_until_exhausted() {
        let data = "2024-01-01T00:00:00,1,GET /rate/a=5\n\
                    garbage,2,GET /rate/a=5\n\
                    2024-01-01T00:00:02,3,GET /data/m/a/1.mpg\n";
        let source = LineSource::new(Cursor::new(data), "fixture");

        let collection = Collector::new(Duration::from_secs(5)).collect(source);

        assert_eq!(collection.records.len(), 2);
        assert!(collection.stats.exhausted);
        assert_eq!(collection.stats.parse.received, 3);
        assert_eq!(collection.stats.parse.invalid_timestamp, 1);
    }

    #[test]
    fn test_idle_source_stops_at_deadline() {
        let window = Duration::from_millis(40);
        let start = Instant::now();
        let collection = Collector::new(window).collect(SilentSource);

        assert!(start.elapsed() >= window);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(collection.is_empty());
        assert!(!collection.stats.exhausted);
    }

    /// Stdin-like reader that stays quiet well past any test window
    struct QuietPipe;

    impl std::io::Read for QuietPipe {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            std::thread::sleep(Duration::from_millis(1500));
            Ok(0)
        }
    }

    #[test]
    fn test_quiet_pipe_does_not_hold_the_window() {
        let window = Duration::from_millis(100);
        let source = LineSource::new(std::io::BufReader::new(QuietPipe), "pipe");

        let start = Instant::now();
        let collection = Collector::new(window).collect(source);

        assert!(start.elapsed() >= window);
        assert!(start.elapsed() < Duration::from_millis(1000));
        assert!(collection.is_empty());
        assert!(!collection.stats.exhausted);
    }

    #[test]
    fn test_zero_window_collects_nothing() {
        let source = LineSource::new(Cursor::new("2024-01-01T00:00:00,1,GET /rate/a=5\n"), "fixture");
        let collection = Collector::new(Duration::ZERO).collect(source);
        assert!(collection.is_empty());
        assert_eq!(collection.stats.parse.received, 0);
    }

    #[test]
    fn test_failed_connect_degrades_to_empty() {
        let collection = Collector::new(Duration::from_secs(1))
            .collect_with(|| -> Result<SilentSource> {
                Err(TransportError::Connect("no brokers".to_string()))
            });
        assert!(collection.is_empty());
        assert!(collection.stats.connect_failed);
    }
}
