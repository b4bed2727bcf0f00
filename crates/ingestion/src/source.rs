//! Transport abstraction for the activity stream.
//!
//! A `MessageSource` hands out one raw payload at a time. The collector never
//! cares where payloads come from, so the same time-bounded loop drives a
//! Kafka topic, a replayed capture file, or a test fixture.

use crate::error::{Result, TransportError};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

/// Outcome of one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    /// A raw message payload
    Message(Vec<u8>),
    /// Nothing arrived within the wait
    Idle,
    /// The stream has ended and will not produce more messages
    Exhausted,
}

/// Core trait for anything that yields activity messages.
pub trait MessageSource {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Wait up to `wait` for the next message.
    fn fetch(&mut self, wait: Duration) -> Result<Fetch>;

    /// Release the underlying connection.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Replays newline-delimited captured traffic, one message per line.
///
/// Lines are read on a background thread and handed over through a bounded
/// channel, so `fetch` waits at most `wait` even on a quiet pipe. Blank lines
/// are skipped. The first read error is reported once; after it the source
/// is exhausted.
pub struct LineSource {
    lines: Receiver<io::Result<Vec<u8>>>,
    name: String,
}

/// Lines buffered ahead of the collector
const LINE_BUFFER: usize = 1024;

impl LineSource {
    pub fn new<R>(reader: R, name: impl Into<String>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(LINE_BUFFER);
        thread::spawn(move || read_lines(reader, tx));
        Self {
            lines: rx,
            name: name.into(),
        }
    }

    /// Open a capture file for replay
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| TransportError::Connect(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }

    /// Replay messages piped on standard input
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), "stdin")
    }
}

/// Reader thread body: forward non-blank lines until EOF, a read error, or
/// the receiving side going away.
fn read_lines<R: BufRead>(mut reader: R, tx: SyncSender<io::Result<Vec<u8>>>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                if !buf.is_empty() && tx.send(Ok(buf.clone())).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

impl MessageSource for LineSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self, wait: Duration) -> Result<Fetch> {
        match self.lines.recv_timeout(wait) {
            Ok(Ok(line)) => Ok(Fetch::Message(line)),
            Ok(Err(e)) => Err(TransportError::Io(e)),
            Err(RecvTimeoutError::Timeout) => Ok(Fetch::Idle),
            Err(RecvTimeoutError::Disconnected) => Ok(Fetch::Exhausted),
        }
    }

    /// Dropping the receiver stops the reader thread at its next line. A
    /// thread blocked on a silent pipe is left detached.
    fn close(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_source_yields_lines_then_exhausts() {
        let data = "a,1,GET /rate/x=1\r\n\nb,2,GET /rate/y=2\n";
        let mut source = LineSource::new(Cursor::new(data), "fixture");
        let wait = Duration::from_secs(1);

        assert_eq!(source.fetch(wait).unwrap(), Fetch::Message(b"a,1,GET /rate/x=1".to_vec()));
        assert_eq!(source.fetch(wait).unwrap(), Fetch::Message(b"b,2,GET /rate/y=2".to_vec()));
        assert_eq!(source.fetch(wait).unwrap(), Fetch::Exhausted);
        assert_eq!(source.fetch(wait).unwrap(), Fetch::Exhausted);
        assert_eq!(source.name(), "fixture");
    }

    /// Reader whose every read fails
    struct BrokenPipe;

    impl io::Read for BrokenPipe {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_read_error_reported_once_then_exhausted() {
        let mut source = LineSource::new(BufReader::new(BrokenPipe), "broken");
        let wait = Duration::from_secs(1);

        assert!(matches!(source.fetch(wait), Err(TransportError::Io(_))));
        assert_eq!(source.fetch(wait).unwrap(), Fetch::Exhausted);
    }

    #[test]
    fn test_open_missing_file_is_connect_error() {
        let result = LineSource::open(Path::new("/definitely/not/here.log"));
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
