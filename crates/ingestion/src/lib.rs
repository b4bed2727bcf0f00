//! # Ingestion Crate
//!
//! Collects raw activity records from the event transport for a bounded
//! wall-clock window.
//!
//! ## Components
//!
//! - **source**: `MessageSource` trait, `Fetch` outcome, `LineSource` replay
//! - **kafka**: `KafkaSource` (behind the `kafka` feature)
//! - **collector**: `Collector` with the time-bounding and degrade-to-empty policy
//!
//! ## Example Usage
//!
//! ```ignore
//! use ingestion::{Collector, LineSource};
//! use std::time::Duration;
//!
//! let collector = Collector::new(Duration::from_secs(20));
//! let collection = collector.collect_with(|| LineSource::open(path));
//! let events = data_loader::extract_ratings(&collection.records);
//! ```

pub mod collector;
pub mod error;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod source;

pub use collector::{Collection, CollectionStats, Collector};
pub use error::{Result, TransportError};
#[cfg(feature = "kafka")]
pub use kafka::{KafkaSettings, KafkaSource};
pub use source::{Fetch, LineSource, MessageSource};
