//! # Data Loader Crate
//!
//! This crate turns the raw activity stream into training data.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RawActivityRecord, RatingEvent, ids)
//! - **parser**: Event Parser for `<timestamp>,<user_id>,<request>` messages and rating extraction
//! - **store**: Rating Store, deduplicating ratings into a user-item matrix
//! - **matrix**: Sparse (CSR) user-item rating matrix
//! - **artifact**: JSON training artifact read/write
//! - **error**: Error types for parsing and artifact I/O
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{parser, RatingStore};
//!
//! let (records, stats) = parser::parse_batch(payloads.iter().map(|p| p.as_slice()));
//! let events = parser::extract_ratings(&records);
//! let matrix = RatingStore::from_events(&events).to_matrix();
//!
//! println!("{} users rated {} movies", matrix.shape().0, matrix.shape().1);
//! ```

// Public modules
pub mod artifact;
pub mod error;
pub mod matrix;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use artifact::{read_artifact, write_artifact};
pub use error::{ActivityParseError, DataLoadError, Result};
pub use matrix::RatingMatrix;
pub use parser::{ParseStats, extract_ratings, parse_activity};
pub use store::RatingStore;
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Core types
    RatingEvent,
    RawActivityRecord,
    // Constants
    MAX_RATING,
    MIN_RATING,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_to_matrix() {
        let payloads: Vec<&[u8]> = vec![
            b"2024-01-01T00:00:00,1,GET /rate/a=5",
            b"2024-01-01T00:00:01,1,GET /data/m/b/3.mpg",
            b"2024-01-01T00:00:02,2,GET /rate/a=4",
            b"2024-01-01T00:00:03,2,GET /rate/b=7",
            b"oops,3,GET /rate/c=5",
        ];
        let (records, stats) = parser::parse_batch(payloads);
        assert_eq!(stats.accepted, 4);

        let events = extract_ratings(&records);
        assert_eq!(events.len(), 2);

        let matrix = RatingStore::from_events(&events).to_matrix();
        assert_eq!(matrix.shape(), (2, 1));
        assert_eq!(matrix.get(2, "a"), 4.0);
        assert_eq!(matrix.get(2, "b"), 0.0);
    }

    #[test]
    fn test_empty_queries() {
        let matrix = RatingStore::new().to_matrix();

        // Querying a matrix with no data should return zeros or empty results
        assert!(matrix.is_empty());
        assert_eq!(matrix.get(999, "any"), 0.0);
        assert!(matrix.rated_movies(999).is_empty());
        assert!(matrix.row_of(999).is_none());
    }
}
