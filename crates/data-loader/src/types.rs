//! Core domain types for the activity log and the ratings extracted from it.
//!
//! Key concepts:
//! - Type aliases for domain clarity (UserId, MovieId)
//! - A raw record type that only exists once both timestamp and user parsed
//! - A validated rating event that doubles as the training artifact record

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user, as logged by the streaming service
pub type UserId = i64;

/// Movie identifier as it appears in request paths (e.g. `inception+2010`)
pub type MovieId = String;

/// Lowest rating a user can give
pub const MIN_RATING: u8 = 1;

/// Highest rating a user can give
pub const MAX_RATING: u8 = 5;

// =============================================================================
// Activity Records
// =============================================================================

/// One parsed line of user activity: `<timestamp>,<user_id>,<request>`.
///
/// A record is only constructed when both the timestamp and the user id
/// parsed, so downstream stages never see a half-filled record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawActivityRecord {
    pub timestamp: NaiveDateTime,
    pub user_id: UserId,
    /// HTTP-style request, e.g. `GET /rate/inception+2010=5`
    pub request: String,
}

impl RawActivityRecord {
    /// True when the request is a candidate for rating extraction
    pub fn is_rating_request(&self) -> bool {
        self.request.starts_with("GET /rate")
    }
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single validated rating from a user for a movie.
///
/// The serde field names match the training artifact records
/// (`{"userid": 42, "movieid": "inception+2010", "rating": 5}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatingEvent {
    #[serde(rename = "userid")]
    pub user_id: UserId,
    #[serde(rename = "movieid")]
    pub movie_id: MovieId,
    /// Rating value from 1 to 5
    pub rating: u8,
}

impl RatingEvent {
    /// Build a rating event, rejecting values outside `MIN_RATING..=MAX_RATING`
    pub fn new(user_id: UserId, movie_id: impl Into<MovieId>, rating: i64) -> Option<Self> {
        if !is_valid_rating(rating) {
            return None;
        }
        Some(Self {
            user_id,
            movie_id: movie_id.into(),
            rating: rating as u8,
        })
    }

    /// Whether this event still satisfies the rating range invariant
    pub fn is_valid(&self) -> bool {
        is_valid_rating(i64::from(self.rating))
    }
}

/// `accepted(r) <=> 1 <= r <= 5`
pub fn is_valid_rating(rating: i64) -> bool {
    (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&rating)
}
