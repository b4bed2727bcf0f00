//! Recommendation core: neighbors, aggregation, filtering and fallbacks.
//!
//! This crate provides:
//! - `Recommender`, the user-based collaborative filtering algorithm
//! - Filter trait and `FilterPipeline` for post-ranking candidate filtering
//! - `RecommendError`, separating unknown users from internal failures
//! - The two static fallback lists and `fallback_for`
//!
//! ## Example Usage
//! ```ignore
//! use recommender::{Recommender, fallback_for};
//!
//! let recommender = Recommender::new();
//! let movies = recommender
//!     .recommend(&ratings, &similarity, user_id, 5)
//!     .unwrap_or_else(|e| fallback_for(&e, 5));
//! ```

pub mod error;
pub mod fallback;
pub mod filter_pipeline;
pub mod filters;
pub mod neighbors;
pub mod recommender;
pub mod traits;
pub mod types;

// Re-export main types
pub use error::{RecommendError, Result};
pub use fallback::{INTERNAL_ERROR_FALLBACK, UNKNOWN_USER_FALLBACK, fallback_for};
pub use filter_pipeline::FilterPipeline;
pub use neighbors::nearest_neighbors;
pub use recommender::{DEFAULT_NUM_RECOMMENDATIONS, Recommender, rank_movies};
pub use traits::Filter;
pub use types::{ScoredMovie, TargetUser};
