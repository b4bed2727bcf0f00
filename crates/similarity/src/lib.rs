//! # Similarity Crate
//!
//! Pairwise user similarity for user-based collaborative filtering:
//! "users who rated like you".
//!
//! The similarity matrix is a pure function of the rating matrix. There is no
//! incremental update path; each training cycle recomputes it from scratch.
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::cosine_similarity;
//!
//! let ratings = data_loader::RatingStore::from_events(&events).to_matrix();
//! let similarity = cosine_similarity(&ratings);
//! let score = similarity.get(1, 2);
//! ```

pub mod cosine;

pub use cosine::{SimilarityMatrix, cosine_similarity};
