//! User-based collaborative filtering recommender.
//!
//! ## Algorithm
//! 1. Locate the user in the similarity matrix (absent -> `UnknownUser`)
//! 2. Take the `n` most similar other users as neighbors
//! 3. Score every movie by the neighbors' mean rating (unrated counts as 0)
//! 4. Rank by score, descending, ties in column order
//! 5. Run the filter pipeline (drops movies the user already rated)
//! 6. Return the first `n` movie ids
//!
//! The recommender holds no model state; every call is a pure function of
//! the matrices passed in.

use crate::error::{RecommendError, Result};
use crate::filter_pipeline::FilterPipeline;
use crate::neighbors::nearest_neighbors;
use crate::types::{ScoredMovie, TargetUser};
use data_loader::{MovieId, RatingMatrix, UserId};
use similarity::SimilarityMatrix;
use tracing::{debug, instrument};

/// Default number of recommendations per request
pub const DEFAULT_NUM_RECOMMENDATIONS: usize = 5;

pub struct Recommender {
    filter_pipeline: FilterPipeline,
}

impl Recommender {
    /// Recommender with the standard filter pipeline
    pub fn new() -> Self {
        Self {
            filter_pipeline: FilterPipeline::standard(),
        }
    }

    /// Replace the filter pipeline
    pub fn with_filter_pipeline(mut self, pipeline: FilterPipeline) -> Self {
        self.filter_pipeline = pipeline;
        self
    }

    /// Rank up to `num_recommendations` unrated movies for `user_id`.
    ///
    /// Fewer than `num_recommendations` ids come back when fewer unrated
    /// movies exist; this branch never pads.
    #[instrument(skip(self, ratings, similarity))]
    pub fn recommend(
        &self,
        ratings: &RatingMatrix,
        similarity: &SimilarityMatrix,
        user_id: UserId,
        num_recommendations: usize,
    ) -> Result<Vec<MovieId>> {
        let position = similarity
            .position(user_id)
            .ok_or(RecommendError::UnknownUser(user_id))?;
        if ratings.row_of(user_id).is_none() {
            return Err(RecommendError::UnknownUser(user_id));
        }
        if similarity.users() != ratings.users() {
            return Err(RecommendError::Internal(format!(
                "similarity axis ({} users) does not match rating rows ({} users)",
                similarity.len(),
                ratings.shape().0
            )));
        }

        let neighbors = nearest_neighbors(similarity, position, num_recommendations)?;
        debug!("User {} has {} neighbors", user_id, neighbors.len());

        let ranked = rank_movies(ratings, &neighbors)?;

        let context = TargetUser::from_ratings(ratings, user_id);
        let mut filtered = self
            .filter_pipeline
            .apply(ranked, &context)
            .map_err(|e| RecommendError::Internal(format!("filter pipeline failed: {:#}", e)))?;
        filtered.truncate(num_recommendations);

        debug!("Recommending {} movies to user {}", filtered.len(), user_id);
        Ok(filtered.into_iter().map(|c| c.movie_id).collect())
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean neighbor rating for every movie, ranked by score descending.
///
/// Cells a neighbor did not rate count as 0 in the mean. With no neighbors
/// every score is 0 and the ranking is plain column order.
pub fn rank_movies(ratings: &RatingMatrix, neighbors: &[usize]) -> Result<Vec<ScoredMovie>> {
    let movies = ratings.movies();
    let mut sums = vec![0.0; movies.len()];

    for &row in neighbors {
        let (cols, vals) = ratings
            .row(row)
            .ok_or_else(|| RecommendError::Internal(format!("neighbor row {} out of range", row)))?;
        for (&c, &v) in cols.iter().zip(vals) {
            let cell = sums
                .get_mut(c)
                .ok_or_else(|| RecommendError::Internal(format!("column {} out of range", c)))?;
            *cell += v;
        }
    }

    let count = neighbors.len().max(1) as f64;
    let mut scored: Vec<ScoredMovie> = movies
        .iter()
        .zip(sums)
        .map(|(movie, sum)| ScoredMovie::new(movie.clone(), sum / count))
        .collect();

    if let Some(bad) = scored.iter().find(|c| !c.score.is_finite()) {
        return Err(RecommendError::Internal(format!(
            "non-finite score for {}",
            bad.movie_id
        )));
    }

    // Sort by score DESC; slice::sort_by is stable
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(scored)
}
