//! Candidate and context types shared by the recommender and its filters.

use data_loader::{MovieId, RatingMatrix, UserId};
use std::collections::HashSet;

/// A movie with its aggregated neighbor score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    /// Mean rating across the neighbor set, unrated cells counted as 0
    pub score: f64,
}

impl ScoredMovie {
    pub fn new(movie_id: impl Into<MovieId>, score: f64) -> Self {
        Self {
            movie_id: movie_id.into(),
            score,
        }
    }
}

/// What the filters need to know about the user being served
#[derive(Debug, Clone, Default)]
pub struct TargetUser {
    pub user_id: UserId,
    /// Movies with a rating > 0 in the user's row
    pub rated_movies: HashSet<MovieId>,
}

impl TargetUser {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            rated_movies: HashSet::new(),
        }
    }

    /// Collect the user's rated movies from the rating matrix
    pub fn from_ratings(ratings: &RatingMatrix, user_id: UserId) -> Self {
        Self {
            user_id,
            rated_movies: ratings.rated_movies(user_id).into_iter().cloned().collect(),
        }
    }
}
