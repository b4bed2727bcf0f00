//! Filter to remove movies the user has already rated.
//!
//! There's no point in recommending a movie the user has already rated, so
//! this filter is part of every default pipeline.

use crate::traits::Filter;
use crate::types::{ScoredMovie, TargetUser};
use anyhow::Result;

/// Removes candidates the user rated (> 0).
///
/// Uses the HashSet in TargetUser.rated_movies for O(1) lookups.
pub struct AlreadyRatedFilter;

impl Filter for AlreadyRatedFilter {
    fn name(&self) -> &str {
        "AlreadyRatedFilter"
    }

    fn apply(&self, candidates: Vec<ScoredMovie>, context: &TargetUser) -> Result<Vec<ScoredMovie>> {
        let filtered: Vec<ScoredMovie> = candidates
            .into_iter()
            .filter(|candidate| !context.rated_movies.contains(&candidate.movie_id))
            .collect();
        Ok(filtered)
    }
}
