//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to ranked candidates.

use crate::types::{ScoredMovie, TargetUser};
use anyhow::Result;

/// Core trait for filtering ranked candidates.
///
/// ## Design Note
/// - `Send + Sync` lets one recommender serve requests from several threads
/// - Filters take ownership of the ranked Vec and must keep its order
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to ranked candidates.
    ///
    /// # Arguments
    /// * `candidates` - Candidates in rank order (takes ownership)
    /// * `context` - The user being served
    ///
    /// # Returns
    /// * `Ok(Vec<ScoredMovie>)` - The surviving candidates, still in rank order
    /// * `Err` - If filtering fails
    fn apply(&self, candidates: Vec<ScoredMovie>, context: &TargetUser) -> Result<Vec<ScoredMovie>>;
}
