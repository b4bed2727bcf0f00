//! Failure modes of a recommendation request.

use data_loader::UserId;
use thiserror::Error;

/// Why a personalized recommendation could not be produced.
///
/// Callers map each variant to its own fallback list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// The user has no row in the trained model
    #[error("user {0} not found")]
    UnknownUser(UserId),

    /// Ranking or aggregation failed on a model that should have worked
    #[error("internal recommendation error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
