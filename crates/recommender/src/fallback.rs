//! Static recommendation lists served when personalization is impossible.

use crate::error::RecommendError;
use data_loader::MovieId;

/// Served when the user is not in the trained model
pub const UNKNOWN_USER_FALLBACK: [&str; 5] = [
    "the+wall+1975",
    "seven+samurai+1954",
    "monty+python+and+the+holy+grail+1975",
    "whiplash+2014",
    "the+godfather+1972",
];

/// Served when the computation itself failed
pub const INTERNAL_ERROR_FALLBACK: [&str; 5] = [
    "stalag+17+1953",
    "final+destination+2000",
    "crumb+1994",
    "mansfield+park+1999",
    "the+wall+1975",
];

/// The fallback list for a failure, truncated to `limit` entries.
///
/// Lists are never padded; asking for more than five yields five.
pub fn fallback_for(error: &RecommendError, limit: usize) -> Vec<MovieId> {
    let list: &[&str] = match error {
        RecommendError::UnknownUser(_) => &UNKNOWN_USER_FALLBACK,
        RecommendError::Internal(_) => &INTERNAL_ERROR_FALLBACK,
    };
    list.iter().take(limit).map(|m| m.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_are_distinct() {
        let unknown = fallback_for(&RecommendError::UnknownUser(999), 5);
        let internal = fallback_for(&RecommendError::Internal("boom".into()), 5);
        assert_eq!(
            unknown,
            vec![
                "the+wall+1975",
                "seven+samurai+1954",
                "monty+python+and+the+holy+grail+1975",
                "whiplash+2014",
                "the+godfather+1972",
            ]
        );
        assert_eq!(internal[0], "stalag+17+1953");
        assert_ne!(unknown, internal);
    }

    #[test]
    fn test_truncated_not_padded() {
        assert_eq!(fallback_for(&RecommendError::UnknownUser(1), 2).len(), 2);
        assert_eq!(fallback_for(&RecommendError::UnknownUser(1), 0).len(), 0);
        assert_eq!(fallback_for(&RecommendError::Internal(String::new()), 10).len(), 5);
    }
}
