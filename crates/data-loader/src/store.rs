//! Rating Store: the deduplicated, validated set of ratings for one training
//! cycle, and the user-item matrix built from it.
//!
//! Duplicate `(user, movie)` pairs are averaged, the same way a pivot table
//! with a mean aggregate collapses them. The store is rebuilt wholesale each
//! cycle; there is no incremental update path.

use crate::matrix::RatingMatrix;
use crate::types::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    /// (user, movie) -> (sum of ratings, count)
    cells: BTreeMap<(UserId, MovieId), (u32, u32)>,
    events_seen: usize,
    rejected: usize,
}

impl RatingStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a set of events
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a RatingEvent>,
    {
        let mut store = Self::new();
        for event in events {
            store.insert(event);
        }
        debug!(
            "Rating store built: {} events, {} unique ratings, {} rejected",
            store.events_seen,
            store.len(),
            store.rejected
        );
        store
    }

    /// Insert one event; out-of-range ratings are refused.
    ///
    /// Returns whether the event was kept.
    pub fn insert(&mut self, event: &RatingEvent) -> bool {
        self.events_seen += 1;
        if !event.is_valid() {
            warn!(
                "Refusing rating {} from user {} for {}",
                event.rating, event.user_id, event.movie_id
            );
            self.rejected += 1;
            return false;
        }

        let entry = self
            .cells
            .entry((event.user_id, event.movie_id.clone()))
            .or_insert((0, 0));
        entry.0 += u32::from(event.rating);
        entry.1 += 1;
        true
    }

    /// Number of unique `(user, movie)` pairs
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Events offered to the store, including refused ones
    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Events refused for an out-of-range rating
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Rating for a pair, averaged over duplicates
    pub fn rating(&self, user_id: UserId, movie_id: &str) -> Option<f64> {
        self.cells
            .get(&(user_id, movie_id.to_string()))
            .map(|&(sum, count)| f64::from(sum) / f64::from(count))
    }

    /// Build the sparse user-item matrix
    pub fn to_matrix(&self) -> RatingMatrix {
        let cells: BTreeMap<(UserId, MovieId), f64> = self
            .cells
            .iter()
            .map(|(key, &(sum, count))| (key.clone(), f64::from(sum) / f64::from(count)))
            .collect();
        RatingMatrix::from_cells(&cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(user_id: UserId, movie: &str, rating: u8) -> RatingEvent {
        RatingEvent {
            user_id,
            movie_id: movie.to_string(),
            rating,
        }
    }

    #[test]
    fn test_empty_store_gives_empty_matrix() {
        let store = RatingStore::from_events(std::iter::empty());
        assert!(store.is_empty());
        let matrix = store.to_matrix();
        assert_eq!(matrix.shape(), (0, 0));
    }

    #[test]
    fn test_duplicates_are_averaged() {
        let events = vec![event(1, "a", 4), event(1, "a", 5), event(2, "a", 3)];
        let store = RatingStore::from_events(&events);
        assert_eq!(store.len(), 2);
        assert_eq!(store.events_seen(), 3);
        assert_eq!(store.rating(1, "a"), Some(4.5));
        assert_eq!(store.to_matrix().get(1, "a"), 4.5);
    }

    #[test]
    fn test_invalid_ratings_never_stored() {
        let events = vec![event(1, "a", 0), event(1, "b", 6), event(1, "c", 2)];
        let store = RatingStore::from_events(&events);
        assert_eq!(store.len(), 1);
        assert_eq!(store.rejected(), 2);
        assert_eq!(store.rating(1, "a"), None);
    }

    #[test]
    fn test_matrix_shape() {
        let events = vec![
            event(1, "A", 5),
            event(1, "C", 3),
            event(2, "A", 4),
            event(2, "C", 2),
            event(3, "B", 5),
        ];
        let matrix = RatingStore::from_events(&events).to_matrix();
        assert_eq!(matrix.shape(), (3, 3));
        assert_eq!(matrix.nnz(), 5);
        assert_eq!(matrix.to_dense()[0], vec![5.0, 0.0, 3.0]);
    }
}
