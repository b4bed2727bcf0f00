//! # Training
//!
//! One training cycle turns the full rating set into an immutable
//! [`ModelSnapshot`]:
//! 1. Deduplicate and validate events in a `RatingStore`
//! 2. Build the sparse user-item matrix
//! 3. Compute the user-user cosine similarity matrix
//!
//! Snapshots are never mutated. Retraining builds a new one and the service
//! swaps it in.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use data_loader::{RatingEvent, RatingMatrix, RatingStore, RawActivityRecord};
use similarity::{SimilarityMatrix, cosine_similarity};

/// The trained model for one cycle
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    pub ratings: RatingMatrix,
    pub similarity: SimilarityMatrix,
    pub trained_at: DateTime<Utc>,
    /// Events offered to training, before deduplication
    pub event_count: usize,
}

impl ModelSnapshot {
    /// Model with no users; every request falls back
    pub fn empty() -> Self {
        Self {
            ratings: RatingMatrix::empty(),
            similarity: SimilarityMatrix::empty(),
            trained_at: Utc::now(),
            event_count: 0,
        }
    }

    /// Train on an in-memory rating set
    #[instrument(skip(events), fields(events = events.len()))]
    pub fn train(events: &[RatingEvent]) -> Self {
        let start = Instant::now();

        let store = RatingStore::from_events(events);
        let ratings = store.to_matrix();
        let similarity = cosine_similarity(&ratings);

        let (users, movies) = ratings.shape();
        info!(
            "Trained on {} events: {} users x {} movies ({:.4} density) in {:.2?}",
            events.len(),
            users,
            movies,
            ratings.density(),
            start.elapsed()
        );

        Self {
            ratings,
            similarity,
            trained_at: Utc::now(),
            event_count: store.events_seen(),
        }
    }

    /// Read the training artifact wholesale and train on it
    pub fn from_artifact(path: &Path) -> Result<Self> {
        let events = data_loader::read_artifact(path)
            .with_context(|| format!("Failed to load training artifact {}", path.display()))?;
        Ok(Self::train(&events))
    }

    pub fn user_count(&self) -> usize {
        self.ratings.shape().0
    }

    pub fn movie_count(&self) -> usize {
        self.ratings.shape().1
    }
}

/// Extraction step: pull rating events out of collected records and write
/// them as the next training artifact.
///
/// The artifact is replaced wholesale, even when no ratings were found.
pub fn write_training_artifact(records: &[RawActivityRecord], path: &Path) -> Result<Vec<RatingEvent>> {
    let events = data_loader::extract_ratings(records);
    data_loader::write_artifact(path, &events)
        .with_context(|| format!("Failed to write training artifact {}", path.display()))?;
    info!(
        "Extracted {} ratings from {} records",
        events.len(),
        records.len()
    );
    Ok(events)
}
