//! # Recommendation Service
//!
//! The serving entry point. Holds the current [`ModelSnapshot`] and answers
//! `recommend_movies` calls against it:
//! 1. Clone the current snapshot `Arc` (one short read lock)
//! 2. Run the recommender on that snapshot
//! 3. Map `UnknownUser` and `Internal` failures to their fallback lists
//!
//! `recommend_movies` never fails. Retraining swaps in a new snapshot with
//! [`RecommendationService::install`]; calls already running keep the
//! snapshot they started with.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, error, info, warn};

use data_loader::{MovieId, UserId};
use recommender::{RecommendError, Recommender, fallback_for};

use crate::training::ModelSnapshot;

pub struct RecommendationService {
    model: RwLock<Arc<ModelSnapshot>>,
    recommender: Recommender,
}

impl RecommendationService {
    pub fn new(snapshot: ModelSnapshot) -> Self {
        Self {
            model: RwLock::new(Arc::new(snapshot)),
            recommender: Recommender::new(),
        }
    }

    /// Use a custom recommender (e.g. a different filter pipeline)
    pub fn with_recommender(mut self, recommender: Recommender) -> Self {
        self.recommender = recommender;
        self
    }

    /// The snapshot new calls will use
    pub fn snapshot(&self) -> Arc<ModelSnapshot> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the served model
    pub fn install(&self, snapshot: ModelSnapshot) {
        let users = snapshot.user_count();
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        info!("Installed model snapshot with {} users", users);
    }

    /// Up to `num_recommendations` movie ids for `user_id`, or a fallback list.
    pub fn recommend_movies(&self, user_id: UserId, num_recommendations: usize) -> Vec<MovieId> {
        let start = Instant::now();
        let model = self.snapshot();

        let result = self.recommender.recommend(
            &model.ratings,
            &model.similarity,
            user_id,
            num_recommendations,
        );

        let movies = match result {
            Ok(movies) => movies,
            Err(e) => {
                match &e {
                    RecommendError::UnknownUser(_) => {
                        warn!("Serving unknown-user fallback: {}", e)
                    }
                    RecommendError::Internal(_) => {
                        error!("Serving internal-error fallback for user {}: {}", user_id, e)
                    }
                }
                fallback_for(&e, num_recommendations)
            }
        };

        debug!(
            "Answered user {} with {} movies in {:.2?}",
            user_id,
            movies.len(),
            start.elapsed()
        );
        movies
    }
}

/// Periodically retrain from the artifact and install the result.
///
/// Training runs on the blocking pool. A failed reload keeps the current
/// snapshot. Runs until the task is dropped or aborted.
pub async fn retrain_every(service: Arc<RecommendationService>, artifact_path: PathBuf, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately; the service already has a model
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match reload(artifact_path.clone()).await {
            Ok(snapshot) => service.install(snapshot),
            Err(e) => error!("Retraining failed, keeping current model: {:#}", e),
        }
    }
}

/// Train from the artifact on the blocking pool
pub async fn reload(artifact_path: PathBuf) -> Result<ModelSnapshot> {
    tokio::task::spawn_blocking(move || ModelSnapshot::from_artifact(&artifact_path)).await?
}
