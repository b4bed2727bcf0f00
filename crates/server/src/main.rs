//! Simple test harness for the recommendation service.
//!
//! Trains from the artifact in the working directory and prints
//! recommendations for the first few users in the model.

use anyhow::Result;
use tracing::info;

use server::{ModelSnapshot, RecommendationService, ServiceConfig};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,recommender=debug")
        .init();

    let config = ServiceConfig::default();
    info!("Training from {}", config.artifact_path.display());
    let snapshot = ModelSnapshot::from_artifact(&config.artifact_path)?;
    let users: Vec<_> = snapshot.ratings.users().iter().take(5).copied().collect();

    let service = RecommendationService::new(snapshot);
    for user_id in users {
        let movies = service.recommend_movies(user_id, config.num_recommendations);
        info!("User {}: {}", user_id, movies.join(", "));
    }

    // An id that is never in the model shows the unknown-user fallback
    info!("User -1: {}", service.recommend_movies(-1, config.num_recommendations).join(", "));

    Ok(())
}
