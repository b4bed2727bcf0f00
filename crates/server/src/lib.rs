//! Server crate for the ReelRecs recommendation engine.
//!
//! This crate ties the stages together: configuration, the training cycle
//! that produces immutable model snapshots, and the `recommend_movies`
//! serving entry point.

pub mod config;
pub mod service;
pub mod training;

pub use config::ServiceConfig;
pub use service::{RecommendationService, reload, retrain_every};
pub use training::{ModelSnapshot, write_training_artifact};
