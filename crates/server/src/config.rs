//! Service configuration.
//!
//! Everything has a working default; callers override individual fields
//! with the `with_*` builders.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BROKER: &str = "localhost:9092";
pub const DEFAULT_TOPIC: &str = "movielog18";
pub const DEFAULT_GROUP_ID: &str = "reel-recs";
pub const DEFAULT_COLLECTION_WINDOW: Duration = Duration::from_secs(20);
pub const DEFAULT_ARTIFACT_PATH: &str = "ratings.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Kafka bootstrap address
    pub broker: String,
    /// Activity topic name
    pub topic: String,
    /// Consumer group for the ingestion step
    pub group_id: String,
    /// Wall-clock budget of one ingestion run
    pub collection_window: Duration,
    /// Training artifact written by extraction and read by training
    pub artifact_path: PathBuf,
    pub num_recommendations: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            broker: DEFAULT_BROKER.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            group_id: DEFAULT_GROUP_ID.to_string(),
            collection_window: DEFAULT_COLLECTION_WINDOW,
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            num_recommendations: recommender::DEFAULT_NUM_RECOMMENDATIONS,
        }
    }
}

impl ServiceConfig {
    pub fn with_broker(mut self, broker: impl Into<String>) -> Self {
        self.broker = broker.into();
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    pub fn with_collection_window(mut self, window: Duration) -> Self {
        self.collection_window = window;
        self
    }

    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    pub fn with_num_recommendations(mut self, n: usize) -> Self {
        self.num_recommendations = n;
        self
    }
}
