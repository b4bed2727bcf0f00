//! Kafka consumer source for the activity topic.
//!
//! Uses a blocking `BaseConsumer`: the collector polls with the time left in
//! its window, so an idle topic never holds ingestion past its deadline.

use crate::error::{Result, TransportError};
use crate::source::{Fetch, MessageSource};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::message::Message;
use std::time::Duration;
use tracing::{debug, info};

/// Where to find the activity topic
#[derive(Debug, Clone)]
pub struct KafkaSettings {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
    /// How long to wait for broker metadata before giving up on connect
    pub connect_timeout: Duration,
}

pub struct KafkaSource {
    consumer: BaseConsumer,
    name: String,
}

impl KafkaSource {
    /// Create the consumer, check the broker answers, and subscribe.
    ///
    /// Creating an rdkafka consumer is lazy, so the metadata request is what
    /// turns an unreachable broker into a `Connect` error here.
    pub fn connect(settings: &KafkaSettings) -> Result<Self> {
        info!(
            "Connecting to Kafka at {} (topic {}, group {})",
            settings.brokers, settings.topic, settings.group_id
        );

        let consumer: BaseConsumer = ClientConfig::new()
            .set("bootstrap.servers", &settings.brokers)
            .set("group.id", &settings.group_id)
            .set("enable.partition.eof", "false")
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "latest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        consumer
            .fetch_metadata(Some(&settings.topic), settings.connect_timeout)
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        consumer
            .subscribe(&[settings.topic.as_str()])
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        Ok(Self {
            consumer,
            name: format!("kafka:{}", settings.topic),
        })
    }
}

impl MessageSource for KafkaSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self, wait: Duration) -> Result<Fetch> {
        match self.consumer.poll(wait) {
            None => Ok(Fetch::Idle),
            Some(Ok(message)) => {
                let payload = message.payload().map(<[u8]>::to_vec).unwrap_or_default();
                Ok(Fetch::Message(payload))
            }
            Some(Err(e)) => Err(TransportError::Fetch(e.to_string())),
        }
    }

    fn close(self) -> Result<()> {
        debug!("Unsubscribing {}", self.name);
        self.consumer.unsubscribe();
        Ok(())
    }
}
