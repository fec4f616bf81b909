//! Publisher for the two bus topics (spec.md §6): `transcode-jobs` (one
//! message per representation, Controller -> Worker) and `mpd-generation`
//! (the single packaging trigger, Tracker -> Packager). Both are
//! partition-keyed by `job_id` so a job's messages land on one partition
//! and preserve relative order, grounded on
//! `media-service/src/kafka/events.rs::MediaEventsProducer`.

use crate::circuit_breaker::{kafka_preset, CircuitBreaker, CircuitBreakerError, CircuitState};
use anyhow::{Context, Result};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use transcode_core::{MpdGenerationMessage, TranscodeTaskMessage};

#[derive(Clone)]
pub struct BusProducer {
    inner: Arc<FutureProducer>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl BusProducer {
    pub fn new(brokers: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("message.timeout.ms", "10000")
            .set("retries", "3")
            .set("retry.backoff.ms", "100")
            .create()
            .with_context(|| format!("failed to create Kafka producer for brokers '{brokers}'"))?;

        let circuit_breaker = Arc::new(CircuitBreaker::new(kafka_preset()));

        Ok(Self {
            inner: Arc::new(producer),
            circuit_breaker,
        })
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    pub async fn publish_transcode_task(&self, msg: &TranscodeTaskMessage) -> Result<()> {
        self.publish("transcode-jobs", &msg.job_id, msg).await
    }

    pub async fn publish_mpd_generation(&self, msg: &MpdGenerationMessage) -> Result<()> {
        self.publish("mpd-generation", &msg.job_id, msg).await
    }

    async fn publish<T: serde::Serialize>(&self, topic: &str, key: &str, msg: &T) -> Result<()> {
        let payload = serde_json::to_string(msg).context("failed to serialize bus message")?;
        let producer = self.inner.clone();
        let topic = topic.to_string();
        let key = key.to_string();

        let result = self
            .circuit_breaker
            .call(|| async {
                let record = FutureRecord::to(&topic).key(&key).payload(&payload);
                producer
                    .send(record, Duration::from_secs(10))
                    .await
                    .map(|_| ())
                    .map_err(|(err, _)| format!("{err}"))
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(CircuitBreakerError::Open) => {
                warn!(topic = %topic, job_id = %key, "circuit breaker open, rejecting publish");
                Err(anyhow::anyhow!(
                    "bus circuit breaker open - publish to '{topic}' rejected"
                ))
            }
            Err(CircuitBreakerError::CallFailed(e)) => {
                warn!(topic = %topic, job_id = %key, error = %e, "bus publish failed");
                Err(anyhow::anyhow!("failed to publish to '{topic}': {e}"))
            }
        }
    }
}
