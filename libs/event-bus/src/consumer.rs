//! Consumer side of the bus, shared by the Worker (`transcode-jobs`) and
//! the Packager (`mpd-generation`). Grounded on
//! `media-service/src/services/thumbnail/consumer.rs::ThumbnailConsumer`:
//! a `StreamConsumer` driven by `tokio::select!` against a shutdown watch
//! channel, auto-commit enabled so a crash mid-batch just redelivers
//! (spec.md §5 "at-least-once delivery").

use anyhow::{Context, Result};
use futures::StreamExt;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::ClientConfig;
use serde::de::DeserializeOwned;
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

#[derive(Clone, Debug)]
pub struct BusConsumerConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

pub struct BusConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl BusConsumer {
    pub fn new(config: &BusConsumerConfig) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "45000")
            .set("max.poll.interval.ms", "300000")
            .create()
            .with_context(|| format!("failed to create Kafka consumer for '{}'", config.topic))?;

        consumer
            .subscribe(&[&config.topic])
            .with_context(|| format!("failed to subscribe to topic '{}'", config.topic))?;

        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            "bus consumer initialized"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }

    /// Run until `shutdown_rx` signals, spawning `handler` as its own task
    /// once per successfully decoded message. Spawning (rather than
    /// awaiting inline) is what lets a caller's own concurrency limit —
    /// e.g. the Worker's encoder semaphore — gate more than one in-flight
    /// handler at a time; awaiting here would serialize every message
    /// behind the previous one's full handler regardless of any limit the
    /// handler itself acquires. Undecodable payloads are logged and
    /// skipped rather than killing the loop (spec.md §7: bus boundary
    /// drops are warnings, not crashes).
    pub async fn run<T, F, Fut>(&self, mut shutdown_rx: watch::Receiver<bool>, mut handler: F) -> Result<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        info!(topic = %self.topic, "starting bus consumer loop");
        let mut message_stream = self.consumer.stream();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!(topic = %self.topic, "shutdown signal received, stopping consumer");
                        break;
                    }
                }
                message = message_stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            let payload = match msg.payload() {
                                Some(p) => p,
                                None => {
                                    debug!("empty message payload, skipping");
                                    continue;
                                }
                            };

                            match serde_json::from_slice::<T>(payload) {
                                Ok(decoded) => {
                                    tokio::spawn(handler(decoded));
                                }
                                Err(e) => {
                                    warn!(error = %e, "failed to decode bus message, skipping");
                                }
                            }
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Kafka consumer error, continuing");
                        }
                        None => {
                            warn!("message stream ended unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        info!(topic = %self.topic, "bus consumer stopped");
        Ok(())
    }
}
