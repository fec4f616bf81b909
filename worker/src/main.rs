//! Worker — consumes per-representation encode tasks from `transcode-jobs`
//! with bounded concurrency (spec.md §4.2). Runs the bus consumer loop and
//! a minimal health-check HTTP server as sibling tasks in a `JoinSet`,
//! mirroring `media-service/src/main.rs`'s HTTP-plus-background-server
//! shape (its gRPC half has no counterpart here).

mod config;
mod download;
mod encoder;
mod error;
mod pipeline;

use actix_web::{web, App, HttpResponse, HttpServer};
use config::Config;
use event_bus::{BusConsumer, BusConsumerConfig};
use kv_store::{JobKvStore, RedisPool};
use pipeline::WorkerContext;
use std::io;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info};
use transcode_core::TranscodeTaskMessage;

async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

#[tokio::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("failed to load worker configuration");
    info!(
        worker_id = %config.worker_id,
        max_concurrent_ffmpeg = config.max_concurrent_ffmpeg,
        "Worker starting"
    );

    let redis_pool = RedisPool::connect(&config.redis_addr)
        .await
        .expect("failed to connect to Redis");
    let kv = JobKvStore::new(redis_pool.manager());

    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .expect("failed to create scratch directory");

    let ctx = Arc::new(WorkerContext {
        kv,
        worker_id: config.worker_id.clone(),
        scratch_dir: config.scratch_dir.clone(),
        encoder_slots: Arc::new(Semaphore::new(config.max_concurrent_ffmpeg)),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let consumer = BusConsumer::new(&BusConsumerConfig {
        brokers: config.kafka_brokers.clone(),
        topic: "transcode-jobs".to_string(),
        group_id: "transcode-worker-group".to_string(),
    })
    .expect("failed to create bus consumer");

    let mut tasks = JoinSet::new();

    let health_bind_address = format!("0.0.0.0:{}", config.health_port);
    tasks.spawn(async move {
        info!(bind_address = %health_bind_address, "worker health server starting");
        HttpServer::new(|| App::new().route("/healthz", web::get().to(healthz)))
            .bind(&health_bind_address)?
            .run()
            .await
    });

    let consumer_ctx = ctx.clone();
    tasks.spawn(async move {
        consumer
            .run(shutdown_rx, move |task: TranscodeTaskMessage| {
                let ctx = consumer_ctx.clone();
                async move { pipeline::handle(&ctx, task).await }
            })
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    });

    let mut first_error = None;
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "worker task failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                error!(error = %e, "worker task panicked or was aborted");
                if first_error.is_none() {
                    first_error = Some(io::Error::new(io::ErrorKind::Other, e.to_string()));
                }
            }
        }
    }

    info!("Worker stopped");
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
