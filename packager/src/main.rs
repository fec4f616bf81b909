//! Packager — receives the `ready_for_mpd` trigger, invokes the DASH
//! muxer, finalizes durable metadata (spec.md §4.4). Runs the bus
//! consumer loop and a minimal health-check HTTP server as sibling tasks
//! in a `JoinSet`, mirroring `media-service/src/main.rs`'s dual-server
//! shape and `ThumbnailConsumer`'s `tokio::select!`-against-shutdown
//! consumer loop.

mod config;
mod error;
mod muxer;
mod pipeline;

use actix_web::{web, App, HttpResponse, HttpServer};
use config::Config;
use event_bus::{BusConsumer, BusConsumerConfig};
use job_db::JobRepository;
use kv_store::{JobKvStore, RedisPool};
use pipeline::PackagerContext;
use std::io;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use transcode_core::MpdGenerationMessage;

async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

#[tokio::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("failed to load packager configuration");
    info!(public_host = %config.public_host, "Packager starting");

    let redis_pool = RedisPool::connect(&config.redis_addr)
        .await
        .expect("failed to connect to Redis");
    let kv = JobKvStore::new(redis_pool.manager());

    let db_pool = job_db::create_pool(job_db::DbConfig {
        sqlite_db_path: config.sqlite_db_path.clone(),
        ..Default::default()
    })
    .await
    .expect("failed to open SQLite database");
    let db = JobRepository::new(db_pool);

    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .expect("failed to create scratch directory");

    let ctx = Arc::new(PackagerContext {
        kv,
        db,
        scratch_dir: config.scratch_dir.clone(),
        public_host: config.public_host.clone(),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let consumer = BusConsumer::new(&BusConsumerConfig {
        brokers: config.kafka_brokers.clone(),
        topic: "mpd-generation".to_string(),
        group_id: "mpd-generator".to_string(),
    })
    .expect("failed to create bus consumer");

    let mut tasks = JoinSet::new();

    let health_bind_address = format!("0.0.0.0:{}", config.health_port);
    tasks.spawn(async move {
        info!(bind_address = %health_bind_address, "packager health server starting");
        HttpServer::new(|| App::new().route("/healthz", web::get().to(healthz)))
            .bind(&health_bind_address)?
            .run()
            .await
    });

    let consumer_ctx = ctx.clone();
    tasks.spawn(async move {
        consumer
            .run(shutdown_rx, move |msg: MpdGenerationMessage| {
                let ctx = consumer_ctx.clone();
                async move {
                    if msg.status != "ready_for_mpd" {
                        warn!(job_id = %msg.job_id, status = %msg.status, "ignoring non-trigger message");
                        return;
                    }
                    pipeline::handle_trigger(&ctx, &msg.job_id).await;
                }
            })
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    });

    let mut first_error = None;
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "packager task failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                error!(error = %e, "packager task panicked or was aborted");
                if first_error.is_none() {
                    first_error = Some(io::Error::new(io::ErrorKind::Other, e.to_string()));
                }
            }
        }
    }

    info!("Packager stopped");
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
