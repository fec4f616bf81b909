//! Tracker — fan-in: detects when all representations of a job are
//! complete and emits a single packaging trigger (spec.md §4.3). Runs the
//! 5-second scan loop and the `/job-summary` HTTP server as sibling tasks
//! in a `JoinSet`, per spec.md §9's "cooperative background loop" redesign
//! note and `media-service/src/main.rs`'s dual-server shape.

mod config;
mod error;
mod scan;
mod summary;

use actix_web::{web, App, HttpResponse, HttpServer};
use config::Config;
use event_bus::BusProducer;
use job_db::JobRepository;
use kv_store::{JobKvStore, RedisPool};
use scan::ScanContext;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

struct AppState {
    kv: JobKvStore,
}

async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

async fn job_summary(state: web::Data<AppState>) -> HttpResponse {
    match summary::job_summary(&state.kv).await {
        Ok(counts) => HttpResponse::Ok().json(counts),
        Err(e) => {
            error!(error = %e, "failed to compute job summary");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "failed to compute job summary",
            }))
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("failed to load tracker configuration");
    info!(scan_interval_secs = config.scan_interval_secs, "Tracker starting");

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

    let bus = BusProducer::new(&config.kafka_brokers).expect("failed to create Kafka producer");

    let scan_ctx = Arc::new(ScanContext { kv: kv.clone(), db, bus });

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut tasks = JoinSet::new();

    let scan_interval = Duration::from_secs(config.scan_interval_secs);
    tasks.spawn(async move {
        let mut interval = tokio::time::interval(scan_interval);
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("scan loop shutting down");
                        break;
                    }
                }
                _ = interval.tick() => {
                    scan::scan_once(&scan_ctx).await;
                }
            }
        }
        Ok::<(), io::Error>(())
    });

    let bind_address = format!("{}:{}", config.host, config.port);
    let state = web::Data::new(AppState { kv });
    tasks.spawn(async move {
        info!(bind_address = %bind_address, "Tracker HTTP server starting");
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .route("/healthz", web::get().to(healthz))
                .route("/job-summary", web::get().to(job_summary))
        })
        .bind(&bind_address)?
        .run()
        .await
    });

    let mut first_error = None;
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "tracker task failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                error!(error = %e, "tracker task panicked or was aborted");
                if first_error.is_none() {
                    first_error = Some(io::Error::new(io::ErrorKind::Other, e.to_string()));
                }
            }
        }
    }

    info!("Tracker stopped");
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
