//! Controller — admits transcode requests and fans out per-representation
//! tasks (spec.md §4.1). HTTP-server-plus-background-substrate shape
//! modeled on `media-service/src/main.rs`, minus the gRPC half this
//! system's spec doesn't call for.

mod admission;
mod config;
mod error;
mod handlers;

use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use config::Config;
use event_bus::BusProducer;
use job_db::JobRepository;
use kv_store::{JobKvStore, RedisPool};
use std::io;
use tracing::info;

pub struct AppState {
    pub kv: JobKvStore,
    pub db: JobRepository,
    pub bus: BusProducer,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("failed to load controller configuration");

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

    let bus = BusProducer::new(&config.kafka.brokers).expect("failed to create Kafka producer");

    let state = web::Data::new(AppState { kv, db, bus });
    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!(bind_address = %bind_address, "Controller starting HTTP server");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(actix_middleware::Logger::default())
            .route("/", web::get().to(handlers::root))
            .route("/healthz", web::get().to(handlers::healthz))
            .route("/transcode", web::post().to(handlers::transcode))
            .route("/jobs", web::get().to(handlers::list_jobs))
    })
    .bind(&bind_address)?
    .run()
    .await
}
