//! Configuration, shaped like `media-service::config::Config`.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub redis_addr: String,
    pub kafka_brokers: String,
    pub sqlite_db_path: String,
    pub scratch_dir: String,
    /// Public host prefix used to build `mpd_url` (spec.md §4.4, §6).
    pub public_host: String,
    pub health_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let redis_addr = std::env::var("REDIS_ADDR")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let redis_addr = if redis_addr.starts_with("redis://") || redis_addr.starts_with("rediss://")
        {
            redis_addr
        } else {
            format!("redis://{redis_addr}")
        };

        let sqlite_db_path = std::env::var("SQLITE_DB_PATH")
            .map_err(|_| "SQLITE_DB_PATH environment variable not set".to_string())?;

        let public_host = std::env::var("PUBLIC_HOST")
            .map_err(|_| "PUBLIC_HOST environment variable not set".to_string())?;

        Ok(Self {
            redis_addr,
            kafka_brokers: std::env::var("KAFKA_BROKERS")
                .or_else(|_| std::env::var("KAFKA_BROKER"))
                .unwrap_or_else(|_| "localhost:9092".to_string()),
            sqlite_db_path,
            scratch_dir: std::env::var("SCRATCH_DIR").unwrap_or_else(|_| "/segments".to_string()),
            public_host: public_host.trim_end_matches('/').to_string(),
            health_port: std::env::var("PACKAGER_HEALTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8082),
        })
    }
}
