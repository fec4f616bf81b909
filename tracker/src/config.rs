//! Configuration, shaped like `media-service::config::Config`.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub redis_addr: String,
    pub kafka_brokers: String,
    pub sqlite_db_path: String,
    pub scan_interval_secs: u64,
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

        Ok(Self {
            host: std::env::var("TRACKER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("TRACKER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(9000),
            redis_addr,
            kafka_brokers: std::env::var("KAFKA_BROKERS")
                .or_else(|_| std::env::var("KAFKA_BROKER"))
                .unwrap_or_else(|_| "localhost:9092".to_string()),
            sqlite_db_path,
            // spec.md §4.3: scan loop runs every 5 seconds.
            scan_interval_secs: std::env::var("TRACKER_SCAN_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        })
    }
}
