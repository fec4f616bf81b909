//! Configuration, shaped like `media-service::config::Config`: a typed
//! struct tree loaded once from the environment at startup.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub redis_addr: String,
    pub kafka: KafkaConfig,
    pub sqlite_db_path: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct KafkaConfig {
    pub brokers: String,
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

        let brokers = std::env::var("KAFKA_BROKERS")
            .or_else(|_| std::env::var("KAFKA_BROKER"))
            .unwrap_or_else(|_| "localhost:9092".to_string());

        let sqlite_db_path = std::env::var("SQLITE_DB_PATH")
            .map_err(|_| "SQLITE_DB_PATH environment variable not set".to_string())?;

        Ok(Self {
            app: AppConfig {
                host: std::env::var("CONTROLLER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("CONTROLLER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(8080),
            },
            redis_addr,
            kafka: KafkaConfig { brokers },
            sqlite_db_path,
        })
    }
}
