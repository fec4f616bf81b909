use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub worker_id: String,
    pub redis_addr: String,
    pub kafka_brokers: String,
    pub scratch_dir: String,
    pub max_concurrent_ffmpeg: usize,
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

        Ok(Self {
            worker_id: std::env::var("WORKER_INSTANCE_ID")
                .unwrap_or_else(|_| format!("worker-{}", uuid::Uuid::new_v4())),
            redis_addr,
            kafka_brokers: std::env::var("KAFKA_BROKERS")
                .or_else(|_| std::env::var("KAFKA_BROKER"))
                .unwrap_or_else(|_| "localhost:9092".to_string()),
            scratch_dir: std::env::var("SCRATCH_DIR").unwrap_or_else(|_| "/segments".to_string()),
            // Spec.md §9 Open Question 1: contradictory source values (2 vs 4);
            // treated as configurable, default 2.
            max_concurrent_ffmpeg: std::env::var("MAX_CONCURRENT_FFMPEG")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            health_port: std::env::var("WORKER_HEALTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8081),
        })
    }
}
