//! Worker error kinds (spec.md §7: `DownloadError`, `EncodeError`).

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("download failed: {0}")]
    DownloadError(String),
    #[error("encode failed: {0}")]
    EncodeError(String),
    #[error("kv error: {0}")]
    KvError(#[from] redis::RedisError),
    #[error("bus error: {0}")]
    BusError(#[from] anyhow::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
