//! Tracker error kinds (spec.md §7: `BusTransientError`, `KVTransientError`
//! apply here; both are log-and-continue, never fatal to the scan loop).

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("kv error: {0}")]
    Kv(#[from] redis::RedisError),
    #[error("db error: {0}")]
    Db(#[from] job_db::JobDbError),
    #[error("bus error: {0}")]
    Bus(#[from] anyhow::Error),
}
