//! Packager error kinds (spec.md §7: `MissingMetadata`, `MissingSegment`,
//! `PackageError` — all log-and-drop, no retry).

#[derive(Debug, thiserror::Error)]
pub enum PackagerError {
    #[error("missing metadata for job {0}")]
    MissingMetadata(String),
    #[error("missing segment file: {0}")]
    MissingSegment(String),
    #[error("muxer invocation failed: {0}")]
    PackageError(String),
    #[error("kv error: {0}")]
    Kv(#[from] redis::RedisError),
    #[error("db error: {0}")]
    Db(#[from] job_db::JobDbError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
