pub mod job_record;
pub mod pool;

pub use job_record::{job_key, JobKvStore, JOB_TTL_SECS};
pub use pool::{with_timeout, KeepaliveConfig, RedisPool, SharedConnectionManager};
