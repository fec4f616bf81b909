//! Read/write access to the `job:<job_id>` hash record (spec.md §3, §9
//! "Hash record with dynamic fields"). Static fields (`stream_name`,
//! `input_url`, `codec`, `required_resolutions`, `status`,
//! `mpd_published`) sit alongside one dynamic field per resolution label
//! holding that representation's `RepresentationState`.

use crate::pool::{with_timeout, SharedConnectionManager};
use redis::AsyncCommands;
use std::collections::HashMap;
use transcode_core::{JobStatus, RepresentationState};

/// TTL refreshed on every write to a job's hash (spec.md §9: KV records are
/// not meant to live forever; a walked-away job should eventually expire).
pub const JOB_TTL_SECS: i64 = 3600;

const KEY_PREFIX: &str = "job:";
const FIELD_STREAM_NAME: &str = "stream_name";
const FIELD_INPUT_URL: &str = "input_url";
const FIELD_CODEC: &str = "codec";
const FIELD_REQUIRED_RESOLUTIONS: &str = "required_resolutions";
const FIELD_STATUS: &str = "status";
const FIELD_MPD_PUBLISHED: &str = "mpd_published";
const FIELD_WORKER_ID: &str = "worker_id";
const FIELD_STARTED_AT: &str = "started_at";

pub fn job_key(job_id: &str) -> String {
    format!("{KEY_PREFIX}{job_id}")
}

/// Hash field holding a representation's encoded-output path, e.g.
/// `144p_output` for label `144p` (spec.md §3 "dynamic fields").
pub fn output_field(label: &str) -> String {
    format!("{label}_output")
}

#[derive(Debug, Clone)]
pub struct JobKvStore {
    manager: SharedConnectionManager,
}

impl JobKvStore {
    pub fn new(manager: SharedConnectionManager) -> Self {
        Self { manager }
    }

    /// Controller's admission write (spec.md §4.1 step 3): the job's static
    /// metadata plus its required-resolutions list, joined the way
    /// `transcoding-controller/redis.go::StoreJobMetadata` does.
    pub async fn create_job(
        &self,
        job_id: &str,
        stream_name: &str,
        input_url: &str,
        codec: &str,
        required_resolutions: &[String],
    ) -> redis::RedisResult<()> {
        let key = job_key(job_id);
        let joined = required_resolutions.join(",");
        let mut conn = self.manager.lock().await;
        with_timeout(async {
            conn.hset_multiple::<_, _, _, ()>(
                &key,
                &[
                    (FIELD_STREAM_NAME, stream_name),
                    (FIELD_INPUT_URL, input_url),
                    (FIELD_CODEC, codec),
                    (FIELD_REQUIRED_RESOLUTIONS, joined.as_str()),
                    (FIELD_STATUS, JobStatus::Waiting.as_str()),
                ],
            )
            .await
        })
        .await?;
        with_timeout(conn.expire::<_, ()>(&key, JOB_TTL_SECS)).await
    }

    /// Worker's per-representation progress write (spec.md §4.2 step 7).
    pub async fn set_representation_state(
        &self,
        job_id: &str,
        label: &str,
        state: RepresentationState,
    ) -> redis::RedisResult<()> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        with_timeout(conn.hset::<_, _, _, ()>(&key, label, state.as_str())).await?;
        with_timeout(conn.expire::<_, ()>(&key, JOB_TTL_SECS)).await
    }

    /// Worker pipeline step 1 (spec.md §4.2): claim the job for this
    /// worker before acquiring an encoder slot.
    pub async fn claim_for_worker(&self, job_id: &str, worker_id: &str) -> redis::RedisResult<()> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        with_timeout(conn.hset_multiple::<_, _, _, ()>(
            &key,
            &[
                (FIELD_STATUS, JobStatus::Waiting.as_str()),
                (FIELD_WORKER_ID, worker_id),
            ],
        ))
        .await
    }

    /// Worker pipeline step 3 (spec.md §4.2): mark the representation as
    /// actively encoding and echo the codec, so a packager reading the hash
    /// later sees it even if the Controller's own write raced this one.
    pub async fn mark_representation_processing(
        &self,
        job_id: &str,
        label: &str,
        codec: &str,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> redis::RedisResult<()> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        with_timeout(conn.hset_multiple::<_, _, _, ()>(
            &key,
            &[
                (FIELD_STATUS, JobStatus::Transcoding.as_str()),
                (FIELD_CODEC, codec),
                (FIELD_STARTED_AT, started_at.to_rfc3339().as_str()),
            ],
        ))
        .await?;
        with_timeout(conn.hset::<_, _, _, ()>(&key, label, RepresentationState::Processing.as_str()))
            .await
    }

    /// Worker pipeline step 7 (spec.md §4.2): atomically record a
    /// representation's completion and its encoded-output path, then
    /// refresh the TTL.
    pub async fn mark_representation_done(
        &self,
        job_id: &str,
        label: &str,
        output_path: &str,
    ) -> redis::RedisResult<()> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        with_timeout(conn.hset_multiple::<_, _, _, ()>(
            &key,
            &[
                (label, RepresentationState::Done.as_str()),
                (output_field(label).as_str(), output_path),
            ],
        ))
        .await?;
        with_timeout(conn.expire::<_, ()>(&key, JOB_TTL_SECS)).await
    }

    /// Worker pipeline steps 4/6 (spec.md §4.2): mark the representation
    /// and the job as failed on download/encode error.
    pub async fn mark_representation_failed(
        &self,
        job_id: &str,
        label: &str,
    ) -> redis::RedisResult<()> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        with_timeout(conn.hset_multiple::<_, _, _, ()>(
            &key,
            &[
                (label, RepresentationState::Failed.as_str()),
                (FIELD_STATUS, JobStatus::Failed.as_str()),
            ],
        ))
        .await
    }

    /// Whole-hash read used by the Tracker's scan loop and by safe-upsert
    /// into the durable store.
    pub async fn get_job_hash(
        &self,
        job_id: &str,
    ) -> redis::RedisResult<Option<HashMap<String, String>>> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        let hash: HashMap<String, String> = with_timeout(conn.hgetall(&key)).await?;
        Ok(if hash.is_empty() { None } else { Some(hash) })
    }

    pub async fn set_status(&self, job_id: &str, status: JobStatus) -> redis::RedisResult<()> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        with_timeout(conn.hset::<_, _, _, ()>(&key, FIELD_STATUS, status.as_str())).await
    }

    /// Atomically flip the single-publication guard (spec.md §4.3, the
    /// `mpd_published` correctness property). `HSETNX` only sets a field
    /// that doesn't already exist and reports whether it did — exactly the
    /// compare-and-set this needs to record, once, that the trigger went
    /// out. Callers must invoke this only after `publish_mpd_generation`
    /// has already succeeded, never before: the guard records that a
    /// publish happened, it doesn't gate whether one is allowed to.
    ///
    /// Returns `true` if this call is the one that flipped the guard,
    /// `false` if it had already been set by an earlier call.
    pub async fn try_mark_mpd_published(&self, job_id: &str) -> redis::RedisResult<bool> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        let set: bool = with_timeout(conn.hset_nx(&key, FIELD_MPD_PUBLISHED, "true")).await?;
        if set {
            with_timeout(conn.hset::<_, _, _, ()>(
                &key,
                FIELD_STATUS,
                JobStatus::ReadyForMpd.as_str(),
            ))
            .await?;
        }
        Ok(set)
    }

    /// Enumerate every live job hash (spec.md §4.3 step 1). Mirrors
    /// `tracker/main.go::checkCompletedJobs`'s `redisClient.Keys(ctx,
    /// "job:*")` scan. `KEYS` is O(N) over the keyspace; acceptable at this
    /// job volume, documented in DESIGN.md rather than swapped for a
    /// cursor-based `SCAN` the original doesn't use either.
    pub async fn scan_job_ids(&self) -> redis::RedisResult<Vec<String>> {
        let mut conn = self.manager.lock().await;
        let keys: Vec<String> = with_timeout(conn.keys(format!("{KEY_PREFIX}*"))).await?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(KEY_PREFIX).map(str::to_string))
            .collect())
    }

    pub async fn delete_job(&self, job_id: &str) -> redis::RedisResult<()> {
        let key = job_key(job_id);
        let mut conn = self.manager.lock().await;
        with_timeout(conn.del::<_, ()>(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_key_has_expected_prefix() {
        assert_eq!(job_key("abc-123"), "job:abc-123");
    }

    #[test]
    fn scan_strips_prefix_consistently_with_job_key() {
        let key = job_key("xyz");
        assert_eq!(key.strip_prefix(KEY_PREFIX), Some("xyz"));
    }
}
