//! `GET /job-summary` (spec.md §4.3, §6): a count-by-status aggregation
//! across live KV records.

use kv_store::JobKvStore;
use std::collections::HashMap;

/// Status names guaranteed to be present in the response, even at zero,
/// per spec.md §4.3 ("keys at least {waiting, transcoding, processing,
/// done, failed, ready_for_mpd}").
const KNOWN_STATUSES: &[&str] = &[
    "waiting",
    "transcoding",
    "processing",
    "done",
    "failed",
    "ready_for_mpd",
];

pub async fn job_summary(kv: &JobKvStore) -> redis::RedisResult<HashMap<String, u64>> {
    let mut counts: HashMap<String, u64> =
        KNOWN_STATUSES.iter().map(|s| (s.to_string(), 0)).collect();

    for job_id in kv.scan_job_ids().await? {
        let Some(hash) = kv.get_job_hash(&job_id).await? else {
            continue;
        };
        let status = hash
            .get("status")
            .cloned()
            .unwrap_or_else(|| "waiting".to_string());
        *counts.entry(status).or_insert(0) += 1;
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_cover_spec_minimum_set() {
        for expected in ["waiting", "transcoding", "processing", "done", "failed", "ready_for_mpd"] {
            assert!(KNOWN_STATUSES.contains(&expected));
        }
    }
}
