//! Tracker scan-loop body (spec.md §4.3): one tick over every live KV job
//! hash, driving the job-level state machine and the fan-in-to-packaging
//! trigger. Grounded in `examples/original_source/tracker/main.go`'s
//! `checkCompletedJobs`, generalized from a fixed `requiredReps` list and
//! hard delete-on-complete into the spec's KV-driven `required_resolutions`
//! and `mpd_published` single-publication guard.

use crate::error::TrackerError;
use event_bus::BusProducer;
use job_db::{JobFields, JobRepository};
use kv_store::JobKvStore;
use std::collections::HashMap;
use tracing::{info, warn};
use transcode_core::{fan_in_satisfied, JobStatus, MpdGenerationMessage, RepresentationState};

pub struct ScanContext {
    pub kv: JobKvStore,
    pub db: JobRepository,
    pub bus: BusProducer,
}

const FIELD_REQUIRED_RESOLUTIONS: &str = "required_resolutions";
const FIELD_MPD_PUBLISHED: &str = "mpd_published";
const FIELD_STATUS: &str = "status";

/// Split the KV record's comma-joined `required_resolutions` field. An
/// absent or empty field yields an empty list, which makes the fan-in
/// predicate false per spec.md §4.3 Tie-breaks.
pub fn required_resolutions(hash: &HashMap<String, String>) -> Vec<String> {
    hash.get(FIELD_REQUIRED_RESOLUTIONS)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn representation_state(hash: &HashMap<String, String>, label: &str) -> Option<RepresentationState> {
    hash.get(label).and_then(|v| RepresentationState::parse(v))
}

/// Whether any required-resolution field in the hash currently reads
/// `"processing"` (spec.md §4.3 step 4's `waiting -> transcoding` trigger).
fn any_representation_processing(hash: &HashMap<String, String>, required: &[String]) -> bool {
    required
        .iter()
        .any(|label| representation_state(hash, label) == Some(RepresentationState::Processing))
}

fn db_fields_from_hash(hash: &HashMap<String, String>) -> JobFields {
    JobFields {
        stream_name: hash.get("stream_name").filter(|s| !s.is_empty()).cloned(),
        input_url: hash.get("input_url").filter(|s| !s.is_empty()).cloned(),
        codec: hash.get("codec").filter(|s| !s.is_empty()).cloned(),
        representations: hash
            .get(FIELD_REQUIRED_RESOLUTIONS)
            .filter(|s| !s.is_empty())
            .cloned(),
        worker_id: hash.get("worker_id").filter(|s| !s.is_empty()).cloned(),
        status: hash.get(FIELD_STATUS).filter(|s| !s.is_empty()).cloned(),
    }
}

/// One tick of the scan loop: enumerate every `job:*` key and process each.
/// Individual job failures are logged and don't abort the tick (spec.md §7
/// `KVTransientError`/`BusTransientError`: log, continue).
pub async fn scan_once(ctx: &ScanContext) {
    let job_ids = match ctx.kv.scan_job_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            warn!(error = %e, "failed to scan job keys, will retry next tick");
            return;
        }
    };

    for job_id in job_ids {
        if let Err(e) = process_job(ctx, &job_id).await {
            warn!(job_id = %job_id, error = %e, "error processing job during scan tick");
        }
    }
}

async fn process_job(ctx: &ScanContext, job_id: &str) -> Result<(), TrackerError> {
    let hash = match ctx.kv.get_job_hash(job_id).await? {
        Some(hash) => hash,
        None => return Ok(()),
    };

    // Step 2: mpd_published is the single-publication guard. Once set,
    // this job is done being tracked.
    if hash.get(FIELD_MPD_PUBLISHED).map(String::as_str) == Some("true") {
        return Ok(());
    }

    // Step 3: safe-upsert the durable row from whatever the KV snapshot has.
    ctx.db.safe_upsert(job_id, &db_fields_from_hash(&hash)).await?;

    let required = required_resolutions(&hash);
    let current_status = hash
        .get(FIELD_STATUS)
        .and_then(|s| JobStatus::parse(s))
        .unwrap_or(JobStatus::Waiting);

    // Step 4: waiting -> transcoding promotion.
    if current_status == JobStatus::Waiting && any_representation_processing(&hash, &required) {
        ctx.kv.set_status(job_id, JobStatus::Transcoding).await?;
        ctx.db.update_status(job_id, JobStatus::Transcoding.as_str()).await?;
        info!(job_id = %job_id, "promoted waiting -> transcoding");
    }

    // Step 5: fan-in predicate. Publish happens first; the guard is only
    // flipped once the publish has actually gone out. If the publish
    // errors, `?` propagates out of this call and the job is left exactly
    // as it was — no guard set, so the next tick re-evaluates the
    // predicate and retries. Flipping the guard before the publish would
    // mean a failed send loses the trigger forever, since step 2 would
    // then skip the job on every future tick.
    if fan_in_satisfied(&required, |label| representation_state(&hash, label)) {
        ctx.bus
            .publish_mpd_generation(&MpdGenerationMessage::ready_for_mpd(job_id))
            .await?;
        let flipped = ctx.kv.try_mark_mpd_published(job_id).await?;
        if flipped {
            ctx.db
                .update_status(job_id, JobStatus::ReadyForMpd.as_str())
                .await?;
            info!(job_id = %job_id, "fan-in satisfied, published ready_for_mpd");
        } else {
            warn!(
                job_id = %job_id,
                "published ready_for_mpd but mpd_published was already set by a racing scan tick"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_with(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn required_resolutions_splits_comma_joined_field() {
        let hash = hash_with(&[("required_resolutions", "144p,360p,720p")]);
        assert_eq!(
            required_resolutions(&hash),
            vec!["144p".to_string(), "360p".to_string(), "720p".to_string()]
        );
    }

    #[test]
    fn required_resolutions_empty_when_field_absent() {
        let hash = hash_with(&[]);
        assert!(required_resolutions(&hash).is_empty());
    }

    #[test]
    fn any_representation_processing_detects_trigger() {
        let required = vec!["144p".to_string(), "360p".to_string()];
        let hash = hash_with(&[("144p", "processing")]);
        assert!(any_representation_processing(&hash, &required));

        let hash = hash_with(&[("144p", "waiting")]);
        assert!(!any_representation_processing(&hash, &required));
    }

    #[test]
    fn db_fields_from_hash_drops_empty_values() {
        let hash = hash_with(&[("stream_name", ""), ("codec", "h264")]);
        let fields = db_fields_from_hash(&hash);
        assert!(fields.stream_name.is_none());
        assert_eq!(fields.codec.as_deref(), Some("h264"));
    }
}
