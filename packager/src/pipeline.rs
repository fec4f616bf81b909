//! The `package(job_id)` operation (spec.md §4.4): read job metadata from
//! KV, verify every per-representation segment file exists, invoke the
//! DASH muxer, and commit the terminal DB state.

use crate::error::PackagerError;
use crate::muxer::run_muxer;
use job_db::JobRepository;
use kv_store::JobKvStore;
use std::path::Path;
use tracing::{error, info};
use transcode_core::dash::{build_muxer_args, DashProfile, MuxParams};
use transcode_core::Codec;

pub struct PackagerContext {
    pub kv: JobKvStore,
    pub db: JobRepository,
    pub scratch_dir: String,
    pub public_host: String,
}

pub fn segment_path(scratch_dir: &str, job_id: &str, label: &str) -> String {
    format!("{scratch_dir}/{job_id}_{label}.mp4")
}

pub fn manifest_dir(scratch_dir: &str, job_id: &str) -> String {
    format!("{scratch_dir}/{job_id}")
}

pub fn manifest_path(scratch_dir: &str, job_id: &str) -> String {
    format!("{}/manifest.mpd", manifest_dir(scratch_dir, job_id))
}

pub fn public_mpd_url(public_host: &str, job_id: &str) -> String {
    format!("{public_host}/{job_id}/manifest.mpd")
}

/// Drive one `ready_for_mpd` trigger to completion. Every error variant is
/// a log-and-drop per spec.md §7 — the caller never retries, since the
/// tracker's `mpd_published` guard means it never refires for this job.
pub async fn package(ctx: &PackagerContext, job_id: &str) -> Result<(), PackagerError> {
    // Step 1: read codec and required_resolutions.
    let hash = ctx
        .kv
        .get_job_hash(job_id)
        .await?
        .ok_or_else(|| PackagerError::MissingMetadata(job_id.to_string()))?;

    let codec_label = hash
        .get("codec")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PackagerError::MissingMetadata(job_id.to_string()))?;
    let required = hash
        .get("required_resolutions")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PackagerError::MissingMetadata(job_id.to_string()))?;
    let labels: Vec<String> = required
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return Err(PackagerError::MissingMetadata(job_id.to_string()));
    }

    // Step 2: verify every segment file exists.
    let mut segment_inputs = Vec::with_capacity(labels.len());
    for label in &labels {
        let path = segment_path(&ctx.scratch_dir, job_id, label);
        if !Path::new(&path).exists() {
            return Err(PackagerError::MissingSegment(path));
        }
        segment_inputs.push(path);
    }

    // Step 3: construct the muxer argument vector.
    let (profile, codec_was_unknown) = DashProfile::for_codec(Codec::parse(codec_label));
    if codec_was_unknown {
        tracing::warn!(job_id = %job_id, codec = %codec_label, "unrecognized codec, falling back to dashavc264:live profile");
    }

    let output_dir = manifest_dir(&ctx.scratch_dir, job_id);
    tokio::fs::create_dir_all(&output_dir).await?;

    let output_path = manifest_path(&ctx.scratch_dir, job_id);
    let params = MuxParams {
        job_id: job_id.to_string(),
        output_path: output_path.clone(),
        segment_inputs,
        profile,
    };
    let args = build_muxer_args(&params);

    // Step 4: invoke the muxer.
    run_muxer(&args).await?;

    // Step 5: finalize durable metadata. mpd_url and status land in one
    // statement — see complete_job's doc comment for why.
    let mpd_url = public_mpd_url(&ctx.public_host, job_id);
    ctx.db.complete_job(job_id, &mpd_url).await?;

    info!(job_id = %job_id, mpd_url = %mpd_url, "packaging complete");
    Ok(())
}

/// Entry point for the `mpd-generation` consumer handler: runs `package`
/// and logs-and-drops any error, matching spec.md §7's policy table (no
/// variant here is retried by the packager itself).
pub async fn handle_trigger(ctx: &PackagerContext, job_id: &str) {
    if let Err(e) = package(ctx, job_id).await {
        error!(job_id = %job_id, error = %e, "packaging failed, dropping trigger");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_path_matches_worker_output_convention() {
        assert_eq!(
            segment_path("/segments", "job-1", "720p"),
            "/segments/job-1_720p.mp4"
        );
    }

    #[test]
    fn manifest_path_is_under_job_directory() {
        assert_eq!(
            manifest_path("/segments", "job-1"),
            "/segments/job-1/manifest.mpd"
        );
    }

    #[test]
    fn public_mpd_url_joins_host_and_job_path() {
        assert_eq!(
            public_mpd_url("https://cdn.example.com", "job-1"),
            "https://cdn.example.com/job-1/manifest.mpd"
        );
    }
}
