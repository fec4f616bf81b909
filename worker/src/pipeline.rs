//! The worker pipeline (spec.md §4.2): acquire → download → encode →
//! publish-progress, gated by a bounded-concurrency semaphore.

use crate::download::download_input;
use crate::encoder::run_encoder;
use chrono::Utc;
use kv_store::JobKvStore;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use transcode_core::{Codec, EncodeParams, EncoderArgs};

#[derive(Clone)]
pub struct WorkerContext {
    pub kv: JobKvStore,
    pub worker_id: String,
    pub scratch_dir: String,
    /// Counting semaphore of capacity `MaxConcurrentFFmpeg` (spec.md §4.2).
    /// Acquired before work, released on every exit path via RAII drop.
    pub encoder_slots: Arc<Semaphore>,
}

/// Run the full per-representation pipeline for one `transcode-jobs`
/// message. Errors are handled internally (logged, job marked failed) —
/// this never propagates a retryable error back to the caller, matching
/// spec.md §4.2's "no automatic retry within the worker" failure semantics.
pub async fn handle(ctx: &WorkerContext, task: transcode_core::TranscodeTaskMessage) {
    let job_id = task.job_id.clone();
    let label = task.representation.clone();

    // Step 1: claim the job for this worker, before acquiring a slot.
    if let Err(e) = ctx.kv.claim_for_worker(&job_id, &ctx.worker_id).await {
        error!(job_id = %job_id, error = %e, "failed to claim job in KV, continuing anyway");
    }

    // Step 2: acquire an encoder slot. May suspend indefinitely.
    let _permit = match ctx.encoder_slots.clone().acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            error!(job_id = %job_id, "encoder semaphore closed, dropping task");
            return;
        }
    };

    let (codec, codec_was_unknown) = Codec::parse_or_h264(&task.codec);
    if codec_was_unknown {
        warn!(job_id = %job_id, codec = %task.codec, "unknown codec, falling back to h264");
    }

    // Step 3: mark processing, echo codec.
    if let Err(e) = ctx
        .kv
        .mark_representation_processing(&job_id, &label, codec.label(), Utc::now())
        .await
    {
        error!(job_id = %job_id, error = %e, "failed to mark representation processing");
    }

    // Step 4: download input.
    let input_path = match download_input(&task.input_url, &ctx.scratch_dir, &job_id).await {
        Ok(path) => path,
        Err(e) => {
            error!(job_id = %job_id, representation = %label, error = %e, "download failed");
            mark_failed(ctx, &job_id, &label).await;
            return;
        }
    };

    // Step 5: build and run the encoder.
    let output_path = format!("{}/{}_{}.mp4", ctx.scratch_dir, job_id, label);
    let params = EncodeParams {
        input_path: input_path.to_string_lossy().to_string(),
        output_path: output_path.clone(),
        resolution: task.resolution.clone(),
        bitrate: task.bitrate.clone(),
        codec,
        gop_size: task.gop_size,
        keyint_min: task.keyint_min,
    };
    let args = EncoderArgs::build(&params);

    // Step 6: handle encoder failure.
    if let Err(e) = run_encoder(&args).await {
        error!(job_id = %job_id, representation = %label, error = %e, "encode failed");
        mark_failed(ctx, &job_id, &label).await;
        cleanup_input(&input_path).await;
        return;
    }

    // Step 7: atomically record completion.
    if let Err(e) = ctx
        .kv
        .mark_representation_done(&job_id, &label, &output_path)
        .await
    {
        error!(job_id = %job_id, representation = %label, error = %e, "failed to record completion");
    } else {
        info!(job_id = %job_id, representation = %label, output = %output_path, "representation encoded");
    }

    // Step 8: clean up the transient input; slot released on drop below.
    cleanup_input(&input_path).await;
}

async fn mark_failed(ctx: &WorkerContext, job_id: &str, label: &str) {
    if let Err(e) = ctx.kv.mark_representation_failed(job_id, label).await {
        error!(job_id = %job_id, error = %e, "failed to record representation failure");
    }
}

async fn cleanup_input(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = ?path, error = %e, "failed to remove transient input file");
        }
    }
}
