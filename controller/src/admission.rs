//! Core `submit()` operation (spec.md §4.1): validate a transcode request,
//! assign identity, write the KV/DB records, and fan out one message per
//! requested representation onto `transcode-jobs`.

use crate::error::{AppError, Result};
use job_db::{JobFields, JobRepository};
use kv_store::JobKvStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use transcode_core::{Codec, Resolution, TranscodeTaskMessage};
use uuid::Uuid;

const DEFAULT_GOP_SIZE: u32 = 48;
const DEFAULT_KEYINT_MIN: u32 = 48;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub stream_name: String,
    pub input_url: String,
    pub codec: String,
    pub resolutions: Vec<String>,
    pub gop_size: Option<u32>,
    pub keyint_min: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub status: &'static str,
}

pub struct AdmissionContext<'a> {
    pub kv: &'a JobKvStore,
    pub db: &'a JobRepository,
    pub bus: &'a event_bus::BusProducer,
}

/// Validate, admit, and fan out a transcode request.
pub async fn submit(ctx: &AdmissionContext<'_>, req: SubmitRequest) -> Result<SubmitResponse> {
    if req.stream_name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "stream_name must not be empty".into(),
        ));
    }
    if req.input_url.trim().is_empty() {
        return Err(AppError::ValidationError(
            "input_url must not be empty".into(),
        ));
    }
    let codec = Codec::parse(&req.codec).ok_or_else(|| {
        AppError::ValidationError(format!("unsupported codec '{}'", req.codec))
    })?;
    if req.resolutions.is_empty() {
        return Err(AppError::ValidationError(
            "resolutions must not be empty".into(),
        ));
    }

    // Tie-break (spec.md §4.1): unsupported labels are skipped with a
    // warning, not rejected — but only the surviving labels are written to
    // the KV record, so the tracker's fan-in predicate stays consistent.
    let mut valid_resolutions = Vec::new();
    for label in &req.resolutions {
        match Resolution::parse(label) {
            Some(res) => valid_resolutions.push(res),
            None => warn!(label = %label, "unsupported resolution label, skipping"),
        }
    }
    if valid_resolutions.is_empty() {
        return Err(AppError::ValidationError(
            "no valid resolution labels in request".into(),
        ));
    }

    let gop_size = req.gop_size.unwrap_or(DEFAULT_GOP_SIZE);
    let keyint_min = req.keyint_min.unwrap_or(DEFAULT_KEYINT_MIN);

    let job_id = Uuid::new_v4().to_string();
    let required_labels: Vec<String> = valid_resolutions.iter().map(|r| r.label().to_string()).collect();

    ctx.kv
        .create_job(
            &job_id,
            &req.stream_name,
            &req.input_url,
            codec.label(),
            &required_labels,
        )
        .await?;

    ctx.db
        .upsert_job(
            &job_id,
            &JobFields {
                stream_name: Some(req.stream_name.clone()),
                input_url: Some(req.input_url.clone()),
                codec: Some(codec.label().to_string()),
                representations: Some(required_labels.join(",")),
                worker_id: None,
                status: Some("waiting".to_string()),
            },
        )
        .await?;

    for resolution in &valid_resolutions {
        let profile = resolution.profile();
        let msg = TranscodeTaskMessage {
            job_id: job_id.clone(),
            input_url: req.input_url.clone(),
            representation: resolution.label().to_string(),
            resolution: profile.size.clone(),
            bitrate: profile.bitrate.clone(),
            codec: codec.label().to_string(),
            gop_size,
            keyint_min,
        };
        ctx.bus.publish_transcode_task(&msg).await?;
    }

    info!(
        job_id = %job_id,
        stream_name = %req.stream_name,
        representations = required_labels.len(),
        "job admitted and fanned out"
    );

    Ok(SubmitResponse {
        job_id,
        status: "submitted",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codec_is_not_parsed() {
        assert!(Codec::parse("xyz").is_none());
    }

    #[test]
    fn unknown_resolution_label_is_not_parsed() {
        assert!(Resolution::parse("2160p").is_none());
    }
}
