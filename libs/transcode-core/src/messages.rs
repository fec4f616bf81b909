//! Wire schemas for the two bus topics (spec.md §6): `transcode-jobs`
//! (Controller -> Worker) and `mpd-generation` (Tracker -> Packager). Both
//! are partition-keyed by `job_id`.

use serde::{Deserialize, Serialize};

/// One per-representation task published on `transcode-jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeTaskMessage {
    pub job_id: String,
    pub input_url: String,
    pub representation: String,
    pub resolution: String,
    pub bitrate: String,
    pub codec: String,
    pub gop_size: u32,
    pub keyint_min: u32,
}

/// The single packaging trigger published on `mpd-generation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpdGenerationMessage {
    pub job_id: String,
    pub status: String,
}

impl MpdGenerationMessage {
    pub fn ready_for_mpd(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: "ready_for_mpd".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcode_task_round_trips_through_json() {
        let msg = TranscodeTaskMessage {
            job_id: "job-1".to_string(),
            input_url: "http://src/a.mp4".to_string(),
            representation: "720p".to_string(),
            resolution: "1280x720".to_string(),
            bitrate: "2500k".to_string(),
            codec: "h264".to_string(),
            gop_size: 48,
            keyint_min: 48,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: TranscodeTaskMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.job_id, "job-1");
        assert_eq!(back.representation, "720p");
    }

    #[test]
    fn mpd_generation_message_has_ready_for_mpd_status() {
        let msg = MpdGenerationMessage::ready_for_mpd("job-2");
        assert_eq!(msg.job_id, "job-2");
        assert_eq!(msg.status, "ready_for_mpd");
    }
}
