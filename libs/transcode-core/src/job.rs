//! The job-level state machine (spec.md §4.3) and the static/dynamic KV
//! record shape (spec.md §9 "Hash record with dynamic fields" redesign
//! note): known fields live on a struct, the per-representation progress
//! fields live in a side map keyed by resolution label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Job-level status. Ordered so that `status >= other` can express the
/// monotonicity invariant (spec.md §3 Invariants, §8 "Monotone status").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Waiting,
    Transcoding,
    ReadyForMpd,
    Done,
    Failed,
}

impl JobStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(Self::Waiting),
            "transcoding" => Some(Self::Transcoding),
            "ready_for_mpd" => Some(Self::ReadyForMpd),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Transcoding => "transcoding",
            Self::ReadyForMpd => "ready_for_mpd",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether transitioning from `self` to `next` is a forward (or
    /// no-op) move along the state-machine edges in spec.md §4.3.
    /// `Failed` can be reached from any non-terminal state; every other
    /// transition must not regress the `Waiting < Transcoding <
    /// ReadyForMpd < Done` ordering.
    pub fn can_advance_to(&self, next: Self) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        if next == Self::Failed {
            return true;
        }
        next >= *self
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-representation progress, as stored in the KV record's `<label>`
/// field. Only `"done"` is meaningful to the fan-in predicate; every other
/// value (including absent) means "not yet done".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationState {
    Waiting,
    Processing,
    Done,
    Failed,
}

impl RepresentationState {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(Self::Waiting),
            "processing" => Some(Self::Processing),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RepresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Evaluate the fan-in predicate (spec.md §4.3 step 5): every label in
/// `required_resolutions` must have representation state `"done"`.
///
/// Per spec.md §4.3 Tie-breaks: an empty or absent `required_resolutions`
/// makes the predicate false, never true — a job can't vacuously complete.
pub fn fan_in_satisfied(
    required_resolutions: &[String],
    rep_states: impl Fn(&str) -> Option<RepresentationState>,
) -> bool {
    if required_resolutions.is_empty() {
        return false;
    }
    required_resolutions
        .iter()
        .all(|label| rep_states(label) == Some(RepresentationState::Done))
}

/// Durable job row, mirroring the `transcoding_jobs` table (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobRecord {
    pub job_id: String,
    pub stream_name: String,
    pub input_url: String,
    pub codec: String,
    pub representations: String,
    pub mpd_url: Option<String>,
    pub status: String,
    pub worker_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn status_ordering_follows_state_machine() {
        assert!(JobStatus::Waiting < JobStatus::Transcoding);
        assert!(JobStatus::Transcoding < JobStatus::ReadyForMpd);
        assert!(JobStatus::ReadyForMpd < JobStatus::Done);
    }

    #[test]
    fn can_advance_to_rejects_regression_but_allows_failed_from_anywhere() {
        assert!(JobStatus::Waiting.can_advance_to(JobStatus::Transcoding));
        assert!(!JobStatus::Transcoding.can_advance_to(JobStatus::Waiting));
        assert!(JobStatus::Transcoding.can_advance_to(JobStatus::Failed));
        assert!(JobStatus::Waiting.can_advance_to(JobStatus::Failed));
        assert!(!JobStatus::Done.can_advance_to(JobStatus::Transcoding));
        assert!(JobStatus::Done.can_advance_to(JobStatus::Done));
    }

    #[test]
    fn fan_in_requires_every_required_label_done() {
        let mut states = HashMap::new();
        states.insert("144p".to_string(), RepresentationState::Done);
        states.insert("360p".to_string(), RepresentationState::Processing);

        let required = vec!["144p".to_string(), "360p".to_string()];
        assert!(!fan_in_satisfied(&required, |l| states.get(l).copied()));

        states.insert("360p".to_string(), RepresentationState::Done);
        assert!(fan_in_satisfied(&required, |l| states.get(l).copied()));
    }

    #[test]
    fn fan_in_false_when_required_resolutions_empty() {
        let states: HashMap<String, RepresentationState> = HashMap::new();
        assert!(!fan_in_satisfied(&[], |l| states.get(l).copied()));
    }
}
