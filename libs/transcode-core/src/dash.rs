//! DASH muxer profile selection and argument construction (spec.md §4.4),
//! grounded in `examples/original_source/mpd-generator/main.go`'s
//! `exec.Command("MP4Box", "-dash", "4000", "-rap", "-frag-rap", "-profile",
//! "dashavc264:live", ...)` invocation, generalized to per-codec profile
//! selection per spec.md §9 Open Question 2 (latest revision: no explicit
//! profile for HEVC/VVC).

use crate::codec::Codec;

/// The DASH conformance profile MP4Box should mux to, or `None` to let the
/// muxer autodetect (HEVC/VVC, per spec.md §4.4 and §9 Open Question 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashProfile {
    AvcLive,
    Autodetect,
}

impl DashProfile {
    /// `Codec -> DashProfile`. Returns whether the codec was unrecognized
    /// (the caller falls back to `AvcLive` with a warning, matching the
    /// worker's unknown-codec fallback).
    pub fn for_codec(codec: Option<Codec>) -> (Self, bool) {
        match codec {
            Some(Codec::H264) => (Self::AvcLive, false),
            Some(Codec::Hevc) | Some(Codec::Vvc) => (Self::Autodetect, false),
            Some(Codec::Vp9) | Some(Codec::Av1) => (Self::AvcLive, false),
            None => (Self::AvcLive, true),
        }
    }

    fn as_arg(&self) -> Option<&'static str> {
        match self {
            Self::AvcLive => Some("dashavc264:live"),
            Self::Autodetect => None,
        }
    }
}

/// Inputs to the DASH muxer invocation for one job.
#[derive(Debug, Clone)]
pub struct MuxParams {
    pub job_id: String,
    pub output_path: String,
    pub segment_inputs: Vec<String>,
    pub profile: DashProfile,
}

/// Constructed MP4Box argument vector: segment duration 4000ms,
/// random-access-point alignment on, fragmentation on RAP (spec.md §4.4).
pub fn build_muxer_args(params: &MuxParams) -> Vec<String> {
    let mut args = vec![
        "-dash".to_string(),
        "4000".to_string(),
        "-rap".to_string(),
        "-frag-rap".to_string(),
    ];

    if let Some(profile) = params.profile.as_arg() {
        args.push("-profile".to_string());
        args.push(profile.to_string());
    }

    args.push("-out".to_string());
    args.push(params.output_path.clone());
    args.extend(params.segment_inputs.iter().cloned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h264_selects_dashavc264_live() {
        let (profile, was_unknown) = DashProfile::for_codec(Some(Codec::H264));
        assert_eq!(profile, DashProfile::AvcLive);
        assert!(!was_unknown);
    }

    #[test]
    fn hevc_and_vvc_autodetect() {
        let (profile, _) = DashProfile::for_codec(Some(Codec::Hevc));
        assert_eq!(profile, DashProfile::Autodetect);
        let (profile, _) = DashProfile::for_codec(Some(Codec::Vvc));
        assert_eq!(profile, DashProfile::Autodetect);
    }

    #[test]
    fn missing_codec_falls_back_to_avc_live_with_warning_flag() {
        let (profile, was_unknown) = DashProfile::for_codec(None);
        assert_eq!(profile, DashProfile::AvcLive);
        assert!(was_unknown);
    }

    #[test]
    fn muxer_args_include_segment_duration_and_rap_alignment() {
        let params = MuxParams {
            job_id: "job1".to_string(),
            output_path: "/scratch/job1/manifest.mpd".to_string(),
            segment_inputs: vec![
                "/scratch/job1_144p.mp4".to_string(),
                "/scratch/job1_720p.mp4".to_string(),
            ],
            profile: DashProfile::AvcLive,
        };
        let args = build_muxer_args(&params);
        assert_eq!(args[0], "-dash");
        assert_eq!(args[1], "4000");
        assert!(args.contains(&"-rap".to_string()));
        assert!(args.contains(&"-frag-rap".to_string()));
        assert!(args.contains(&"dashavc264:live".to_string()));
        assert!(args.contains(&"/scratch/job1_144p.mp4".to_string()));
        assert!(args.contains(&"/scratch/job1_720p.mp4".to_string()));
    }

    #[test]
    fn autodetect_profile_omits_profile_flag() {
        let params = MuxParams {
            job_id: "job1".to_string(),
            output_path: "/scratch/job1/manifest.mpd".to_string(),
            segment_inputs: vec!["/scratch/job1_720p.mp4".to_string()],
            profile: DashProfile::Autodetect,
        };
        let args = build_muxer_args(&params);
        assert!(!args.contains(&"-profile".to_string()));
    }
}
