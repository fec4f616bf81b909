//! `Codec -> EncoderArgs` and `Codec -> DashProfile` as pure tagged-enum
//! mappings (spec.md §9 "Polymorphic codec selection" redesign note), in
//! place of the inheritance/string-switch shape the original source used
//! (`transcode-worker/ffmpeg.go` defaulted an empty string to `libx264`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five supported video codecs (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    H264,
    Hevc,
    Vvc,
    Vp9,
    Av1,
}

impl Codec {
    /// Parse a codec label from a request or KV field. Unlike `Resolution`,
    /// this never returns `None` for an unrecognized-but-present string —
    /// unknown codecs fall back to H.264 with a warning, per spec.md §4.2.1.
    /// `None` is reserved for "not a codec-shaped string at all" (empty).
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "h264" | "avc" => Some(Self::H264),
            "hevc" | "h265" => Some(Self::Hevc),
            "vvc" | "h266" => Some(Self::Vvc),
            "vp9" => Some(Self::Vp9),
            "av1" => Some(Self::Av1),
            _ => None,
        }
    }

    /// Parse with the worker's documented unknown-codec fallback: any
    /// unrecognized or empty label becomes H.264, with the caller expected
    /// to log a warning when `was_unknown` is true.
    pub fn parse_or_h264(label: &str) -> (Self, bool) {
        match Self::parse(label) {
            Some(codec) => (codec, false),
            None => (Self::H264, true),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::Hevc => "hevc",
            Self::Vvc => "vvc",
            Self::Vp9 => "vp9",
            Self::Av1 => "av1",
        }
    }

    pub fn is_supported(label: &str) -> bool {
        Self::parse(label).is_some()
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_aliases() {
        assert_eq!(Codec::parse("h264"), Some(Codec::H264));
        assert_eq!(Codec::parse("avc"), Some(Codec::H264));
        assert_eq!(Codec::parse("HEVC"), Some(Codec::Hevc));
        assert_eq!(Codec::parse("h265"), Some(Codec::Hevc));
        assert_eq!(Codec::parse("h266"), Some(Codec::Vvc));
        assert_eq!(Codec::parse("vp9"), Some(Codec::Vp9));
        assert_eq!(Codec::parse("av1"), Some(Codec::Av1));
    }

    #[test]
    fn unknown_codec_rejected_by_parse_but_falls_back_via_parse_or_h264() {
        assert_eq!(Codec::parse("xyz"), None);
        let (codec, was_unknown) = Codec::parse_or_h264("xyz");
        assert_eq!(codec, Codec::H264);
        assert!(was_unknown);

        let (codec, was_unknown) = Codec::parse_or_h264("hevc");
        assert_eq!(codec, Codec::Hevc);
        assert!(!was_unknown);
    }
}
