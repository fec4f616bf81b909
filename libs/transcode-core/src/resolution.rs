//! The resolution profile table (spec.md §3), frozen at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six supported representation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[serde(rename = "144p")]
    P144,
    #[serde(rename = "240p")]
    P240,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    /// Parse a label as it appears in requests and KV fields (`"720p"`, ...).
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "144p" => Some(Self::P144),
            "240p" => Some(Self::P240),
            "360p" => Some(Self::P360),
            "480p" => Some(Self::P480),
            "720p" => Some(Self::P720),
            "1080p" => Some(Self::P1080),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::P144 => "144p",
            Self::P240 => "240p",
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }

    /// The frozen size/bitrate profile for this label (spec.md §3 table).
    pub fn profile(&self) -> ResolutionProfile {
        match self {
            Self::P144 => ResolutionProfile::new("256x144", "200k"),
            Self::P240 => ResolutionProfile::new("426x240", "300k"),
            Self::P360 => ResolutionProfile::new("640x360", "800k"),
            Self::P480 => ResolutionProfile::new("854x480", "1200k"),
            Self::P720 => ResolutionProfile::new("1280x720", "2500k"),
            Self::P1080 => ResolutionProfile::new("1920x1080", "4500k"),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Size and bitrate for one resolution label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionProfile {
    pub size: String,
    pub bitrate: String,
}

impl ResolutionProfile {
    fn new(size: &str, bitrate: &str) -> Self {
        Self {
            size: size.to_string(),
            bitrate: bitrate.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_through_label() {
        for label in ["144p", "240p", "360p", "480p", "720p", "1080p"] {
            let res = Resolution::parse(label).expect("known label");
            assert_eq!(res.label(), label);
        }
    }

    #[test]
    fn unknown_label_is_none() {
        assert!(Resolution::parse("4k").is_none());
        assert!(Resolution::parse("").is_none());
    }

    #[test]
    fn profile_table_matches_spec() {
        assert_eq!(Resolution::P720.profile().size, "1280x720");
        assert_eq!(Resolution::P720.profile().bitrate, "2500k");
        assert_eq!(Resolution::P1080.profile().size, "1920x1080");
        assert_eq!(Resolution::P1080.profile().bitrate, "4500k");
    }
}
