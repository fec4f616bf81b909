//! Encoder argument construction (spec.md §4.2.1) — the WHAT, not the
//! literal flags of any one encoder binary. `EncoderArgs::build` returns a
//! plain argument vector; the worker crate is the only place that actually
//! spawns a subprocess with it.
//!
//! Grounded in `examples/original_source/transcode-worker/ffmpeg.go`'s
//! `exec.Command("ffmpeg", ...)` invocation, generalized from a single
//! hard-coded H.264 call into the full `Codec -> EncoderArgs` mapping the
//! spec calls for.

use crate::codec::Codec;

/// Inputs to encoder argument construction, one per sub-job.
#[derive(Debug, Clone)]
pub struct EncodeParams {
    pub input_path: String,
    pub output_path: String,
    pub resolution: String,
    pub bitrate: String,
    pub codec: Codec,
    pub gop_size: u32,
    pub keyint_min: u32,
}

/// A constructed argument vector, ready to hand to `Command::new(binary).args(&args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderArgs {
    pub binary: &'static str,
    pub args: Vec<String>,
}

impl EncoderArgs {
    /// Build the encoder invocation for one representation.
    ///
    /// Per spec.md §4.2.1:
    /// - scale filter to the requested resolution, target bitrate, GOP =
    ///   `gop_size`, minimum keyframe interval = `keyint_min`, scene-change
    ///   detection off, no audio.
    /// - fragmented MP4 output with DASH-compatible flags; AV1 additionally
    ///   substitutes `separate_moof`/`omit_tfhd_offset`, forces
    ///   `pix_fmt=yuv420p`, and sets a medium-effort `good`-quality preset.
    pub fn build(params: &EncodeParams) -> Self {
        let mut args = vec![
            "-i".to_string(),
            params.input_path.clone(),
            "-vf".to_string(),
            format!("scale={}", params.resolution),
            "-c:v".to_string(),
            encoder_name(params.codec).to_string(),
            "-b:v".to_string(),
            params.bitrate.clone(),
            "-g".to_string(),
            params.gop_size.to_string(),
            "-keyint_min".to_string(),
            params.keyint_min.to_string(),
            "-sc_threshold".to_string(),
            "0".to_string(),
            "-an".to_string(),
        ];

        let mut movflags = "faststart+frag_keyframe+empty_moov+default_base_moof".to_string();

        if params.codec == Codec::Av1 {
            movflags = "faststart+frag_keyframe+empty_moov+separate_moof+omit_tfhd_offset"
                .to_string();
            args.push("-pix_fmt".to_string());
            args.push("yuv420p".to_string());
            args.push("-cpu-used".to_string());
            args.push("4".to_string()); // medium CPU effort
            args.push("-deadline".to_string());
            args.push("good".to_string());
        }

        args.push("-movflags".to_string());
        args.push(movflags);
        args.push("-f".to_string());
        args.push("mp4".to_string());
        args.push("-y".to_string());
        args.push(params.output_path.clone());

        Self {
            binary: "ffmpeg",
            args,
        }
    }
}

/// `Codec -> encoder name` mapping. Unknown codecs never reach here — the
/// caller is responsible for applying `Codec::parse_or_h264`'s fallback
/// (and logging the warning) before building args, per spec.md §4.2.1.
fn encoder_name(codec: Codec) -> &'static str {
    match codec {
        Codec::H264 => "libx264",
        Codec::Hevc => "libx265",
        Codec::Vvc => "libvvenc",
        Codec::Vp9 => "libvpx-vp9",
        Codec::Av1 => "libaom-av1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(codec: Codec) -> EncodeParams {
        EncodeParams {
            input_path: "/scratch/job1_input.mp4".to_string(),
            output_path: "/scratch/job1_720p.mp4".to_string(),
            resolution: "1280x720".to_string(),
            bitrate: "2500k".to_string(),
            codec,
            gop_size: 48,
            keyint_min: 48,
        }
    }

    #[test]
    fn h264_uses_libx264_and_standard_frag_flags() {
        let args = EncoderArgs::build(&params(Codec::H264));
        assert_eq!(args.binary, "ffmpeg");
        assert!(args.args.contains(&"libx264".to_string()));
        assert!(args
            .args
            .iter()
            .any(|a| a.contains("frag_keyframe") && a.contains("default_base_moof")));
        assert!(!args.args.contains(&"-pix_fmt".to_string()));
    }

    #[test]
    fn av1_substitutes_moof_flags_and_adds_pixel_format_and_preset() {
        let args = EncoderArgs::build(&params(Codec::Av1));
        assert!(args.args.contains(&"libaom-av1".to_string()));
        assert!(args
            .args
            .iter()
            .any(|a| a.contains("separate_moof") && a.contains("omit_tfhd_offset")));
        assert!(args.args.contains(&"-pix_fmt".to_string()));
        assert!(args.args.contains(&"yuv420p".to_string()));
        assert!(args.args.contains(&"good".to_string()));
    }

    #[test]
    fn no_audio_stream_is_requested() {
        let args = EncoderArgs::build(&params(Codec::H264));
        assert!(args.args.contains(&"-an".to_string()));
    }

    #[test]
    fn gop_and_keyint_min_are_forwarded() {
        let args = EncoderArgs::build(&params(Codec::Hevc));
        let g_idx = args.args.iter().position(|a| a == "-g").unwrap();
        assert_eq!(args.args[g_idx + 1], "48");
        let k_idx = args.args.iter().position(|a| a == "-keyint_min").unwrap();
        assert_eq!(args.args[k_idx + 1], "48");
    }
}
