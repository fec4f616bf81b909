//! Subprocess invocation of the external encoder (spec.md §4.2 step 5),
//! grounded in `transcode-worker/ffmpeg.go`'s `exec.Command("ffmpeg",
//! ...).CombinedOutput()`. `transcode_core::EncoderArgs` supplies the
//! argument vector; this is the only place that actually spawns it.

use crate::error::WorkerError;
use tokio::process::Command;
use transcode_core::EncoderArgs;

pub async fn run_encoder(args: &EncoderArgs) -> Result<(), WorkerError> {
    let output = Command::new(args.binary)
        .args(&args.args)
        .output()
        .await
        .map_err(|e| WorkerError::EncodeError(format!("failed to spawn {}: {e}", args.binary)))?;

    if !output.status.success() {
        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        return Err(WorkerError::EncodeError(format!(
            "{} exited with {}: {combined}",
            args.binary, output.status
        )));
    }

    Ok(())
}
