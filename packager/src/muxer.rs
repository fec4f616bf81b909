//! Subprocess invocation of the external DASH muxer (spec.md §4.4 step 4),
//! grounded in `examples/original_source/mpd-generator/main.go`'s
//! `exec.Command("MP4Box", args...).CombinedOutput()`.
//! `transcode_core::dash::build_muxer_args` supplies the argument vector;
//! this is the only place that actually spawns it.

use crate::error::PackagerError;
use tokio::process::Command;

pub async fn run_muxer(args: &[String]) -> Result<(), PackagerError> {
    let output = Command::new("MP4Box")
        .args(args)
        .output()
        .await
        .map_err(|e| PackagerError::PackageError(format!("failed to spawn MP4Box: {e}")))?;

    if !output.status.success() {
        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        return Err(PackagerError::PackageError(format!(
            "MP4Box exited with {}: {combined}",
            output.status
        )));
    }

    Ok(())
}
