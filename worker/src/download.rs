//! Input download (spec.md §4.2 step 4), streamed to
//! `<scratch>/<job_id>_input.mp4`. Grounded in
//! `transcode-worker/ffmpeg.go::DownloadInput` (HTTP GET, non-200 → error),
//! generalized from `io.Copy` into a streamed `reqwest` body write so large
//! inputs don't have to be buffered in memory.

use crate::error::WorkerError;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

pub fn input_path(scratch_dir: &str, job_id: &str) -> PathBuf {
    PathBuf::from(scratch_dir).join(format!("{job_id}_input.mp4"))
}

pub async fn download_input(
    input_url: &str,
    scratch_dir: &str,
    job_id: &str,
) -> Result<PathBuf, WorkerError> {
    let path = input_path(scratch_dir, job_id);

    let response = reqwest::get(input_url)
        .await
        .map_err(|e| WorkerError::DownloadError(format!("failed to fetch {input_url}: {e}")))?;

    if !response.status().is_success() {
        return Err(WorkerError::DownloadError(format!(
            "unexpected status code {} fetching {input_url}",
            response.status()
        )));
    }

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| WorkerError::DownloadError(format!("failed to create {path:?}: {e}")))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| WorkerError::DownloadError(format!("error reading response body: {e}")))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| WorkerError::DownloadError(format!("failed writing {path:?}: {e}")))?;
    }

    Ok(path)
}
