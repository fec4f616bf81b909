//! `transcoding_jobs` row access (spec.md §6). The upsert and safe-upsert
//! shapes are ported from `tracker/db.go`'s `InsertOrUpdateJob` and
//! `SafeUpdateJobMetadata` — an empty incoming field falls back to whatever
//! is already on the row rather than clobbering it with blank data pulled
//! from an incomplete KV snapshot (spec.md §9 Open Question: DB columns
//! write-once-non-empty).

use chrono::Utc;
use sqlx::SqlitePool;
use transcode_core::JobRecord;

#[derive(Debug, thiserror::Error)]
pub enum JobDbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct JobRepository {
    pool: SqlitePool,
}

/// Fields a safe-upsert is willing to overwrite, each optionally absent
/// (meaning "keep whatever is already stored").
#[derive(Debug, Default, Clone)]
pub struct JobFields {
    pub stream_name: Option<String>,
    pub input_url: Option<String>,
    pub codec: Option<String>,
    pub representations: Option<String>,
    pub worker_id: Option<String>,
    pub status: Option<String>,
}

impl JobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Unconditional upsert, mirroring `InsertOrUpdateJob`: every field
    /// provided overwrites the existing row.
    pub async fn upsert_job(&self, job_id: &str, fields: &JobFields) -> Result<(), JobDbError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO transcoding_jobs (
                job_id, stream_name, input_url, codec, representations,
                worker_id, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(job_id) DO UPDATE SET
                stream_name     = excluded.stream_name,
                input_url       = excluded.input_url,
                codec           = excluded.codec,
                representations = excluded.representations,
                worker_id       = excluded.worker_id,
                status          = excluded.status,
                updated_at      = excluded.updated_at
            "#,
        )
        .bind(job_id)
        .bind(fields.stream_name.as_deref().unwrap_or_default())
        .bind(fields.input_url.as_deref().unwrap_or_default())
        .bind(fields.codec.as_deref().unwrap_or_default())
        .bind(fields.representations.as_deref().unwrap_or_default())
        .bind(fields.worker_id.as_deref())
        .bind(fields.status.as_deref().unwrap_or_default())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Port of `SafeUpdateJobMetadata`: read the existing row, fall back to
    /// its values for any field left `None` here, then upsert the merged
    /// result. Used by the Tracker's scan loop, whose KV snapshot for a job
    /// may be partial (a field not yet written by the Controller/Worker).
    pub async fn safe_upsert(&self, job_id: &str, incoming: &JobFields) -> Result<(), JobDbError> {
        let existing = self.get_job(job_id).await?;

        let merged = JobFields {
            stream_name: incoming
                .stream_name
                .clone()
                .or_else(|| existing.as_ref().map(|r| r.stream_name.clone())),
            input_url: incoming
                .input_url
                .clone()
                .or_else(|| existing.as_ref().map(|r| r.input_url.clone())),
            codec: incoming
                .codec
                .clone()
                .or_else(|| existing.as_ref().map(|r| r.codec.clone())),
            representations: incoming
                .representations
                .clone()
                .or_else(|| existing.as_ref().map(|r| r.representations.clone())),
            worker_id: incoming
                .worker_id
                .clone()
                .or_else(|| existing.as_ref().and_then(|r| r.worker_id.clone())),
            status: incoming
                .status
                .clone()
                .or_else(|| existing.as_ref().map(|r| r.status.clone())),
        };

        self.upsert_job(job_id, &merged).await
    }

    pub async fn update_status(&self, job_id: &str, status: &str) -> Result<(), JobDbError> {
        sqlx::query(
            "UPDATE transcoding_jobs SET status = ?, updated_at = ? WHERE job_id = ?",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Writes the Packager's terminal state (spec.md §4.4 step 5) as one
    /// statement. `mpd_url` and `status = "done"` must land together: a
    /// crash between two separate writes would leave the row permanently
    /// stuck with `mpd_url` set but `status` short of `done`, since the
    /// Tracker's `mpd_published` guard means the job is never revisited.
    pub async fn complete_job(&self, job_id: &str, mpd_url: &str) -> Result<(), JobDbError> {
        sqlx::query(
            "UPDATE transcoding_jobs SET mpd_url = ?, status = 'done', updated_at = ? WHERE job_id = ?",
        )
        .bind(mpd_url)
        .bind(Utc::now())
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Option<JobRecord>, JobDbError> {
        let row = sqlx::query_as::<_, JobRecord>(
            "SELECT * FROM transcoding_jobs WHERE job_id = ?",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Backing query for `GET /jobs` (spec.md §6).
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<JobRecord>, JobDbError> {
        let rows = sqlx::query_as::<_, JobRecord>(
            "SELECT * FROM transcoding_jobs ORDER BY updated_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
