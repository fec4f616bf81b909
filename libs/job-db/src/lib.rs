pub mod pool;
pub mod repo;

pub use pool::{create_pool, DbConfig};
pub use repo::{JobDbError, JobFields, JobRepository};

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> sqlx::SqlitePool {
        sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite pool")
    }

    #[tokio::test]
    async fn upsert_then_safe_upsert_preserves_untouched_fields() {
        let pool = test_pool().await;
        sqlx::query(
            r#"
            CREATE TABLE transcoding_jobs (
                job_id TEXT PRIMARY KEY,
                stream_name TEXT NOT NULL,
                input_url TEXT NOT NULL,
                codec TEXT NOT NULL,
                representations TEXT NOT NULL,
                mpd_url TEXT,
                status TEXT NOT NULL,
                worker_id TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let repo = JobRepository::new(pool);

        repo.upsert_job(
            "job-1",
            &JobFields {
                stream_name: Some("stream-a".into()),
                input_url: Some("http://src/a.mp4".into()),
                codec: Some("h264".into()),
                representations: Some("144p,360p".into()),
                worker_id: None,
                status: Some("waiting".into()),
            },
        )
        .await
        .unwrap();

        // A partial KV snapshot with only `status` populated shouldn't
        // blank out the other columns.
        repo.safe_upsert(
            "job-1",
            &JobFields {
                status: Some("transcoding".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let row = repo.get_job("job-1").await.unwrap().unwrap();
        assert_eq!(row.status, "transcoding");
        assert_eq!(row.stream_name, "stream-a");
        assert_eq!(row.representations, "144p,360p");
    }

    #[tokio::test]
    async fn list_recent_orders_by_updated_at_desc() {
        let pool = test_pool().await;
        sqlx::query(
            r#"
            CREATE TABLE transcoding_jobs (
                job_id TEXT PRIMARY KEY,
                stream_name TEXT NOT NULL,
                input_url TEXT NOT NULL,
                codec TEXT NOT NULL,
                representations TEXT NOT NULL,
                mpd_url TEXT,
                status TEXT NOT NULL,
                worker_id TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let repo = JobRepository::new(pool);
        for id in ["job-a", "job-b"] {
            repo.upsert_job(
                id,
                &JobFields {
                    stream_name: Some("s".into()),
                    input_url: Some("u".into()),
                    codec: Some("h264".into()),
                    representations: Some("144p".into()),
                    worker_id: None,
                    status: Some("waiting".into()),
                },
            )
            .await
            .unwrap();
        }

        let rows = repo.list_recent(10).await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
