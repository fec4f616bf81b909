//! Pool setup, trimmed from `libs/db-pool::DbConfig`/`create_pool` down to
//! what a single SQLite file needs: a connect-timeout-guarded pool plus a
//! verification query at startup. The teacher's per-service connection
//! budgeting (`DbConfig::for_service`) doesn't apply — SQLite has no
//! server-side `max_connections` to stay under — so this crate keeps only
//! the env-driven `DbConfig::from_env` shape and the startup verification.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct DbConfig {
    pub sqlite_db_path: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("sqlite_db_path", &self.sqlite_db_path)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            sqlite_db_path: "transcoding.db".to_string(),
            max_connections: 5,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
        }
    }
}

impl DbConfig {
    /// `SQLITE_DB_PATH` is the env var this system's spec names directly
    /// (spec.md §6); the rest have teacher-matching `DB_*` fallbacks.
    pub fn from_env() -> Result<Self, String> {
        let sqlite_db_path = std::env::var("SQLITE_DB_PATH")
            .map_err(|_| "SQLITE_DB_PATH environment variable not set".to_string())?;

        Ok(Self {
            sqlite_db_path,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            acquire_timeout_secs: std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }

    pub fn log_config(&self) {
        info!(
            sqlite_db_path = %self.sqlite_db_path,
            max_connections = self.max_connections,
            "database pool configuration"
        );
    }
}

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transcoding_jobs (
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
"#;

/// Open (creating if absent) the SQLite file at `config.sqlite_db_path`,
/// verify it, and ensure the `transcoding_jobs` table exists — mirroring
/// `tracker/db.go::InitDB`.
pub async fn create_pool(config: DbConfig) -> Result<SqlitePool, sqlx::Error> {
    debug!(
        sqlite_db_path = %config.sqlite_db_path,
        max_connections = config.max_connections,
        "creating SQLite pool"
    );

    let connect_options = SqliteConnectOptions::from_str(&format!(
        "sqlite://{}",
        config.sqlite_db_path
    ))?
    .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(connect_options)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!(sqlite_db_path = %config.sqlite_db_path, "database pool created and verified");
        }
        Ok(Err(e)) => {
            error!(error = %e, "database connection verification failed");
            return Err(e);
        }
        Err(_) => {
            error!(
                timeout_secs = config.connect_timeout_secs,
                "database connection verification timed out"
            );
            return Err(sqlx::Error::PoolTimedOut);
        }
    }

    sqlx::query(CREATE_TABLE).execute(&pool).await?;
    info!("transcoding_jobs table ready");

    Ok(pool)
}
