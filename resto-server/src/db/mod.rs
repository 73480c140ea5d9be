//! Database Module
//!
//! Handles SQLite connection pool and migrations

pub mod repository;

use shared::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

/// Wait on write contention instead of failing with SQLITE_BUSY
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Start a write transaction holding the database write lock
///
/// `BEGIN IMMEDIATE` takes the lock up front, so a read-check-write sequence
/// (stock level, existing payment, overlapping reservation) cannot be
/// interleaved with another writer. Competing writers queue on
/// [`BUSY_TIMEOUT`] instead of failing when upgrading a stale read snapshot.
pub async fn begin_immediate(pool: &SqlitePool) -> sqlx::Result<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Owns the SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open the database (WAL, foreign keys) and apply migrations
    ///
    /// `sqlite::memory:` gets a single-connection pool so every query sees
    /// the same in-memory database.
    pub async fn new(database_url: &str) -> Result<Self, AppError> {
        let in_memory = database_url.contains(":memory:");

        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .create_if_missing(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .pragma("foreign_keys", "ON");
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .optimize_on_close(true, None);
        }

        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if in_memory {
            // Closing the last connection drops an in-memory database
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(
            in_memory,
            busy_timeout_ms = BUSY_TIMEOUT.as_millis() as u64,
            "Database connection established (SQLite)"
        );

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Fresh in-memory database with the schema applied
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::new("sqlite::memory:").await
    }

    /// WAL database in a temp directory, for tests that need several
    /// connections writing at once. Keep the directory alive with the pool.
    #[cfg(test)]
    pub(crate) async fn temp_file() -> (Self, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("resto.db").display());
        (Self::new(&url).await.unwrap(), dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("resto.db").display());

        let db = DbService::new(&url).await.unwrap();
        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        repository::settings::insert_default(&db.pool, 0.1925)
            .await
            .unwrap();
        db.pool.close().await;

        // Migrations are idempotent on an existing file
        let db = DbService::new(&url).await.unwrap();
        let settings = repository::settings::get(&db.pool).await.unwrap();
        assert!(settings.is_some());
    }

    #[tokio::test]
    async fn test_in_memory_enforces_foreign_keys() {
        let db = DbService::in_memory().await.unwrap();
        let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(fk, 1);
    }
}
