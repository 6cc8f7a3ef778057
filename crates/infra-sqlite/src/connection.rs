// SQLite Connection Pool Setup

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use waitline_core::error::{AppError, Result};

/// Pool tuning
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub busy_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Create SQLite connection pool with WAL mode and foreign keys enforced
///
/// In-memory databases get a single connection so every query sees the
/// same schema and rows.
pub async fn create_pool(database_url: &str, settings: &PoolSettings) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("invalid database url {}: {}", database_url, e)))?
        .busy_timeout(settings.busy_timeout)
        .foreign_keys(true)
        .create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout);
    if in_memory {
        // The database lives only as long as its connection
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Close the pool, waiting at most `limit` for checked-out connections
pub async fn close_pool(pool: &SqlitePool, limit: Duration) -> Result<()> {
    tokio::time::timeout(limit, pool.close())
        .await
        .map_err(|_| AppError::Timeout(format!("closing database pool exceeded {:?}", limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_pool() {
        let pool = create_pool("sqlite::memory:", &PoolSettings::default())
            .await
            .unwrap();
        close_pool(&pool, Duration::from_secs(1)).await.unwrap();
        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn test_close_pool_gives_up_on_held_connection() {
        let pool = create_pool("sqlite::memory:", &PoolSettings::default())
            .await
            .unwrap();
        let _conn = pool.acquire().await.unwrap();

        let err = close_pool(&pool, Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_create_pool() {
        let pool = create_pool("sqlite::memory:", &PoolSettings::default())
            .await
            .unwrap();
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_pool("sqlite::memory:", &PoolSettings::default())
            .await
            .unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
