use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct CacheRepository;

impl CacheRepository {
    /// Get a cache payload by key. Expired entries are treated as absent.
    pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM cache_entries WHERE key = $1 AND expires_at > $2")
                .bind(key)
                .bind(Utc::now())
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|(payload,)| payload))
    }

    /// Store a payload under a key, replacing any previous entry.
    pub async fn set(
        pool: &SqlitePool,
        key: &str,
        payload: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, payload, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(payload)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Delete a cache entry by key
    pub async fn delete(pool: &SqlitePool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove all expired entries, returning how many were deleted.
    pub async fn purge_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
