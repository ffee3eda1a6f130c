use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{SyncRun, SyncRunRow, SyncRunStatus};

/// Common SELECT fields for sync run queries
const SELECT_SYNC_RUN: &str = r#"
    SELECT id, year_filter, status, synced, failed, pages, started_at, finished_at
    FROM sync_runs
"#;

pub struct SyncRunRepository;

impl SyncRunRepository {
    /// Record the start of a sync run, returning its ID.
    pub async fn start(pool: &SqlitePool, year_filter: Option<i32>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO sync_runs (year_filter, status) VALUES ($1, 'running') RETURNING id",
        )
        .bind(year_filter)
        .fetch_one(pool)
        .await?;

        Ok(sqlx::Row::get(&result, "id"))
    }

    /// Record the outcome of a finished sync run.
    pub async fn finish(
        pool: &SqlitePool,
        id: i64,
        status: SyncRunStatus,
        synced: i64,
        failed: i64,
        pages: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE sync_runs SET
                status = $1,
                synced = $2,
                failed = $3,
                pages = $4,
                finished_at = $5
            WHERE id = $6
            "#,
        )
        .bind(status.as_str())
        .bind(synced)
        .bind(failed)
        .bind(pages)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Most recent sync runs, newest first.
    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<SyncRun>, sqlx::Error> {
        let query = format!("{} ORDER BY id DESC LIMIT $1", SELECT_SYNC_RUN);
        let rows = sqlx::query_as::<_, SyncRunRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
