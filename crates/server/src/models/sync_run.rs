use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Status of a catalog sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncRunStatus {
    #[default]
    Running,
    Completed,
    /// A page fetch failed and the remaining pages were abandoned.
    Aborted,
}

impl SyncRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncRunStatus::Running => "running",
            SyncRunStatus::Completed => "completed",
            SyncRunStatus::Aborted => "aborted",
        }
    }
}

impl FromStr for SyncRunStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "completed" => SyncRunStatus::Completed,
            "aborted" => SyncRunStatus::Aborted,
            _ => SyncRunStatus::Running,
        })
    }
}

/// Record of a single catalog sync run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncRun {
    pub id: i64,
    pub year_filter: Option<i32>,
    pub status: SyncRunStatus,
    pub synced: i64,
    pub failed: i64,
    pub pages: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Internal row type for mapping SQLite results.
#[derive(Debug, sqlx::FromRow)]
pub struct SyncRunRow {
    id: i64,
    year_filter: Option<i32>,
    status: String,
    synced: i64,
    failed: i64,
    pages: i64,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl From<SyncRunRow> for SyncRun {
    fn from(row: SyncRunRow) -> Self {
        Self {
            id: row.id,
            year_filter: row.year_filter,
            status: row.status.parse().unwrap_or_default(),
            synced: row.synced,
            failed: row.failed,
            pages: row.pages,
            started_at: row.started_at,
            finished_at: row.finished_at,
        }
    }
}
