use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// In-memory database with the full schema applied.
///
/// A single connection keeps every query on the same in-memory database.
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    crate::db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    pool
}
