use sqlx::SqlitePool;

use crate::models::{Movie, MovieRow, UpsertMovie};

/// Common SELECT fields for movie queries
const SELECT_MOVIE: &str = r#"
    SELECT
        id, tmdb_id, title, original_title, overview,
        release_date, release_year, runtime,
        vote_average, vote_count, popularity,
        poster_path, backdrop_path, original_language,
        genres, production_companies, credits, director, actors,
        last_synced_at, is_active, created_at, updated_at
    FROM movies
"#;

pub struct MovieRepository;

impl MovieRepository {
    /// Insert a movie or refresh an existing row identified by its TMDB ID.
    ///
    /// The conflict branch touches only the mutable metadata fields and
    /// re-derived release date/year; the external id is never rewritten, so
    /// repeated syncs of the same catalog entry converge to a single row.
    pub async fn upsert(pool: &SqlitePool, data: UpsertMovie) -> Result<Movie, sqlx::Error> {
        let genres = serde_json::to_string(&data.genres).ok();
        let production_companies = serde_json::to_string(&data.production_companies).ok();
        let credits = data
            .credits
            .as_ref()
            .and_then(|credits| serde_json::to_string(credits).ok());

        let result = sqlx::query(
            r#"
            INSERT INTO movies (
                tmdb_id, title, original_title, overview,
                release_date, release_year, runtime,
                vote_average, vote_count, popularity,
                poster_path, backdrop_path, original_language,
                genres, production_companies, credits, director, actors,
                last_synced_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, CURRENT_TIMESTAMP)
            ON CONFLICT(tmdb_id) DO UPDATE SET
                overview = excluded.overview,
                poster_path = excluded.poster_path,
                backdrop_path = excluded.backdrop_path,
                runtime = excluded.runtime,
                vote_average = excluded.vote_average,
                vote_count = excluded.vote_count,
                popularity = excluded.popularity,
                release_date = excluded.release_date,
                release_year = excluded.release_year,
                last_synced_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(data.tmdb_id)
        .bind(&data.title)
        .bind(&data.original_title)
        .bind(&data.overview)
        .bind(data.release_date)
        .bind(data.release_year)
        .bind(data.runtime)
        .bind(data.vote_average)
        .bind(data.vote_count)
        .bind(data.popularity)
        .bind(&data.poster_path)
        .bind(&data.backdrop_path)
        .bind(&data.original_language)
        .bind(&genres)
        .bind(&production_companies)
        .bind(&credits)
        .bind(&data.director)
        .bind(&data.actors)
        .fetch_one(pool)
        .await?;

        let id: i64 = sqlx::Row::get(&result, "id");
        Self::get_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Get a movie by ID
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("{} WHERE id = $1", SELECT_MOVIE);
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Get a movie by its external TMDB ID
    pub async fn get_by_tmdb_id(
        pool: &SqlitePool,
        tmdb_id: i64,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("{} WHERE tmdb_id = $1", SELECT_MOVIE);
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(tmdb_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// List active movies ordered by vote average then popularity.
    pub async fn list(
        pool: &SqlitePool,
        year: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!(
            r#"{}
            WHERE is_active = 1 AND ($1 IS NULL OR release_year = $1)
            ORDER BY vote_average DESC, popularity DESC
            LIMIT $2 OFFSET $3
            "#,
            SELECT_MOVIE
        );
        let rows = sqlx::query_as::<_, MovieRow>(&query)
            .bind(year)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count active movies, optionally restricted to a release year.
    pub async fn count(pool: &SqlitePool, year: Option<i32>) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM movies WHERE is_active = 1 AND ($1 IS NULL OR release_year = $1)",
        )
        .bind(year)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }

    /// Search active movies by title substring, case-insensitively.
    pub async fn search_by_title(
        pool: &SqlitePool,
        title: &str,
        year: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!(
            r#"{}
            WHERE is_active = 1
              AND title LIKE '%' || $1 || '%'
              AND ($2 IS NULL OR release_year = $2)
            ORDER BY vote_average DESC
            LIMIT $3
            "#,
            SELECT_MOVIE
        );
        let rows = sqlx::query_as::<_, MovieRow>(&query)
            .bind(title)
            .bind(year)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Distinct release years of active movies, newest first.
    pub async fn available_years(pool: &SqlitePool) -> Result<Vec<i32>, sqlx::Error> {
        let rows: Vec<(i32,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT release_year FROM movies
            WHERE is_active = 1 AND release_year IS NOT NULL
            ORDER BY release_year DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(year,)| year).collect())
    }

    /// Soft-delete a movie by clearing its active flag.
    pub async fn soft_delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE movies SET is_active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count total movie records
    pub async fn count_all(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }
}
