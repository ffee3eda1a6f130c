use sqlx::SqlitePool;

use crate::models::Rating;

/// Common SELECT fields for rating queries
const SELECT_RATING: &str = r#"
    SELECT id, user_id, movie_id, rating, comment, is_approved, created_at, updated_at
    FROM ratings
"#;

pub struct RatingRepository;

impl RatingRepository {
    /// Create or update the rating for a (user, movie) pair.
    ///
    /// Relies on the UNIQUE(user_id, movie_id) constraint: the insert and the
    /// conflict update are a single atomic statement, so concurrent
    /// submissions for the same pair cannot produce two rows. The conflict
    /// branch leaves the approval state untouched.
    pub async fn upsert(
        pool: &SqlitePool,
        user_id: i64,
        movie_id: i64,
        rating: i64,
        comment: Option<&str>,
        approved: bool,
    ) -> Result<Rating, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO ratings (user_id, movie_id, rating, comment, is_approved)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(user_id, movie_id) DO UPDATE SET
                rating = excluded.rating,
                comment = excluded.comment,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(rating)
        .bind(comment)
        .bind(approved)
        .fetch_one(pool)
        .await?;

        let id: i64 = sqlx::Row::get(&result, "id");
        Self::get_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Get a rating by ID
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!("{} WHERE id = $1", SELECT_RATING);
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Get the rating a user gave to a movie, if any
    pub async fn get_by_user_and_movie(
        pool: &SqlitePool,
        user_id: i64,
        movie_id: i64,
    ) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!("{} WHERE user_id = $1 AND movie_id = $2", SELECT_RATING);
        sqlx::query_as::<_, Rating>(&query)
            .bind(user_id)
            .bind(movie_id)
            .fetch_optional(pool)
            .await
    }

    /// List ratings newest first, optionally filtered by user and/or movie.
    pub async fn list(
        pool: &SqlitePool,
        user_id: Option<i64>,
        movie_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Rating>, sqlx::Error> {
        let query = format!(
            r#"{}
            WHERE ($1 IS NULL OR user_id = $1)
              AND ($2 IS NULL OR movie_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
            SELECT_RATING
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(user_id)
            .bind(movie_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count ratings matching the optional user/movie filters.
    pub async fn count(
        pool: &SqlitePool,
        user_id: Option<i64>,
        movie_id: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM ratings
            WHERE ($1 IS NULL OR user_id = $1)
              AND ($2 IS NULL OR movie_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }

    /// Update the value and/or comment of a rating.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        rating: Option<i64>,
        comment: Option<&str>,
    ) -> Result<Option<Rating>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE ratings SET
                rating = COALESCE($1, rating),
                comment = COALESCE($2, comment),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            "#,
        )
        .bind(rating)
        .bind(comment)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::get_by_id(pool, id).await
    }

    /// Delete a rating by ID
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a rating as approved. Approving an approved rating is a no-op.
    pub async fn approve(pool: &SqlitePool, id: i64) -> Result<Option<Rating>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ratings SET is_approved = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::get_by_id(pool, id).await
    }

    /// Average and count over the approved ratings of a movie.
    ///
    /// Returns `(None, 0)` when the movie has no approved ratings.
    pub async fn average_for_movie(
        pool: &SqlitePool,
        movie_id: i64,
    ) -> Result<(Option<f64>, i64), sqlx::Error> {
        let row: (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(rating), COUNT(*) FROM ratings WHERE movie_id = $1 AND is_approved = 1",
        )
        .bind(movie_id)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }
}
