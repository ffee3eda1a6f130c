use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user's rating of a movie. At most one row exists per (user, movie) pair.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: i64,
    /// Rating value, 1 to 10.
    pub rating: i64,
    pub comment: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for submitting a rating (create-or-update).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub movie_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

/// Request body for updating an existing rating.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRatingRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// Derived per-movie rating statistic served from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingAverage {
    pub movie_id: i64,
    /// Average of approved ratings, rounded to one decimal place.
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// Paginated rating listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct RatingPage {
    pub ratings: Vec<Rating>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}
