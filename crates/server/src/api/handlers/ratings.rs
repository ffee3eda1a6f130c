use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::{Rating, RatingAverage, RatingPage, SubmitRatingRequest, UpdateRatingRequest};
use crate::repositories::RatingRepository;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for the rating listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub user_id: Option<i64>,
    pub movie_id: Option<i64>,
}

/// Query parameters for per-user and per-movie rating listings
#[derive(Debug, Deserialize)]
pub struct RatingPageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit, (page - 1) * limit)
}

async fn rating_page(
    state: &AppState,
    user_id: Option<i64>,
    movie_id: Option<i64>,
    page: i64,
    limit: i64,
    offset: i64,
) -> AppResult<RatingPage> {
    let ratings = RatingRepository::list(&state.db, user_id, movie_id, limit, offset).await?;
    let total = RatingRepository::count(&state.db, user_id, movie_id).await?;

    Ok(RatingPage {
        ratings,
        page,
        limit,
        total,
        total_pages: (total as u64).div_ceil(limit as u64) as i64,
    })
}

/// Submit a rating (create-or-update for the caller and movie)
#[utoipa::path(
    post,
    path = "/api/ratings",
    tag = "ratings",
    request_body = SubmitRatingRequest,
    responses(
        (status = 201, description = "Rating created", body = Rating),
        (status = 200, description = "Existing rating updated", body = Rating),
        (status = 400, description = "Invalid rating value"),
        (status = 401, description = "No verified identity")
    )
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<SubmitRatingRequest>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let (rating, created) = state.ratings.submit(&identity, payload).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(rating)))
}

/// List ratings with optional user/movie filters
#[utoipa::path(
    get,
    path = "/api/ratings",
    tag = "ratings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("userId" = Option<i64>, Query, description = "Filter by user"),
        ("movieId" = Option<i64>, Query, description = "Filter by movie")
    ),
    responses(
        (status = 200, description = "Paginated ratings", body = RatingPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    Query(query): Query<RatingListQuery>,
) -> AppResult<Json<RatingPage>> {
    let (page, limit, offset) = page_window(query.page, query.limit);
    let result = rating_page(&state, query.user_id, query.movie_id, page, limit, offset).await?;
    Ok(Json(result))
}

/// Get a rating by ID
#[utoipa::path(
    get,
    path = "/api/ratings/{id}",
    tag = "ratings",
    params(("id" = i64, Path, description = "Rating ID")),
    responses(
        (status = 200, description = "The rating", body = Rating),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Rating>> {
    let rating = RatingRepository::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Rating not found"))?;
    Ok(Json(rating))
}

/// List one movie's ratings
#[utoipa::path(
    get,
    path = "/api/ratings/movie/{movie_id}",
    tag = "ratings",
    params(
        ("movie_id" = i64, Path, description = "Movie ID"),
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100")
    ),
    responses(
        (status = 200, description = "Paginated ratings", body = RatingPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_movie_ratings(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(query): Query<RatingPageQuery>,
) -> AppResult<Json<RatingPage>> {
    let (page, limit, offset) = page_window(query.page, query.limit);
    let result = rating_page(&state, None, Some(movie_id), page, limit, offset).await?;
    Ok(Json(result))
}

/// List one user's ratings
#[utoipa::path(
    get,
    path = "/api/ratings/user/{user_id}",
    tag = "ratings",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100")
    ),
    responses(
        (status = 200, description = "Paginated ratings", body = RatingPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_user_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<RatingPageQuery>,
) -> AppResult<Json<RatingPage>> {
    let (page, limit, offset) = page_window(query.page, query.limit);
    let result = rating_page(&state, Some(user_id), None, page, limit, offset).await?;
    Ok(Json(result))
}

/// Get a movie's average rating
#[utoipa::path(
    get,
    path = "/api/ratings/movie/{movie_id}/average",
    tag = "ratings",
    params(("movie_id" = i64, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "Average over approved ratings", body = RatingAverage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_movie_average(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<RatingAverage>> {
    let average = state.ratings.average(movie_id).await?;
    Ok(Json(average))
}

/// Update a rating (owner only)
#[utoipa::path(
    put,
    path = "/api/ratings/{id}",
    tag = "ratings",
    params(("id" = i64, Path, description = "Rating ID")),
    request_body = UpdateRatingRequest,
    responses(
        (status = 200, description = "Rating updated", body = Rating),
        (status = 403, description = "Caller does not own the rating"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn update_rating(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRatingRequest>,
) -> AppResult<Json<Rating>> {
    let rating = state.ratings.update(&identity, id, payload).await?;
    Ok(Json(rating))
}

/// Delete a rating (owner only)
#[utoipa::path(
    delete,
    path = "/api/ratings/{id}",
    tag = "ratings",
    params(("id" = i64, Path, description = "Rating ID")),
    responses(
        (status = 204, description = "Rating deleted"),
        (status = 403, description = "Caller does not own the rating"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn delete_rating(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.ratings.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Approve a rating (admin only)
#[utoipa::path(
    put,
    path = "/api/ratings/{id}/approve",
    tag = "ratings",
    params(("id" = i64, Path, description = "Rating ID")),
    responses(
        (status = 200, description = "Rating approved", body = Rating),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Rating not found")
    )
)]
pub async fn approve_rating(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Rating>> {
    let rating = state.ratings.approve(&identity, id).await?;
    Ok(Json(rating))
}
