use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AuthUser, Role};
use crate::error::{AppError, AppResult};
use crate::models::{Movie, MoviePage, SyncRun};
use crate::repositories::{MovieRepository, SyncRunRepository};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for the local movie listing
#[derive(Debug, Deserialize)]
pub struct MovieListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub year: Option<i32>,
}

/// Query parameters for the top movies listing
#[derive(Debug, Deserialize)]
pub struct TopMoviesQuery {
    pub year: Option<i32>,
    pub limit: Option<i64>,
}

/// Query parameters for local title search
#[derive(Debug, Deserialize)]
pub struct MovieSearchQuery {
    pub q: String,
    pub year: Option<i32>,
}

/// Request body for triggering a catalog sync
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SyncRequest {
    pub year: Option<i32>,
}

/// Acknowledgment returned by the sync trigger
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncAccepted {
    pub message: String,
}

/// Query parameters for listing sync runs
#[derive(Debug, Deserialize)]
pub struct SyncRunsQuery {
    pub limit: Option<i64>,
}

/// List mirrored movies with pagination
#[utoipa::path(
    get,
    path = "/api/movies",
    tag = "movies",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100"),
        ("year" = Option<i32>, Query, description = "Filter by release year")
    ),
    responses(
        (status = 200, description = "Paginated movie listing", body = MoviePage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieListQuery>,
) -> AppResult<Json<MoviePage>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let movies = MovieRepository::list(&state.db, query.year, limit, offset).await?;
    let total = MovieRepository::count(&state.db, query.year).await?;

    Ok(Json(MoviePage {
        movies,
        page,
        limit,
        total,
        total_pages: (total as u64).div_ceil(limit as u64) as i64,
    }))
}

/// List the best rated movies, optionally for one year
#[utoipa::path(
    get,
    path = "/api/movies/top",
    tag = "movies",
    params(
        ("year" = Option<i32>, Query, description = "Filter by release year"),
        ("limit" = Option<i64>, Query, description = "Maximum movies returned")
    ),
    responses(
        (status = 200, description = "Top movies", body = Vec<Movie>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn top_movies(
    State(state): State<AppState>,
    Query(query): Query<TopMoviesQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let limit = query.limit.unwrap_or(100).clamp(1, MAX_PAGE_SIZE);
    let movies = MovieRepository::list(&state.db, query.year, limit, 0).await?;
    Ok(Json(movies))
}

/// Distinct release years available locally
#[utoipa::path(
    get,
    path = "/api/movies/years",
    tag = "movies",
    responses(
        (status = 200, description = "Available years, newest first", body = Vec<i32>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_movie_years(State(state): State<AppState>) -> AppResult<Json<Vec<i32>>> {
    let years = MovieRepository::available_years(&state.db).await?;
    Ok(Json(years))
}

/// Search mirrored movies by title
#[utoipa::path(
    get,
    path = "/api/movies/search",
    tag = "movies",
    params(
        ("q" = String, Query, description = "Title substring"),
        ("year" = Option<i32>, Query, description = "Filter by release year")
    ),
    responses(
        (status = 200, description = "Matching movies", body = Vec<Movie>),
        (status = 400, description = "Missing search query"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieSearchQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    if query.q.trim().is_empty() {
        return Err(AppError::validation("Search query is required"));
    }

    let movies =
        MovieRepository::search_by_title(&state.db, query.q.trim(), query.year, DEFAULT_PAGE_SIZE)
            .await?;
    Ok(Json(movies))
}

/// Get a mirrored movie by ID
#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie ID")),
    responses(
        (status = 200, description = "The movie", body = Movie),
        (status = 404, description = "Movie not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Movie>> {
    let movie = MovieRepository::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Movie not found"))?;
    Ok(Json(movie))
}

/// Soft-delete a mirrored movie (admin only)
#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie ID")),
    responses(
        (status = 204, description = "Movie deleted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Movie not found")
    )
)]
pub async fn delete_movie(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if identity.role != Role::Admin {
        return Err(AppError::forbidden("Only admins can delete movies"));
    }

    if !MovieRepository::soft_delete(&state.db, id).await? {
        return Err(AppError::not_found("Movie not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Trigger a catalog sync in the background
///
/// Responds immediately; the run's outcome is observable through the
/// sync runs listing and logs.
#[utoipa::path(
    post,
    path = "/api/movies/sync",
    tag = "movies",
    request_body = SyncRequest,
    responses(
        (status = 202, description = "Sync started", body = SyncAccepted)
    )
)]
pub async fn trigger_sync(
    State(state): State<AppState>,
    body: Option<Json<SyncRequest>>,
) -> (StatusCode, Json<SyncAccepted>) {
    let year = body.and_then(|Json(request)| request.year);

    state.sync.spawn(year);

    let message = match year {
        Some(year) => format!(
            "Movie sync started for year {}. This may take a few minutes.",
            year
        ),
        None => "Movie sync started. This may take a few minutes.".to_string(),
    };

    (StatusCode::ACCEPTED, Json(SyncAccepted { message }))
}

/// List recent sync runs
#[utoipa::path(
    get,
    path = "/api/sync/runs",
    tag = "movies",
    params(("limit" = Option<i64>, Query, description = "Maximum runs returned")),
    responses(
        (status = 200, description = "Recent sync runs, newest first", body = Vec<SyncRun>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_sync_runs(
    State(state): State<AppState>,
    Query(query): Query<SyncRunsQuery>,
) -> AppResult<Json<Vec<SyncRun>>> {
    let limit = query.limit.unwrap_or(20).clamp(1, MAX_PAGE_SIZE);
    let runs = SyncRunRepository::recent(&state.db, limit).await?;
    Ok(Json(runs))
}
