use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tmdb::{MovieDetails, MovieSummary, PaginatedResponse};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::PageQuery;

/// Query parameters for catalog search
#[derive(Debug, Deserialize)]
pub struct CatalogSearchQuery {
    pub q: String,
    pub page: Option<i64>,
    pub year: Option<i32>,
}

/// Search the external catalog
#[utoipa::path(
    get,
    path = "/api/catalog/search",
    tag = "catalog",
    params(
        ("q" = String, Query, description = "Title query"),
        ("page" = Option<i64>, Query, description = "Origin page number"),
        ("year" = Option<i32>, Query, description = "Filter by release year")
    ),
    responses(
        (status = 200, description = "Catalog search results", body = PaginatedResponse<MovieSummary>),
        (status = 400, description = "Missing search query"),
        (status = 502, description = "Origin unavailable")
    )
)]
pub async fn catalog_search(
    State(state): State<AppState>,
    Query(query): Query<CatalogSearchQuery>,
) -> AppResult<Json<PaginatedResponse<MovieSummary>>> {
    if query.q.trim().is_empty() {
        return Err(AppError::validation("Search query is required"));
    }

    let results = state
        .catalog
        .search(query.q.trim(), query.page.unwrap_or(1).max(1), query.year)
        .await?;
    Ok(Json(results))
}

/// Get catalog details for a movie by its TMDB ID
#[utoipa::path(
    get,
    path = "/api/catalog/movies/{tmdb_id}",
    tag = "catalog",
    params(("tmdb_id" = i64, Path, description = "TMDB movie ID")),
    responses(
        (status = 200, description = "Catalog movie details", body = MovieDetails),
        (status = 404, description = "Unknown catalog entry"),
        (status = 502, description = "Origin unavailable")
    )
)]
pub async fn catalog_movie_detail(
    State(state): State<AppState>,
    Path(tmdb_id): Path<i64>,
) -> AppResult<Json<MovieDetails>> {
    let details = state.catalog.movie_detail(tmdb_id).await?;
    Ok(Json(details))
}

/// Popular movies from the catalog
#[utoipa::path(
    get,
    path = "/api/catalog/popular",
    tag = "catalog",
    params(("page" = Option<i64>, Query, description = "Origin page number")),
    responses(
        (status = 200, description = "Popular movies", body = PaginatedResponse<MovieSummary>),
        (status = 502, description = "Origin unavailable")
    )
)]
pub async fn catalog_popular(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<MovieSummary>>> {
    let results = state.catalog.popular(query.page.unwrap_or(1).max(1)).await?;
    Ok(Json(results))
}

/// Top rated movies from the catalog
#[utoipa::path(
    get,
    path = "/api/catalog/top-rated",
    tag = "catalog",
    params(("page" = Option<i64>, Query, description = "Origin page number")),
    responses(
        (status = 200, description = "Top rated movies", body = PaginatedResponse<MovieSummary>),
        (status = 502, description = "Origin unavailable")
    )
)]
pub async fn catalog_top_rated(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<MovieSummary>>> {
    let results = state
        .catalog
        .top_rated(query.page.unwrap_or(1).max(1))
        .await?;
    Ok(Json(results))
}

/// Upcoming movies from the catalog
#[utoipa::path(
    get,
    path = "/api/catalog/upcoming",
    tag = "catalog",
    params(("page" = Option<i64>, Query, description = "Origin page number")),
    responses(
        (status = 200, description = "Upcoming movies", body = PaginatedResponse<MovieSummary>),
        (status = 502, description = "Origin unavailable")
    )
)]
pub async fn catalog_upcoming(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<MovieSummary>>> {
    let results = state
        .catalog
        .upcoming(query.page.unwrap_or(1).max(1))
        .await?;
    Ok(Json(results))
}
