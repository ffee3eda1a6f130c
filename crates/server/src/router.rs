use axum::{Json, Router};
use utoipa::OpenApi;

use crate::api::handlers;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    Router::new()
        // Local movie endpoints
        .route("/api/movies", get(handlers::list_movies))
        .route("/api/movies/top", get(handlers::top_movies))
        .route("/api/movies/years", get(handlers::get_movie_years))
        .route("/api/movies/search", get(handlers::search_movies))
        .route("/api/movies/sync", post(handlers::trigger_sync))
        .route(
            "/api/movies/{id}",
            get(handlers::get_movie).delete(handlers::delete_movie),
        )
        .route("/api/sync/runs", get(handlers::list_sync_runs))
        // Catalog (origin) endpoints
        .route("/api/catalog/search", get(handlers::catalog_search))
        .route("/api/catalog/popular", get(handlers::catalog_popular))
        .route("/api/catalog/top-rated", get(handlers::catalog_top_rated))
        .route("/api/catalog/upcoming", get(handlers::catalog_upcoming))
        .route(
            "/api/catalog/movies/{tmdb_id}",
            get(handlers::catalog_movie_detail),
        )
        // Rating endpoints
        .route(
            "/api/ratings",
            post(handlers::submit_rating).get(handlers::list_ratings),
        )
        .route(
            "/api/ratings/{id}",
            get(handlers::get_rating)
                .put(handlers::update_rating)
                .delete(handlers::delete_rating),
        )
        .route("/api/ratings/{id}/approve", put(handlers::approve_rating))
        .route(
            "/api/ratings/movie/{movie_id}",
            get(handlers::list_movie_ratings),
        )
        .route(
            "/api/ratings/movie/{movie_id}/average",
            get(handlers::get_movie_average),
        )
        .route(
            "/api/ratings/user/{user_id}",
            get(handlers::list_user_ratings),
        )
        // API documentation
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state)
}
