mod catalog;
mod movies;
mod ratings;

use serde::Deserialize;

/// Query parameters for paginated listings
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

// Re-export all handlers
pub use catalog::{
    catalog_movie_detail, catalog_popular, catalog_search, catalog_top_rated, catalog_upcoming,
    CatalogSearchQuery,
};
pub use movies::{
    delete_movie, get_movie, get_movie_years, list_movies, list_sync_runs, search_movies,
    top_movies, trigger_sync, MovieListQuery, MovieSearchQuery, SyncAccepted, SyncRequest,
    SyncRunsQuery, TopMoviesQuery,
};
pub use ratings::{
    approve_rating, delete_rating, get_movie_average, get_rating, list_movie_ratings,
    list_ratings, list_user_ratings, submit_rating, update_rating, RatingListQuery,
    RatingPageQuery,
};
