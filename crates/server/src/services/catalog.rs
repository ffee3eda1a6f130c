use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tmdb::{
    DiscoverMoviesParams, MovieDetails, MovieSummary, PaginatedResponse, SearchMoviesParams,
    TmdbClient, TmdbError,
};

use super::cache::{cache_key, CacheService};

/// Cache key namespace for origin responses.
const NAMESPACE: &str = "tmdb";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("TMDB API error: {0}")]
    Origin(#[from] TmdbError),
}

/// Cache-aside access to the external movie catalog.
///
/// Every method derives a deterministic key from the endpoint and its
/// canonicalized parameters, consults the cache store first, and falls back
/// to the origin API on a miss. Cache store outages degrade to plain origin
/// calls; origin failures propagate to the caller.
pub struct CatalogService {
    tmdb: Arc<TmdbClient>,
    cache: Arc<CacheService>,
    ttl: Duration,
}

impl CatalogService {
    pub fn new(tmdb: Arc<TmdbClient>, cache: Arc<CacheService>, ttl: Duration) -> Self {
        Self { tmdb, cache, ttl }
    }

    /// Search the catalog by title.
    pub async fn search(
        &self,
        query: &str,
        page: i64,
        year: Option<i32>,
    ) -> Result<PaginatedResponse<MovieSummary>, CatalogError> {
        let mut params = vec![
            ("query", query.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }
        let key = cache_key(NAMESPACE, "search/movie", &params);

        let tmdb = Arc::clone(&self.tmdb);
        let search = SearchMoviesParams {
            query: query.to_string(),
            page: Some(page),
            year,
        };
        self.cache
            .get_or_fetch(&key, self.ttl, || async move {
                tmdb.search_movies(search).await.map_err(CatalogError::from)
            })
            .await
    }

    /// Get full movie details (credits included) by TMDB ID.
    pub async fn movie_detail(&self, tmdb_id: i64) -> Result<MovieDetails, CatalogError> {
        let key = cache_key(NAMESPACE, &format!("movie/{}", tmdb_id), &[]);

        let tmdb = Arc::clone(&self.tmdb);
        self.cache
            .get_or_fetch(&key, self.ttl, || async move {
                tmdb.get_movie(tmdb_id).await.map_err(CatalogError::from)
            })
            .await
    }

    /// Popular movies listing.
    pub async fn popular(&self, page: i64) -> Result<PaginatedResponse<MovieSummary>, CatalogError> {
        let key = cache_key(NAMESPACE, "movie/popular", &[("page", page.to_string())]);

        let tmdb = Arc::clone(&self.tmdb);
        self.cache
            .get_or_fetch(&key, self.ttl, || async move {
                tmdb.popular_movies(page).await.map_err(CatalogError::from)
            })
            .await
    }

    /// Top rated movies listing.
    pub async fn top_rated(
        &self,
        page: i64,
    ) -> Result<PaginatedResponse<MovieSummary>, CatalogError> {
        let key = cache_key(NAMESPACE, "movie/top_rated", &[("page", page.to_string())]);

        let tmdb = Arc::clone(&self.tmdb);
        self.cache
            .get_or_fetch(&key, self.ttl, || async move {
                tmdb.top_rated_movies(page)
                    .await
                    .map_err(CatalogError::from)
            })
            .await
    }

    /// Upcoming movies listing.
    pub async fn upcoming(
        &self,
        page: i64,
    ) -> Result<PaginatedResponse<MovieSummary>, CatalogError> {
        let key = cache_key(NAMESPACE, "movie/upcoming", &[("page", page.to_string())]);

        let tmdb = Arc::clone(&self.tmdb);
        self.cache
            .get_or_fetch(&key, self.ttl, || async move {
                tmdb.upcoming_movies(page).await.map_err(CatalogError::from)
            })
            .await
    }

    /// Discover the best rated movies of a given release year.
    pub async fn discover_by_year(
        &self,
        year: i32,
        page: i64,
    ) -> Result<PaginatedResponse<MovieSummary>, CatalogError> {
        let params = [
            ("primary_release_year", year.to_string()),
            ("page", page.to_string()),
            ("sort_by", "vote_average.desc".to_string()),
        ];
        let key = cache_key(NAMESPACE, "discover/movie", &params);

        let tmdb = Arc::clone(&self.tmdb);
        self.cache
            .get_or_fetch(&key, self.ttl, || async move {
                tmdb.discover_movies(DiscoverMoviesParams {
                    primary_release_year: Some(year),
                    page: Some(page),
                    sort_by: Some("vote_average.desc".to_string()),
                })
                .await
                .map_err(CatalogError::from)
            })
            .await
    }
}
