use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tmdb::{Credits, Genre, ProductionCompany};
use utoipa::ToSchema;

/// A movie mirrored from the external catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Movie {
    pub id: i64,
    /// External catalog ID; immutable identity key.
    pub tmdb_id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Year component of `release_date`, denormalized for filtering.
    pub release_year: Option<i32>,
    pub runtime: Option<i64>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub original_language: Option<String>,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<ProductionCompany>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<Credits>,
    /// Main director name, extracted from credits.
    pub director: Option<String>,
    /// Top billed cast names, comma separated.
    pub actors: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert or refresh a movie row.
#[derive(Debug, Clone)]
pub struct UpsertMovie {
    pub tmdb_id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<i32>,
    pub runtime: Option<i64>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub original_language: Option<String>,
    pub genres: Vec<Genre>,
    pub production_companies: Vec<ProductionCompany>,
    pub credits: Option<Credits>,
    pub director: Option<String>,
    pub actors: Option<String>,
}

/// Paginated local movie listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Internal row type for mapping SQLite results.
#[derive(Debug, sqlx::FromRow)]
pub struct MovieRow {
    id: i64,
    tmdb_id: i64,
    title: String,
    original_title: Option<String>,
    overview: Option<String>,
    release_date: Option<NaiveDate>,
    release_year: Option<i32>,
    runtime: Option<i64>,
    vote_average: f64,
    vote_count: i64,
    popularity: f64,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    original_language: Option<String>,
    genres: Option<String>,
    production_companies: Option<String>,
    credits: Option<String>,
    director: Option<String>,
    actors: Option<String>,
    last_synced_at: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            tmdb_id: row.tmdb_id,
            title: row.title,
            original_title: row.original_title,
            overview: row.overview,
            release_date: row.release_date,
            release_year: row.release_year,
            runtime: row.runtime,
            vote_average: row.vote_average,
            vote_count: row.vote_count,
            popularity: row.popularity,
            poster_path: row.poster_path,
            backdrop_path: row.backdrop_path,
            original_language: row.original_language,
            genres: parse_json_column(row.genres.as_deref()),
            production_companies: parse_json_column(row.production_companies.as_deref()),
            credits: row
                .credits
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            director: row.director,
            actors: row.actors,
            last_synced_at: row.last_synced_at,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn parse_json_column<T: serde::de::DeserializeOwned + Default>(raw: Option<&str>) -> T {
    raw.and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}
