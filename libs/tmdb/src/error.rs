use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("TMDB API error (status {status_code}): {message}")]
    Api { status_code: u16, message: String },
    #[error("Failed to decode TMDB response at {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}
