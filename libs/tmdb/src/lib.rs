mod client;
mod discover;
mod error;
mod list;
mod movie;
mod search;
pub mod models;

pub use client::{ApiKey, TmdbClient};
pub use discover::DiscoverMoviesParams;
pub use error::TmdbError;
pub use models::{
    CastMember, Credits, CrewMember, Genre, MovieDetails, MovieSummary, PaginatedResponse,
    ProductionCompany,
};
pub use search::SearchMoviesParams;

pub type Result<T> = std::result::Result<T, TmdbError>;
