pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod router;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;

pub use config::Config;
pub use db::create_pool;
pub use router::create_router;
pub use state::AppState;

pub async fn run_server(
    addr: SocketAddr,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = create_pool(database_url).await?;
    let config = Config::new(database_url.to_string());

    if config.tmdb_api_key.is_empty() {
        tracing::warn!("TMDB_API_KEY is not set; catalog fetches and syncs will fail");
    }

    let state = AppState::new(pool, config)?;
    let app = create_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
