use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Client;
use sqlx::SqlitePool;
use tmdb::TmdbClient;

use crate::config::Config;
use crate::services::{
    CacheCleanupJob, CacheService, CatalogService, CatalogSource, CatalogSyncJob, RatingService,
    SchedulerService, SqliteCacheStore, SyncService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub http_client: Client,
    pub tmdb: Arc<TmdbClient>,
    pub cache: Arc<CacheService>,
    pub catalog: Arc<CatalogService>,
    pub sync: Arc<SyncService>,
    pub ratings: Arc<RatingService>,
    pub scheduler: Arc<SchedulerService>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Result<Self, reqwest::Error> {
        // One shared HTTP client; the configured timeout bounds every origin call.
        let http_client = Client::builder().timeout(config.http_timeout).build()?;

        let api_key = Arc::new(RwLock::new(config.tmdb_api_key.clone()));
        let tmdb = Arc::new(TmdbClient::new(http_client.clone(), api_key));

        // Cache store is an injected dependency; every component shares it.
        let cache = Arc::new(CacheService::new(Arc::new(SqliteCacheStore::new(
            db.clone(),
        ))));

        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&tmdb),
            Arc::clone(&cache),
            config.catalog_cache_ttl,
        ));

        let sync = Arc::new(SyncService::new(
            db.clone(),
            Arc::clone(&catalog) as Arc<dyn CatalogSource>,
            config.sync_limit,
        ));

        let ratings = Arc::new(RatingService::new(
            db.clone(),
            Arc::clone(&cache),
            config.rating_auto_approve,
            config.average_cache_ttl,
        ));

        // Create and start scheduler service
        let scheduler = SchedulerService::new()
            .with_job(CatalogSyncJob::new(
                Arc::clone(&sync),
                config.sync_interval,
            ))
            .with_job(CacheCleanupJob::new(db.clone()));
        scheduler.start();

        Ok(Self {
            db,
            config: Arc::new(config),
            http_client,
            tmdb,
            cache,
            catalog,
            sync,
            ratings,
            scheduler: Arc::new(scheduler),
        })
    }
}
