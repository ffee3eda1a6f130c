use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub tmdb_api_key: String,
    /// Timeout applied to every origin HTTP call.
    pub http_timeout: Duration,
    /// TTL of cached origin responses.
    pub catalog_cache_ttl: Duration,
    /// TTL of cached per-movie rating averages.
    pub average_cache_ttl: Duration,
    /// Approval state given to newly created ratings. Single source of truth
    /// for every creation path.
    pub rating_auto_approve: bool,
    /// Maximum catalog entries mirrored per sync run.
    pub sync_limit: usize,
    /// Interval of the scheduled background sync.
    pub sync_interval: Duration,
}

impl Config {
    /// Build a configuration from the environment, with defaults for
    /// everything except the database location.
    pub fn new(database_url: String) -> Self {
        Self {
            database_url,
            tmdb_api_key: env::var("TMDB_API_KEY").unwrap_or_default(),
            http_timeout: Duration::from_secs(env_u64("CINEHUB_HTTP_TIMEOUT_SECS", 10)),
            catalog_cache_ttl: Duration::from_secs(env_u64("CINEHUB_CATALOG_CACHE_TTL_SECS", 3600)),
            average_cache_ttl: Duration::from_secs(env_u64("CINEHUB_AVERAGE_CACHE_TTL_SECS", 3600)),
            rating_auto_approve: env_bool("CINEHUB_RATING_AUTO_APPROVE", true),
            sync_limit: env_u64("CINEHUB_SYNC_LIMIT", 100) as usize,
            sync_interval: Duration::from_secs(env_u64("CINEHUB_SYNC_INTERVAL_SECS", 86400)),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
