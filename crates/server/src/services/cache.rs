use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::repositories::CacheRepository;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache store error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::Store(e.to_string())
    }
}

/// Key-value cache store with per-entry TTL.
///
/// The store is never authoritative: implementations may lose entries at any
/// time, and callers treat every error as a miss.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache store backed by the `cache_entries` table.
pub struct SqliteCacheStore {
    db: SqlitePool,
}

impl SqliteCacheStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(CacheRepository::get(&self.db, key).await?)
    }

    async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64);
        Ok(CacheRepository::set(&self.db, key, payload, expires_at).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        CacheRepository::delete(&self.db, key).await?;
        Ok(())
    }
}

/// In-memory cache store.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.lock();
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(payload, _)| payload.clone()))
    }

    async fn set(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .lock()
            .insert(key.to_string(), (payload.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Derive a deterministic cache key from an endpoint and its parameters.
///
/// Parameters are sorted by name before joining so semantically identical
/// parameter sets always derive the same key regardless of call-site order.
pub fn cache_key(namespace: &str, endpoint: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return format!("{}:{}", namespace, endpoint);
    }

    let mut pairs: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    pairs.sort();

    format!("{}:{}?{}", namespace, endpoint, pairs.join("&"))
}

/// Cache-aside access to an injected cache store.
///
/// Every cache failure is logged and degraded to a miss (reads) or a no-op
/// (writes and invalidations); callers never observe a cache error.
pub struct CacheService {
    store: Arc<dyn CacheStore>,
}

impl CacheService {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Read and decode a cached value. Any store or decode failure is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = match self.store.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::debug!("Cache miss for key: {}", key);
                return None;
            }
            Err(e) => {
                tracing::warn!("Cache store unavailable for key {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(value) => {
                tracing::debug!("Cache hit for key: {}", key);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Best-effort write. Failures are logged, never propagated.
    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(key, &payload, ttl).await {
            tracing::warn!("Failed to write cache entry {}: {}", key, e);
        }
    }

    /// Best-effort delete. Completes before returning; failures are logged.
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!("Failed to invalidate cache entry {}: {}", key, e);
        }
    }

    /// Cache-aside fetch: return the cached value under `key` if present,
    /// otherwise call `fetch`, cache its result best-effort, and return it.
    ///
    /// At most one cache read, one origin call and one cache write happen per
    /// invocation. Origin errors propagate unchanged; no stale fallback is
    /// attempted. Concurrent callers missing on the same key each call the
    /// origin independently.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get_json::<T>(key).await {
            return Ok(value);
        }

        let value = fetch().await?;
        self.put_json(key, &value, ttl).await;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Cache store that fails every operation, simulating an outage.
    struct FailingCacheStore;

    #[async_trait]
    impl CacheStore for FailingCacheStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Store("connection refused".into()))
        }

        async fn set(&self, _key: &str, _payload: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Store("connection refused".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Store("connection refused".into()))
        }
    }

    #[derive(Debug, PartialEq)]
    struct OriginError;

    fn counting_fetch(
        counter: &Arc<AtomicUsize>,
        value: i64,
    ) -> impl std::future::Future<Output = Result<i64, OriginError>> {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        }
    }

    #[test]
    fn test_cache_key_param_order_insensitive() {
        let a = cache_key(
            "tmdb",
            "search/movie",
            &[("query", "dune".into()), ("page", "2".into())],
        );
        let b = cache_key(
            "tmdb",
            "search/movie",
            &[("page", "2".into()), ("query", "dune".into())],
        );
        assert_eq!(a, b);
        assert_eq!(a, "tmdb:search/movie?page=2&query=dune");
    }

    #[test]
    fn test_cache_key_without_params() {
        assert_eq!(cache_key("tmdb", "movie/603", &[]), "tmdb:movie/603");
    }

    #[test]
    fn test_cache_key_distinguishes_values() {
        let a = cache_key("tmdb", "movie/popular", &[("page", "1".into())]);
        let b = cache_key("tmdb", "movie/popular", &[("page", "2".into())]);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_get_or_fetch_caches_origin_result() {
        let cache = CacheService::new(Arc::new(MemoryCacheStore::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_or_fetch("k", Duration::from_secs(60), || counting_fetch(&calls, 7))
            .await;
        let second = cache
            .get_or_fetch("k", Duration::from_secs(60), || counting_fetch(&calls, 7))
            .await;

        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
        // Second call must be served from the cache without touching the origin.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_refetches_after_expiry() {
        let cache = CacheService::new(Arc::new(MemoryCacheStore::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let _ = cache
            .get_or_fetch("k", Duration::from_millis(10), || counting_fetch(&calls, 7))
            .await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        let result = cache
            .get_or_fetch("k", Duration::from_millis(10), || counting_fetch(&calls, 8))
            .await;

        assert_eq!(result, Ok(8));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_or_fetch_fails_open_when_store_is_down() {
        let cache = CacheService::new(Arc::new(FailingCacheStore));
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_or_fetch("k", Duration::from_secs(60), || counting_fetch(&calls, 7))
            .await;
        let second = cache
            .get_or_fetch("k", Duration::from_secs(60), || counting_fetch(&calls, 7))
            .await;

        // The outage never surfaces; every call degrades to an origin fetch.
        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_or_fetch_propagates_origin_error_without_caching() {
        let cache = CacheService::new(Arc::new(MemoryCacheStore::new()));

        let failed: Result<i64, OriginError> = cache
            .get_or_fetch("k", Duration::from_secs(60), || async { Err(OriginError) })
            .await;
        assert_eq!(failed, Err(OriginError));

        let calls = Arc::new(AtomicUsize::new(0));
        let recovered = cache
            .get_or_fetch("k", Duration::from_secs(60), || counting_fetch(&calls, 9))
            .await;
        assert_eq!(recovered, Ok(9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_treats_undecodable_entry_as_miss() {
        let store = Arc::new(MemoryCacheStore::new());
        store
            .set("k", "not json", Duration::from_secs(60))
            .await
            .unwrap();

        let cache = CacheService::new(store);
        let calls = Arc::new(AtomicUsize::new(0));
        let result = cache
            .get_or_fetch("k", Duration::from_secs(60), || counting_fetch(&calls, 5))
            .await;

        assert_eq!(result, Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = CacheService::new(Arc::clone(&store) as Arc<dyn CacheStore>);

        cache.put_json("k", &7_i64, Duration::from_secs(60)).await;
        assert_eq!(cache.get_json::<i64>("k").await, Some(7));

        cache.invalidate("k").await;
        assert_eq!(cache.get_json::<i64>("k").await, None);
    }
}
