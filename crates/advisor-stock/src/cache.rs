//! Caching layer for market data to reduce API calls

use crate::config::AdvisorConfig;
use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for market data requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Stock symbol or KRX code
    pub symbol: String,
    /// API endpoint or operation type
    pub endpoint: String,
    /// Additional parameters as JSON string
    pub params: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(
        symbol: impl Into<String>,
        endpoint: impl Into<String>,
        params: impl Serialize,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            endpoint: endpoint.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

/// Thread-safe cache for market data
pub struct AdvisorCache {
    cache: Arc<RwLock<TimedCache<CacheKey, serde_json::Value>>>,
}

impl AdvisorCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, value: serde_json::Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// If the value exists in cache, it's returned immediately.
    /// Otherwise, the fetcher function is called and the result is cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<serde_json::Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!("Cache hit for key: {:?}", key);
            return Ok(value);
        }

        tracing::debug!("Cache miss for key: {:?}", key);

        let value = fetcher().await?;

        self.insert(key, value.clone()).await;

        Ok(value)
    }

    /// Invalidate a specific cache entry
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for AdvisorCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Multi-tiered cache system for different data types
pub struct CacheManager {
    /// Cache for latest quotes with short TTL
    pub quote: AdvisorCache,
    /// Cache for daily price history
    pub history: AdvisorCache,
    /// Cache for financial statement data with long TTL
    pub financial: AdvisorCache,
}

impl CacheManager {
    /// Create a new cache manager with specified TTLs
    pub fn new(quote_ttl: Duration, history_ttl: Duration, financial_ttl: Duration) -> Self {
        Self {
            quote: AdvisorCache::new(quote_ttl),
            history: AdvisorCache::new(history_ttl),
            financial: AdvisorCache::new(financial_ttl),
        }
    }

    /// Create a cache manager from advisor configuration
    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self::new(
            config.cache_ttl_quote,
            config.cache_ttl_history,
            config.cache_ttl_financial,
        )
    }

    /// Clear all caches
    pub async fn clear_all(&self) {
        self.quote.clear().await;
        self.history.clear().await;
        self.financial.clear().await;
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::from_config(&AdvisorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_key_creation() {
        let key = CacheKey::new("005930", "candles", serde_json::json!({"range": "2y"}));
        assert_eq!(key.symbol, "005930");
        assert_eq!(key.endpoint, "candles");
        assert!(key.params.contains("range"));
    }

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = AdvisorCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "quote", serde_json::json!({}));
        let value = serde_json::json!({"price": 150.0});

        cache.insert(key.clone(), value.clone()).await;

        let retrieved = cache.get(&key).await;
        assert_eq!(retrieved, Some(value));
    }

    #[tokio::test]
    async fn test_cache_get_or_fetch() {
        let cache = AdvisorCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "quote", serde_json::json!({}));
        let value = serde_json::json!({"price": 150.0});

        let mut call_count = 0;
        let fetcher = || {
            call_count += 1;
            async { Ok::<_, String>(value.clone()) }
        };

        // First call should execute fetcher
        let result = cache.get_or_fetch(key.clone(), fetcher).await.unwrap();
        assert_eq!(result, value);
        assert_eq!(call_count, 1);

        // Second call should use cache
        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(value.clone()) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(call_count, 1); // Should not have incremented
    }

    #[tokio::test]
    async fn test_cache_invalidation() {
        let cache = AdvisorCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "quote", serde_json::json!({}));
        let value = serde_json::json!({"price": 150.0});

        cache.insert(key.clone(), value).await;
        assert!(cache.get(&key).await.is_some());

        cache.invalidate(&key).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_clear() {
        let cache = AdvisorCache::new(Duration::from_secs(60));

        for i in 0..5 {
            let key = CacheKey::new(format!("STOCK{i}"), "quote", serde_json::json!({}));
            cache.insert(key, serde_json::json!({"price": i})).await;
        }

        assert_eq!(cache.len().await, 5);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_manager_tiers_are_independent() {
        let manager = CacheManager::default();

        let key = CacheKey::new("005930", "quote", serde_json::json!({}));
        let value = serde_json::json!({"price": 71_000});

        manager.quote.insert(key.clone(), value.clone()).await;

        assert_eq!(manager.quote.len().await, 1);
        assert!(manager.history.is_empty().await);
        assert!(manager.financial.is_empty().await);

        manager.clear_all().await;

        assert!(manager.quote.is_empty().await);
    }
}
