//! Read-through detail payload caching with Redis.
//!
//! Serialized detail payloads (politician and party detail responses) are
//! cached under the record's slug. Entries expire after a configurable TTL
//! and are actively invalidated whenever a rating mutation touches the
//! politician, so aggregates are recomputed on the next read.
//!
//! The cache is an explicit dependency handed to the services that use it,
//! never ambient global state.

use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::AppError;

/// Redis-backed cache for serialized detail payloads, keyed by slug.
#[derive(Clone)]
pub struct DetailCache {
    redis: Arc<RedisClient>,
    prefix: String,
    ttl_secs: i64,
}

impl DetailCache {
    /// Create a new detail cache.
    ///
    /// `prefix` namespaces the keys (e.g. `netabase:politician`); `ttl_secs`
    /// is the entry lifetime.
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>, prefix: String, ttl_secs: i64) -> Self {
        Self {
            redis,
            prefix,
            ttl_secs,
        }
    }

    /// Generate the cache key for a slug.
    fn cache_key(&self, slug: &str) -> String {
        format!("{}:{slug}", self.prefix)
    }

    /// Get a cached payload.
    ///
    /// Returns `Ok(Some(payload))` on a hit, `Ok(None)` on a miss.
    pub async fn get<T: DeserializeOwned>(&self, slug: &str) -> Result<Option<T>, DetailCacheError> {
        let key = self.cache_key(slug);

        let result: Option<String> = self
            .redis
            .get(key)
            .await
            .map_err(|e| DetailCacheError::Redis(e.to_string()))?;

        if let Some(json_str) = result {
            let payload: T = serde_json::from_str(&json_str)
                .map_err(|e| DetailCacheError::Serialization(e.to_string()))?;

            debug!(slug = %slug, prefix = %self.prefix, "Detail cache hit");
            Ok(Some(payload))
        } else {
            debug!(slug = %slug, prefix = %self.prefix, "Detail cache miss");
            Ok(None)
        }
    }

    /// Store a payload under a slug with the configured TTL.
    pub async fn set<T: Serialize>(&self, slug: &str, payload: &T) -> Result<(), DetailCacheError> {
        let key = self.cache_key(slug);
        let json_str = serde_json::to_string(payload)
            .map_err(|e| DetailCacheError::Serialization(e.to_string()))?;

        self.redis
            .set::<(), _, _>(
                key,
                json_str,
                Some(Expiration::EX(self.ttl_secs)),
                None,
                false,
            )
            .await
            .map_err(|e| DetailCacheError::Redis(e.to_string()))?;

        debug!(slug = %slug, prefix = %self.prefix, "Cached detail payload");

        Ok(())
    }

    /// Invalidate the cache entry for a slug.
    ///
    /// Called after every rating upsert/update/delete affecting the record,
    /// so the next read recomputes aggregates.
    pub async fn invalidate(&self, slug: &str) -> Result<(), DetailCacheError> {
        let key = self.cache_key(slug);

        self.redis
            .del::<(), _>(key)
            .await
            .map_err(|e| DetailCacheError::Redis(e.to_string()))?;

        debug!(slug = %slug, prefix = %self.prefix, "Invalidated detail payload");

        Ok(())
    }
}

/// Detail cache error type.
#[derive(Debug, thiserror::Error)]
pub enum DetailCacheError {
    /// Redis operation failed.
    #[error("Redis error: {0}")]
    Redis(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<DetailCacheError> for AppError {
    fn from(err: DetailCacheError) -> Self {
        match err {
            DetailCacheError::Redis(e) => Self::Redis(e),
            DetailCacheError::Serialization(e) => Self::Internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache(prefix: &str) -> DetailCache {
        let config = fred::types::config::Config::default();
        let client = fred::clients::Client::new(config, None, None, None);
        DetailCache::new(Arc::new(client), prefix.to_string(), 900)
    }

    #[test]
    fn test_cache_key_generation() {
        let cache = test_cache("netabase:politician");
        assert_eq!(
            cache.cache_key("jane-doe"),
            "netabase:politician:jane-doe"
        );
    }

    #[test]
    fn test_cache_key_prefix_isolation() {
        let politicians = test_cache("netabase:politician");
        let parties = test_cache("netabase:party");
        assert_ne!(politicians.cache_key("x"), parties.cache_key("x"));
    }
}
