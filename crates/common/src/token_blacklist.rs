//! Refresh token blacklist backed by Redis.
//!
//! Rotated and logged-out refresh tokens are blacklisted by their JWT ID
//! (`jti`) for the remainder of their lifetime. Redis key expiry garbage
//! collects entries once the token itself would no longer validate.

use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use std::sync::Arc;
use tracing::debug;

use crate::error::AppError;

/// Redis-backed blacklist of revoked refresh token IDs.
#[derive(Clone)]
pub struct TokenBlacklist {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl TokenBlacklist {
    /// Create a new token blacklist under a key prefix.
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>, prefix: String) -> Self {
        Self { redis, prefix }
    }

    /// Generate the blacklist key for a token ID.
    fn blacklist_key(&self, jti: &str) -> String {
        format!("{}:blacklist:{jti}", self.prefix)
    }

    /// Revoke a token ID for `ttl_secs` seconds.
    ///
    /// The TTL should match the token's remaining lifetime; once the token
    /// has expired on its own, the entry is dead weight.
    pub async fn revoke(&self, jti: &str, ttl_secs: i64) -> Result<(), AppError> {
        let key = self.blacklist_key(jti);

        // Already-expired tokens never validate, nothing to record.
        if ttl_secs <= 0 {
            return Ok(());
        }

        self.redis
            .set::<(), _, _>(key, "1", Some(Expiration::EX(ttl_secs)), None, false)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(jti = %jti, ttl_secs, "Revoked refresh token");

        Ok(())
    }

    /// Check whether a token ID has been revoked.
    pub async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let key = self.blacklist_key(jti);

        let exists: i64 = self
            .redis
            .exists(key)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        Ok(exists > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_key_generation() {
        let config = fred::types::config::Config::default();
        let client = fred::clients::Client::new(config, None, None, None);
        let blacklist = TokenBlacklist::new(Arc::new(client), "netabase".to_string());

        assert_eq!(
            blacklist.blacklist_key("abc123"),
            "netabase:blacklist:abc123"
        );
    }
}
