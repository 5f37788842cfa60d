//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// News aggregation configuration.
    #[serde(default)]
    pub news: NewsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis keys.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign JWTs.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
    /// Name of the HTTP-only refresh token cookie.
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,
    /// Whether the refresh cookie requires HTTPS.
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Google OAuth client ID; Google sign-in is disabled when unset.
    #[serde(default)]
    pub google_client_id: Option<String>,
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached politician detail payloads, in seconds.
    #[serde(default = "default_politician_ttl")]
    pub politician_detail_ttl_secs: i64,
    /// TTL for cached party detail payloads, in seconds.
    #[serde(default = "default_party_ttl")]
    pub party_detail_ttl_secs: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            politician_detail_ttl_secs: default_politician_ttl(),
            party_detail_ttl_secs: default_party_ttl(),
        }
    }
}

/// News aggregation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    /// RSS sources to aggregate, in fetch order.
    #[serde(default = "default_news_sources")]
    pub sources: Vec<NewsSource>,
    /// Per-source fetch timeout in seconds.
    #[serde(default = "default_news_timeout")]
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            sources: default_news_sources(),
            timeout_secs: default_news_timeout(),
        }
    }
}

/// A single RSS news source.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsSource {
    /// Source name used in responses.
    pub name: String,
    /// Feed URL.
    pub url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_redis_prefix() -> String {
    "netabase".to_string()
}

const fn default_access_ttl() -> i64 {
    15 * 60
}

const fn default_refresh_ttl() -> i64 {
    7 * 24 * 60 * 60
}

fn default_refresh_cookie() -> String {
    "refresh_token".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_politician_ttl() -> i64 {
    15 * 60
}

const fn default_party_ttl() -> i64 {
    10 * 60
}

const fn default_news_timeout() -> u64 {
    10
}

fn default_news_sources() -> Vec<NewsSource> {
    [
        ("onlinekhabar", "https://www.onlinekhabar.com/feed"),
        ("setopati", "https://www.setopati.com/rss"),
        ("ratopati", "https://www.ratopati.com/rss"),
        ("bbcnepali", "http://feeds.bbci.co.uk/nepali/rss.xml"),
        ("kantipur", "https://ekantipur.com/rss"),
        ("nagarik", "https://nagariknews.nagariknetwork.com/rss"),
    ]
    .into_iter()
    .map(|(name, url)| NewsSource {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `NETABASE_ENV`)
    /// 3. Environment variables with `NETABASE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("NETABASE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("NETABASE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("NETABASE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
