//! Configuration module for Cinescope.
//!
//! Loads configuration from `config.toml` with environment variable overrides.

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::AppError;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call the JSON API from a browser. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/cinescope.db")
}

/// Which upstream metadata API serves the site.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Tmdb,
    Omdb,
}

impl ProviderKind {
    /// Service name used in the `api_configurations` table.
    pub fn service_name(&self) -> &'static str {
        match self {
            ProviderKind::Tmdb => "tmdb",
            ProviderKind::Omdb => "omdb",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.service_name())
    }
}

/// Provider selection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
}

/// TMDB API configuration
#[derive(Clone, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_tmdb_url")]
    pub api_url: String,
    #[serde(default = "default_tmdb_image_base")]
    pub image_base: String,
    /// Comma-separated API keys, used round-robin.
    pub api_keys: Option<String>,
    /// Comma-separated proxies, one per key (`none` for a direct connection).
    pub proxies: Option<String>,
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation to avoid exposing api_keys
impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_url", &self.api_url)
            .field("image_base", &self.image_base)
            .field("api_keys", &self.api_keys.as_ref().map(|_| "[REDACTED]"))
            .field("proxies", &self.proxies.as_ref().map(|_| "[REDACTED]"))
            .field("throttle_ms", &self.throttle_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_url: default_tmdb_url(),
            image_base: default_tmdb_image_base(),
            api_keys: None,
            proxies: None,
            throttle_ms: default_throttle_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_tmdb_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base() -> String {
    movie_metadata::tmdb::DEFAULT_IMAGE_BASE.to_string()
}

/// OMDB API configuration
#[derive(Clone, Deserialize)]
pub struct OmdbConfig {
    #[serde(default = "default_omdb_url")]
    pub api_url: String,
    /// Comma-separated API keys, used round-robin.
    pub api_keys: Option<String>,
    /// Comma-separated proxies, one per key (`none` for a direct connection).
    pub proxies: Option<String>,
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation to avoid exposing api_keys
impl std::fmt::Debug for OmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmdbConfig")
            .field("api_url", &self.api_url)
            .field("api_keys", &self.api_keys.as_ref().map(|_| "[REDACTED]"))
            .field("proxies", &self.proxies.as_ref().map(|_| "[REDACTED]"))
            .field("throttle_ms", &self.throttle_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_url: default_omdb_url(),
            api_keys: None,
            proxies: None,
            throttle_ms: default_throttle_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_omdb_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_throttle_ms() -> u64 {
    250 // TMDB allows roughly 40 requests per 10 seconds
}

fn default_timeout_secs() -> u64 {
    30
}

/// Response cache lifetimes, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
    #[serde(default = "default_details_ttl")]
    pub details_ttl_secs: u64,
    #[serde(default = "default_top_rated_ttl")]
    pub top_rated_ttl_secs: u64,
    #[serde(default = "default_api_list_ttl")]
    pub api_list_ttl_secs: u64,
    #[serde(default = "default_api_search_ttl")]
    pub api_search_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl_secs: default_search_ttl(),
            details_ttl_secs: default_details_ttl(),
            top_rated_ttl_secs: default_top_rated_ttl(),
            api_list_ttl_secs: default_api_list_ttl(),
            api_search_ttl_secs: default_api_search_ttl(),
        }
    }
}

fn default_search_ttl() -> u64 {
    3_600
}

fn default_details_ttl() -> u64 {
    86_400
}

fn default_top_rated_ttl() -> u64 {
    604_800
}

fn default_api_list_ttl() -> u64 {
    43_200
}

fn default_api_search_ttl() -> u64 {
    21_600
}

/// Presentation settings
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_home_movie_count")]
    pub home_movie_count: usize,
    #[serde(default = "default_row_size")]
    pub row_size: usize,
    #[serde(default = "default_show_watch_button")]
    pub show_watch_button: bool,
    #[serde(default = "default_watch_button_text")]
    pub watch_button_text: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            home_movie_count: default_home_movie_count(),
            row_size: default_row_size(),
            show_watch_button: default_show_watch_button(),
            watch_button_text: default_watch_button_text(),
        }
    }
}

fn default_site_name() -> String {
    "Cinescope".to_string()
}

fn default_home_movie_count() -> usize {
    8
}

fn default_row_size() -> usize {
    4
}

fn default_show_watch_button() -> bool {
    true
}

fn default_watch_button_text() -> String {
    "Watch Trailer".to_string()
}

/// Scheduler configuration with cron expressions
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_top_rated")]
    pub cache_top_rated: String,
    #[serde(default = "default_purge_cache")]
    pub purge_cache: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
            cache_top_rated: default_cache_top_rated(),
            purge_cache: default_purge_cache(),
        }
    }
}

fn default_scheduler_enabled() -> bool {
    true
}

fn default_cache_top_rated() -> String {
    "0 0 1 * * Mon".to_string()
}

fn default_purge_cache() -> String {
    "0 30 * * * *".to_string()
}

impl Config {
    /// Load configuration from `config_path` and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. The TOML file at `config_path` (optional)
    /// 3. Environment variables with `CINESCOPE_` prefix
    ///
    /// Environment variables use double underscore for nesting:
    /// - `CINESCOPE_SERVER__PORT=9000` sets `server.port`
    /// - `CINESCOPE_TMDB__API_KEYS=key1,key2` sets `tmdb.api_keys`
    pub fn load_from(config_path: &str) -> Result<Self, AppError> {
        Self::load_with_env(config_path, None)
    }

    /// Load with `env` standing in for the process environment when given.
    fn load_with_env(
        config_path: &str,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, AppError> {
        let config = ConfigLoader::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "./data/cinescope.db")?
            .set_default("provider.kind", "tmdb")?
            .add_source(File::with_name(config_path).required(false))
            // CINESCOPE_SERVER__PORT=9000 -> server.port = 9000
            .add_source(
                Environment::with_prefix("CINESCOPE")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for required fields.
    fn validate(&self) -> Result<(), AppError> {
        if self.site.row_size == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "site.row_size must be greater than zero".to_string(),
            )));
        }

        // Keys may also come from the api_configurations table, so a missing
        // key is only worth a warning here.
        if self.provider_keys().is_none() {
            tracing::warn!(
                provider = %self.provider.kind,
                "No API keys configured for the selected provider"
            );
        }

        Ok(())
    }

    /// Comma-separated keys for the selected provider.
    pub fn provider_keys(&self) -> Option<&str> {
        let keys = match self.provider.kind {
            ProviderKind::Tmdb => self.tmdb.api_keys.as_deref(),
            ProviderKind::Omdb => self.omdb.api_keys.as_deref(),
        };
        keys.filter(|k| !k.trim().is_empty())
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        let ip: IpAddr = self.server.host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid host '{}', using 0.0.0.0", self.server.host);
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.server.port)
    }
}
