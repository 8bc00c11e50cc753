//! Upstream movie metadata provider abstraction.

use async_trait::async_trait;
use movie_metadata::{MovieDetails, SearchPage};
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ProviderKind};
use crate::db::queries;
use crate::error::{AppError, Result};

use super::keys::KeyPool;
use super::omdb::OmdbClient;
use super::throttle::Throttle;
use super::tmdb::TmdbClient;

/// A source of movie metadata, normalized into the common movie record.
#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Short provider name for logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Search movies by title.
    async fn search(&self, query: &str, page: u32) -> Result<SearchPage>;

    /// Full details for one movie. `Ok(None)` when the upstream does not know the id.
    async fn details(&self, id: &str) -> Result<Option<MovieDetails>>;

    /// Highest rated movies.
    async fn top_rated(&self, page: u32) -> Result<SearchPage>;

    /// Currently popular movies.
    async fn popular(&self, page: u32) -> Result<SearchPage>;
}

/// Build the key pool for `kind`: configured keys first, then active rows
/// from `api_configurations`.
pub fn load_key_pool(config: &Config, conn: &Connection) -> Result<KeyPool> {
    let kind = config.provider.kind;
    let (keys, proxies, timeout_secs) = match kind {
        ProviderKind::Tmdb => (
            config.tmdb.api_keys.as_deref(),
            config.tmdb.proxies.as_deref(),
            config.tmdb.timeout_secs,
        ),
        ProviderKind::Omdb => (
            config.omdb.api_keys.as_deref(),
            config.omdb.proxies.as_deref(),
            config.omdb.timeout_secs,
        ),
    };
    let timeout = Duration::from_secs(timeout_secs);

    let mut pool = match keys.filter(|k| !k.trim().is_empty()) {
        Some(keys) => KeyPool::from_csv(keys, proxies, timeout)?,
        None => KeyPool::new(timeout),
    };

    let stored = queries::active_api_configurations(conn, kind.service_name())?;
    let mut added = 0;
    for row in &stored {
        if pool.push(&row.api_key, row.proxy.as_deref())? {
            added += 1;
        }
    }

    pool.ensure_not_empty().map_err(|_| {
        AppError::Internal(format!(
            "No API keys configured for {} \
             (set CINESCOPE_{}__API_KEYS or add one with `cinescope add-key`)",
            kind,
            kind.service_name().to_uppercase()
        ))
    })?;

    tracing::info!(
        provider = %kind,
        keys = pool.len(),
        from_database = added,
        "API key pool ready"
    );
    Ok(pool)
}

/// Build the configured provider.
pub fn build_provider(config: &Config, conn: &Connection) -> Result<Arc<dyn MovieProvider>> {
    let keys = load_key_pool(config, conn)?;

    let provider: Arc<dyn MovieProvider> = match config.provider.kind {
        ProviderKind::Tmdb => Arc::new(TmdbClient::new(
            &config.tmdb.api_url,
            &config.tmdb.image_base,
            keys,
            Throttle::from_millis(config.tmdb.throttle_ms),
        )),
        ProviderKind::Omdb => Arc::new(OmdbClient::new(
            &config.omdb.api_url,
            keys,
            Throttle::from_millis(config.omdb.throttle_ms),
        )),
    };

    Ok(provider)
}
