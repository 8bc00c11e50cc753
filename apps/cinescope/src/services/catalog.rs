//! Movie catalog: cache first, then the upstream provider.
//!
//! Every read goes through [`ResponseCache::remember`], so a successful
//! upstream response is stored and a failed one is not. HTML pages degrade
//! to empty listings when the upstream is down; details and the JSON API
//! surface the error.

use futures::future::join_all;
use movie_metadata::{MovieDetails, MovieSummary, SearchPage};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::error::{AppError, Result};

use super::cache::{cache_key, ResponseCache};
use super::provider::MovieProvider;

/// Cache key of the home page listing.
pub const TOP_RATED_KEY: &str = "top_rated_movies";

/// Listings exposed through the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Popular,
    TopRated,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::Popular, ListKind::TopRated];

    fn cache_key(&self, page: u32) -> String {
        match self {
            ListKind::Popular => format!("api_popular_movies_{}", page),
            ListKind::TopRated => format!("api_top_rated_movies_{}", page),
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Popular => f.write_str("popular"),
            ListKind::TopRated => f.write_str("top-rated"),
        }
    }
}

#[derive(Clone)]
pub struct Catalog {
    provider: Arc<dyn MovieProvider>,
    cache: ResponseCache,
    ttl: CacheConfig,
    home_count: usize,
}

impl Catalog {
    pub fn new(
        provider: Arc<dyn MovieProvider>,
        cache: ResponseCache,
        ttl: CacheConfig,
        home_count: usize,
    ) -> Self {
        Self {
            provider,
            cache,
            ttl,
            home_count,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Movies shown on the home page.
    pub async fn home_movies(&self) -> Vec<MovieSummary> {
        let ttl = Duration::from_secs(self.ttl.top_rated_ttl_secs);
        match self
            .cache
            .remember(TOP_RATED_KEY, ttl, || self.fetch_home_movies())
            .await
        {
            Ok(movies) => movies,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load top rated movies");
                Vec::new()
            }
        }
    }

    /// Search results for the HTML search page.
    pub async fn search(&self, query: &str, page: u32) -> SearchPage {
        let key = cache_key("movie_search", &[query, &page.to_string()]);
        let ttl = Duration::from_secs(self.ttl.search_ttl_secs);
        match self
            .cache
            .remember(&key, ttl, || self.provider.search(query, page))
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(query = %query, page = page, error = %e, "Movie search failed");
                SearchPage::empty(page)
            }
        }
    }

    /// Full details for one movie.
    pub async fn details(&self, id: &str) -> Result<MovieDetails> {
        let key = format!("movie_details_{}", id);
        let ttl = Duration::from_secs(self.ttl.details_ttl_secs);
        self.cache
            .remember(&key, ttl, || async move {
                self.provider
                    .details(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))
            })
            .await
    }

    /// One page of a listing for the JSON API.
    pub async fn list(&self, kind: ListKind, page: u32) -> Result<Vec<MovieSummary>> {
        let ttl = Duration::from_secs(self.ttl.api_list_ttl_secs);
        self.cache
            .remember(&kind.cache_key(page), ttl, || async move {
                let listing = match kind {
                    ListKind::Popular => self.provider.popular(page).await?,
                    ListKind::TopRated => self.provider.top_rated(page).await?,
                };
                Ok(listing.results)
            })
            .await
    }

    /// Search results for the JSON API.
    pub async fn api_search(&self, query: &str, page: u32) -> Result<Vec<MovieSummary>> {
        let key = cache_key("api_search", &[query, &page.to_string()]);
        let ttl = Duration::from_secs(self.ttl.api_search_ttl_secs);
        self.cache
            .remember(&key, ttl, || async move {
                Ok(self.provider.search(query, page).await?.results)
            })
            .await
    }

    /// Rebuild the home page listing. Returns the number of movies cached.
    pub async fn refresh_top_rated(&self, force: bool) -> Result<usize> {
        if force && self.cache.forget(TOP_RATED_KEY).await? {
            tracing::info!("Cleared cached top rated movies");
        }

        if let Some(cached) = self.cache.get::<Vec<MovieSummary>>(TOP_RATED_KEY).await? {
            tracing::info!(count = cached.len(), "Top rated movies already cached");
            return Ok(cached.len());
        }

        let movies = self.fetch_home_movies().await?;
        if movies.is_empty() {
            return Err(AppError::Upstream(
                "no top rated movies returned".to_string(),
            ));
        }

        let ttl = Duration::from_secs(self.ttl.top_rated_ttl_secs);
        self.cache.put(TOP_RATED_KEY, &movies, ttl).await?;
        tracing::info!(count = movies.len(), "Cached top rated movies");
        Ok(movies.len())
    }

    /// Warm the JSON API listing caches for pages `1..=pages`.
    ///
    /// Returns the number of pages fetched.
    pub async fn prefetch(&self, kind: ListKind, pages: u32, delay: Duration) -> Result<u32> {
        let mut fetched = 0;
        for page in 1..=pages {
            let movies = self.list(kind, page).await?;
            tracing::info!(kind = %kind, page = page, count = movies.len(), "Prefetched page");
            fetched += 1;

            if page < pages && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(fetched)
    }

    /// Drop expired cache entries. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let purged = self.cache.purge_expired().await?;
        tracing::info!(purged = purged, "Purged expired cache entries");
        Ok(purged)
    }

    async fn fetch_home_movies(&self) -> Result<Vec<MovieSummary>> {
        let listing = self.provider.top_rated(1).await?;
        let mut movies: Vec<MovieSummary> =
            listing.results.into_iter().take(self.home_count).collect();

        // List endpoints carry no credits
        let missing: Vec<String> = movies
            .iter()
            .filter(|m| m.directors.is_empty())
            .map(|m| m.id.clone())
            .collect();
        let lookups = missing.into_iter().map(|id| async move {
            let result = self.provider.details(&id).await;
            (id, result)
        });

        for (id, result) in join_all(lookups).await {
            match result {
                Ok(Some(details)) => {
                    if let Some(movie) = movies.iter_mut().find(|m| m.id == id) {
                        movie.directors = details.directors;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(movie_id = %id, error = %e, "Could not load directors"),
            }
        }

        Ok(movies)
    }
}
