//! TMDB (The Movie Database) service client.
//!
//! Provides methods to search and fetch movie metadata from the TMDB v3 API,
//! normalized into the common movie record.

use async_trait::async_trait;
use movie_metadata::tmdb::{TmdbMovie, TmdbMovieDetails, TmdbPage, TmdbStatus};
use movie_metadata::{MovieDetails, SearchPage};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

use super::keys::KeyPool;
use super::provider::MovieProvider;
use super::throttle::Throttle;

/// TMDB API client for fetching movie metadata.
pub struct TmdbClient {
    base_url: String,
    image_base: String,
    keys: KeyPool,
    throttle: Throttle,
}

impl TmdbClient {
    pub fn new(base_url: &str, image_base: &str, keys: KeyPool, throttle: Throttle) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            image_base: image_base.to_string(),
            keys,
            throttle,
        }
    }

    async fn list(&self, path: &str, page: u32) -> Result<SearchPage> {
        let params = [("page", page.to_string())];
        let response: TmdbPage<TmdbMovie> = self.get_with_params(path, &params).await?;
        Ok(response.into_search_page(&self.image_base))
    }

    /// Perform a GET request with the next API key and deserialize the JSON body.
    ///
    /// A 404 is an upstream error here; only `details` treats it as a miss.
    async fn get_with_params<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_optional(path, params).await?.ok_or_else(|| {
            AppError::Upstream(format!("TMDB returned 404 for {}", path))
        })
    }

    /// Like [`get_with_params`](Self::get_with_params), with 404 mapped to `None`.
    async fn get_optional<T>(&self, path: &str, params: &[(&str, String)]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let entry = self.keys.next()?;

        self.throttle.wait().await;

        let response = entry
            .client()
            .get(&url)
            .query(&[("api_key", entry.key())])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("TMDB request to {} failed: {}", path, e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::Upstream(
                "TMDB API key is invalid or missing".to_string(),
            ));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Upstream(
                "TMDB rate limit exceeded, please try again later".to_string(),
            ));
        }

        if !status.is_success() {
            let message = response
                .json::<TmdbStatus>()
                .await
                .map(|s| s.status_message)
                .unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "TMDB API {} returned error status {}: {}",
                path, status, message
            )));
        }

        response.json::<T>().await.map(Some).map_err(|e| {
            AppError::Upstream(format!(
                "Failed to parse TMDB response from {}: {}",
                path, e
            ))
        })
    }
}

#[async_trait]
impl MovieProvider for TmdbClient {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage> {
        tracing::debug!(query = %query, page = page, "Searching TMDB movies");

        let params = [("query", query.to_string()), ("page", page.to_string())];
        let response: TmdbPage<TmdbMovie> =
            self.get_with_params("/search/movie", &params).await?;
        Ok(response.into_search_page(&self.image_base))
    }

    async fn details(&self, id: &str) -> Result<Option<MovieDetails>> {
        // TMDB ids are numeric; anything else cannot exist upstream.
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(None);
        }

        tracing::debug!(movie_id = %id, "Fetching TMDB movie details");

        let params = [("append_to_response", "credits,videos".to_string())];
        let details: Option<TmdbMovieDetails> = self
            .get_optional(&format!("/movie/{}", id), &params)
            .await?;
        Ok(details.map(|d| d.into_details(&self.image_base)))
    }

    async fn top_rated(&self, page: u32) -> Result<SearchPage> {
        tracing::debug!(page = page, "Fetching TMDB top rated movies");
        self.list("/movie/top_rated", page).await
    }

    async fn popular(&self, page: u32) -> Result<SearchPage> {
        tracing::debug!(page = page, "Fetching TMDB popular movies");
        self.list("/movie/popular", page).await
    }
}
