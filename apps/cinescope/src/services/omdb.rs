//! OMDB (Open Movie Database) service client.
//!
//! OMDB only offers title search and lookup by IMDb id. Top rated and
//! popular listings are assembled from searches.

use async_trait::async_trait;
use movie_metadata::omdb::{OmdbMovie, OmdbSearchResponse};
use movie_metadata::{MovieDetails, MovieSummary, SearchPage};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

use super::keys::KeyPool;
use super::provider::MovieProvider;
use super::throttle::Throttle;

/// Titles searched to build the top rated listing.
const TOP_RATED_TITLES: &[&str] = &[
    "Inception",
    "Interstellar",
    "The Godfather",
    "The Dark Knight",
    "Pulp Fiction",
    "The Lord of the Rings",
    "The Matrix",
    "Goodfellas",
    "Star Wars",
    "The Shawshank Redemption",
];

/// Search terms standing in for a popularity chart, one per page.
const POPULAR_TERMS: &[&str] = &["action", "comedy", "drama", "sci-fi", "thriller"];

/// Movies per top rated page.
const TOP_RATED_PAGE_SIZE: usize = 8;

/// OMDB API client.
pub struct OmdbClient {
    base_url: String,
    keys: KeyPool,
    throttle: Throttle,
}

impl OmdbClient {
    pub fn new(base_url: &str, keys: KeyPool, throttle: Throttle) -> Self {
        Self {
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            keys,
            throttle,
        }
    }

    async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage> {
        let params = [
            ("s", query.to_string()),
            ("page", page.to_string()),
            ("type", "movie".to_string()),
        ];
        let response: OmdbSearchResponse = self.get_with_params(&params).await?;

        if !response.is_success() {
            tracing::debug!(
                query = %query,
                error = response.error.as_deref().unwrap_or("unknown"),
                "OMDB search returned no results"
            );
        }

        Ok(response.into_search_page(page))
    }

    /// Perform a GET request with the next API key and deserialize the JSON body.
    ///
    /// OMDB reports most failures in-band (`"Response": "False"`), so only
    /// transport and HTTP-level errors surface here.
    async fn get_with_params<T>(&self, params: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let entry = self.keys.next()?;

        self.throttle.wait().await;

        let response = entry
            .client()
            .get(&self.base_url)
            .query(&[("apikey", entry.key())])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("OMDB request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::Upstream(
                "OMDB API key is invalid or missing".to_string(),
            ));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Upstream(
                "OMDB rate limit exceeded, please try again later".to_string(),
            ));
        }

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "OMDB API returned error status: {}",
                status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse OMDB response: {}", e)))
    }
}

#[async_trait]
impl MovieProvider for OmdbClient {
    fn name(&self) -> &'static str {
        "omdb"
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage> {
        tracing::debug!(query = %query, page = page, "Searching OMDB movies");
        self.search_page(query, page).await
    }

    async fn details(&self, id: &str) -> Result<Option<MovieDetails>> {
        tracing::debug!(movie_id = %id, "Fetching OMDB movie details");

        let params = [("i", id.to_string()), ("plot", "full".to_string())];
        let movie: OmdbMovie = self.get_with_params(&params).await?;

        if !movie.is_success() {
            tracing::debug!(
                movie_id = %id,
                error = movie.error.as_deref().unwrap_or("unknown"),
                "OMDB has no such movie"
            );
        }

        Ok(movie.into_details())
    }

    async fn top_rated(&self, page: u32) -> Result<SearchPage> {
        tracing::debug!(page = page, "Building OMDB top rated list");

        let page = page.max(1);
        let skip = (page as usize - 1) * TOP_RATED_PAGE_SIZE;
        let mut results: Vec<MovieSummary> = Vec::new();
        let mut last_error = None;

        // A failing title is skipped; the rest of the list still loads
        for title in TOP_RATED_TITLES.iter().skip(skip) {
            if results.len() >= TOP_RATED_PAGE_SIZE {
                break;
            }

            let hits = match self.search_page(title, 1).await {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::warn!(
                        title = %title,
                        error = %e,
                        "OMDB search failed for curated title"
                    );
                    last_error = Some(e);
                    continue;
                }
            };
            let Some(first) = hits.results.into_iter().next() else {
                tracing::debug!(title = %title, "No OMDB match for curated title");
                continue;
            };

            match self.details(&first.id).await {
                Ok(Some(details)) => results.push(details.summary()),
                Ok(None) => results.push(first),
                Err(e) => {
                    tracing::warn!(
                        title = %title,
                        error = %e,
                        "OMDB details failed for curated title"
                    );
                    last_error = Some(e);
                }
            }
        }

        if results.is_empty() {
            if let Some(e) = last_error {
                return Err(AppError::Upstream(format!(
                    "no OMDB top rated title could be loaded: {}",
                    e
                )));
            }
        }

        let total = TOP_RATED_TITLES.len();
        Ok(SearchPage {
            results,
            page,
            total_pages: u32::try_from(total.div_ceil(TOP_RATED_PAGE_SIZE)).unwrap_or(u32::MAX),
            total_results: total as u64,
        })
    }

    async fn popular(&self, page: u32) -> Result<SearchPage> {
        let page = page.max(1);
        let term = POPULAR_TERMS[(page as usize - 1) % POPULAR_TERMS.len()];
        tracing::debug!(page = page, term = %term, "Building OMDB popular list");

        let mut listing = self.search_page(term, 1).await?;
        listing.page = page;
        listing.total_pages = POPULAR_TERMS.len() as u32;
        Ok(listing)
    }
}
