//! Movies API endpoints.
//!
//! Listings and search results are returned as plain arrays of
//! [`MovieSummary`].

use axum::{
    extract::{Query, State},
    Json,
};
use movie_metadata::MovieSummary;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::services::ListKind;
use crate::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Query parameters for listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed, default: 1). Kept as text so a malformed
    /// value falls back to the first page instead of rejecting the request.
    pub page: Option<String>,
}

/// Query parameters for search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<String>,
}

/// Parse a page parameter: missing or malformed means 1, never below 1.
pub fn page_number(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Trimmed search text, or `None` when nothing was entered.
pub fn search_text(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|q| !q.is_empty())
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/movies/popular
pub async fn popular(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MovieSummary>>> {
    let page = page_number(query.page.as_deref());
    let movies = state.catalog.list(ListKind::Popular, page).await?;
    Ok(Json(movies))
}

/// GET /api/movies/top-rated
pub async fn top_rated(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MovieSummary>>> {
    let page = page_number(query.page.as_deref());
    let movies = state.catalog.list(ListKind::TopRated, page).await?;
    Ok(Json(movies))
}

/// GET /api/movies/search
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<MovieSummary>>> {
    let text = search_text(query.query.as_deref())
        .ok_or_else(|| AppError::BadRequest("Query parameter is required".to_string()))?;
    let page = page_number(query.page.as_deref());

    tracing::debug!(query = %text, page = page, "API movie search");

    let movies = state.catalog.api_search(text, page).await?;
    Ok(Json(movies))
}
