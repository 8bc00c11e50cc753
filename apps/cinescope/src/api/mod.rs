//! JSON API endpoint handlers for Cinescope.

pub mod movies;

use axum::{routing::get, Router};

use crate::AppState;

/// Build the `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movies/popular", get(movies::popular))
        .route("/movies/top-rated", get(movies::top_rated))
        .route("/movies/search", get(movies::search))
}
