//! Home page: the top rated grid.

use askama::Template;
use axum::{extract::State, response::IntoResponse};

use crate::AppState;

use super::utils::chunk_rows;
use super::{MovieCard, SiteView};

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub site: SiteView,
    pub rows: Vec<Vec<MovieCard>>,
}

/// GET /
pub async fn page(State(state): State<AppState>) -> impl IntoResponse {
    let movies = state.catalog.home_movies().await;
    let cards: Vec<MovieCard> = movies.iter().map(MovieCard::from).collect();

    HomeTemplate {
        site: state.site(),
        rows: chunk_rows(&cards, state.config.site.row_size),
    }
}
