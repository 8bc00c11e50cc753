//! HTML views
//!
//! Route handlers that render Askama templates. Each page receives the
//! site settings so the layout can render the header and footer.

pub mod home;
pub mod movie;
pub mod search;
pub mod utils;

use askama::Template;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use movie_metadata::MovieSummary;

use crate::config::SiteConfig;
use crate::error::AppError;
use crate::AppState;

use utils::{format_rating, join_names};

/// Site settings used by the layout.
#[derive(Debug, Clone)]
pub struct SiteView {
    pub name: String,
    pub show_watch_button: bool,
    pub watch_button_text: String,
}

impl From<&SiteConfig> for SiteView {
    fn from(config: &SiteConfig) -> Self {
        Self {
            name: config.name.clone(),
            show_watch_button: config.show_watch_button,
            watch_button_text: config.watch_button_text.clone(),
        }
    }
}

/// A movie as shown in listing grids.
#[derive(Debug, Clone)]
pub struct MovieCard {
    pub href: String,
    pub title: String,
    pub poster_url: String,
    pub year: String,
    pub rating: String,
    pub directors: String,
}

impl From<&MovieSummary> for MovieCard {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            href: format!("/movie/{}", urlencoding::encode(&movie.id)),
            title: movie.title.clone(),
            poster_url: movie.poster_url.clone().unwrap_or_default(),
            year: movie.year().unwrap_or_default(),
            rating: format_rating(movie.vote_average),
            directors: join_names(&movie.directors),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/404.html")]
pub struct NotFoundTemplate {
    pub site: SiteView,
    pub path: String,
}

#[derive(Template)]
#[template(path = "pages/error.html")]
pub struct ErrorTemplate {
    pub site: SiteView,
}

/// 404 handler
pub async fn not_found(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            site: state.site(),
            path: uri.path().to_string(),
        },
    )
}

/// An error rendered as an HTML page instead of JSON.
pub struct PageError {
    pub site: SiteView,
    pub path: String,
    pub error: AppError,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self.error {
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                NotFoundTemplate {
                    site: self.site,
                    path: self.path,
                },
            )
                .into_response(),
            error => {
                tracing::error!(path = %self.path, error = %error, "Page failed to render");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorTemplate { site: self.site },
                )
                    .into_response()
            }
        }
    }
}

/// Build the HTML routes for the frontend
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::page))
        .route("/search", get(search::page))
        .route("/movie/:id", get(movie::page))
}
