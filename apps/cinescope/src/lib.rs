//! Cinescope Library
//!
//! A movie discovery site backed by TMDB or OMDB. Pages are rendered on the
//! server and upstream responses are cached in SQLite.
//! This library exposes modules for use in integration tests.

use axum::{
    extract::State,
    http::{header, Method},
    middleware as axum_mw,
    response::Json,
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod services;
pub mod static_files;
pub mod views;

use config::Config;
use services::{Catalog, JobContext, MovieProvider, ResponseCache};
use views::SiteView;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Mutex<Connection>>,
    pub catalog: Arc<Catalog>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire the catalog around `provider`, caching into `db`.
    pub fn new(
        config: Config,
        db: Arc<Mutex<Connection>>,
        provider: Arc<dyn MovieProvider>,
    ) -> Self {
        let catalog = Catalog::new(
            provider,
            ResponseCache::new(Arc::clone(&db)),
            config.cache.clone(),
            config.site.home_movie_count,
        );

        Self {
            config: Arc::new(config),
            db,
            catalog: Arc::new(catalog),
            start_time: std::time::Instant::now(),
        }
    }

    /// Site settings for templates.
    pub fn site(&self) -> SiteView {
        SiteView::from(&self.config.site)
    }

    /// Create a job context for scheduled and manual job execution.
    pub fn job_context(&self) -> JobContext {
        JobContext {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub version: String,
    pub provider: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Cinescope is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.catalog.provider_name().to_string(),
    })
}

/// CORS for the JSON API. If no origins are configured, only same-origin
/// requests are allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    if origins.is_empty() {
        return cors;
    }

    let allowed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    tracing::info!("CORS: Allowing origins {:?}", origins);
    cors.allow_origin(AllowOrigin::list(allowed))
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .route("/static/*path", get(static_files::serve_static))
        .merge(views::routes())
        .nest("/api", api::routes())
        .fallback(views::not_found)
        .layer(axum_mw::from_fn(middleware::cache_headers))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
