//! Test infrastructure for Cinescope integration tests.
//!
//! Provides a `TestApp` wrapper around `axum_test::TestServer` backed by an
//! in-memory database and a scripted movie provider.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use movie_metadata::{Genre, MovieDetails, MovieSummary, SearchPage, Trailer};
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use cinescope::error::{AppError, Result};
use cinescope::services::MovieProvider;
use cinescope::{config::Config, db, AppState};

pub fn summary(id: &str, title: &str, year: &str) -> MovieSummary {
    MovieSummary {
        id: id.to_string(),
        title: title.to_string(),
        poster_url: Some(format!("https://image.tmdb.org/t/p/w500/{}.jpg", id)),
        release_date: Some(format!("{}-01-01", year)),
        vote_average: 8.4,
        overview: Some(format!("Overview of {}", title)),
        directors: Vec::new(),
    }
}

/// Provider returning canned data, counting every call.
#[derive(Default)]
pub struct FakeProvider {
    pub calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl FakeProvider {
    fn call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("provider offline".to_string()));
        }
        Ok(())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl MovieProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchPage> {
        self.call()?;
        if query == "nothing" {
            return Ok(SearchPage::empty(page));
        }
        Ok(SearchPage {
            results: vec![
                summary("603", "The Matrix", "1999"),
                summary("604", "The Matrix Reloaded", "2003"),
            ],
            page,
            total_pages: 3,
            total_results: 42,
        })
    }

    async fn details(&self, id: &str) -> Result<Option<MovieDetails>> {
        self.call()?;
        if id != "603" && !id.starts_with("top") {
            return Ok(None);
        }
        Ok(Some(MovieDetails {
            id: id.to_string(),
            title: "The Matrix".to_string(),
            overview: Some("A hacker learns the truth about reality.".to_string()),
            tagline: Some("Welcome to the Real World.".to_string()),
            release_date: Some("1999-03-31".to_string()),
            poster_url: Some("https://image.tmdb.org/t/p/w500/matrix.jpg".to_string()),
            backdrop_url: None,
            vote_average: 8.2,
            vote_count: 24512,
            runtime_minutes: Some(136),
            genres: vec![Genre {
                id: "878".to_string(),
                name: "Science Fiction".to_string(),
            }],
            directors: vec!["Lana Wachowski".to_string(), "Lilly Wachowski".to_string()],
            top_cast: vec!["Keanu Reeves".to_string(), "Carrie-Anne Moss".to_string()],
            imdb_id: Some("tt0133093".to_string()),
            trailer: Some(Trailer {
                name: "Official Trailer".to_string(),
                key: "vKQi3bBA1y8".to_string(),
                site: "YouTube".to_string(),
            }),
            facts: Vec::new(),
        }))
    }

    async fn top_rated(&self, page: u32) -> Result<SearchPage> {
        self.call()?;
        Ok(SearchPage {
            results: (1..=10)
                .map(|i| summary(&format!("top{}", i), &format!("Top Movie {}", i), "1994"))
                .collect(),
            page,
            total_pages: 5,
            total_results: 100,
        })
    }

    async fn popular(&self, page: u32) -> Result<SearchPage> {
        self.call()?;
        Ok(SearchPage {
            results: vec![summary("pop1", "Popular One", "2024")],
            page,
            total_pages: 5,
            total_results: 100,
        })
    }
}

/// Test application wrapper around axum_test::TestServer.
pub struct TestApp {
    server: TestServer,
    db: Arc<Mutex<Connection>>,
    provider: Arc<FakeProvider>,
}

impl TestApp {
    /// Create a new test application with in-memory database and default configuration.
    pub async fn new() -> Self {
        let config = Config::load_from("nonexistent-test-config.toml")
            .expect("Failed to load default config");
        Self::with_config(config).await
    }

    /// Create a test application with custom configuration.
    pub async fn with_config(config: Config) -> Self {
        let conn = db::init_db_memory().expect("Failed to initialize test database");
        let db = Arc::new(Mutex::new(conn));
        let provider = Arc::new(FakeProvider::default());

        let state = AppState::new(config, Arc::clone(&db), provider.clone());
        let server = TestServer::new(cinescope::app(state)).expect("Failed to create test server");

        Self {
            server,
            db,
            provider,
        }
    }

    pub fn server(&self) -> &TestServer {
        &self.server
    }

    pub fn db(&self) -> &Arc<Mutex<Connection>> {
        &self.db
    }

    pub fn provider(&self) -> &FakeProvider {
        &self.provider
    }

    /// Number of rows in the response cache.
    pub async fn cached_entries(&self) -> i64 {
        let db = self.db.lock().await;
        db::queries::cache_count(&db).expect("count cache entries")
    }
}
