//! Integration tests for HTML pages.

mod common;

use axum::http::StatusCode;
use common::TestApp;

// =============================================================================
// Home Page Tests
// =============================================================================

#[tokio::test]
async fn test_home_lists_top_rated_movies() {
    let app = TestApp::new().await;

    let response = app.server().get("/").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<title>Cinescope</title>"));
    assert!(html.contains("Top Movie 1"));
    assert!(html.contains("Top Movie 8"));
    // Limited to the configured home movie count
    assert!(!html.contains("Top Movie 9"));
    // Directors are filled in from movie details
    assert!(html.contains("Lana Wachowski, Lilly Wachowski"));
    assert_eq!(html.matches("class=\"movie-row\"").count(), 2);
}

#[tokio::test]
async fn test_home_is_served_from_cache() {
    let app = TestApp::new().await;

    app.server().get("/").await.assert_status_ok();
    let calls = app.provider().calls();

    app.server().get("/").await.assert_status_ok();
    assert_eq!(app.provider().calls(), calls);
}

#[tokio::test]
async fn test_home_survives_provider_failure() {
    let app = TestApp::new().await;
    app.provider().set_failing(true);

    let response = app.server().get("/").await;

    response.assert_status_ok();
    assert!(response.text().contains("No movies available right now"));
    assert_eq!(app.cached_entries().await, 0);
}

#[tokio::test]
async fn test_site_settings_are_rendered() {
    let mut config = cinescope::config::Config::load_from("nonexistent-test-config.toml").unwrap();
    config.site.name = "Movie Night".to_string();
    config.site.row_size = 2;
    let app = TestApp::with_config(config).await;

    let html = app.server().get("/").await.text();
    assert!(html.contains("Movie Night"));
    assert_eq!(html.matches("class=\"movie-row\"").count(), 4);
}

// =============================================================================
// Search Page Tests
// =============================================================================

#[tokio::test]
async fn test_search_page() {
    let app = TestApp::new().await;

    let response = app
        .server()
        .get("/search")
        .add_query_param("query", "matrix")
        .add_query_param("page", "2")
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Search results for \"matrix\""));
    assert!(html.contains("The Matrix Reloaded"));
    assert!(html.contains("42 movies found"));
    assert!(html.contains("Page 2 of 3"));
    assert!(
        html.contains("/search?query=matrix&amp;page=1")
            || html.contains("/search?query=matrix&#x26;page=1")
    );
    assert!(html.contains("href=\"/movie/603\""));
}

#[tokio::test]
async fn test_search_without_query_redirects_home() {
    let app = TestApp::new().await;

    for path in ["/search", "/search?query=", "/search?query=%20%20"] {
        let response = app.server().get(path).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/");
    }
    assert_eq!(app.provider().calls(), 0);
}

#[tokio::test]
async fn test_search_with_invalid_page_uses_first_page() {
    let app = TestApp::new().await;

    let response = app.server().get("/search?query=matrix&page=abc").await;

    response.assert_status_ok();
    assert!(response.text().contains("Page 1 of 3"));
}

#[tokio::test]
async fn test_search_no_results() {
    let app = TestApp::new().await;

    let response = app.server().get("/search?query=nothing").await;

    response.assert_status_ok();
    assert!(response.text().contains("No movies found matching"));
}

// =============================================================================
// Movie Page Tests
// =============================================================================

#[tokio::test]
async fn test_movie_page() {
    let app = TestApp::new().await;

    let response = app.server().get("/movie/603").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("The Matrix"));
    assert!(html.contains("Welcome to the Real World."));
    assert!(html.contains("2h 16m"));
    assert!(html.contains("8.2/10"));
    assert!(html.contains("24,512"));
    assert!(html.contains("Directors:"));
    assert!(html.contains("Keanu Reeves, Carrie-Anne Moss"));
    assert!(html.contains("Watch Trailer"));
    assert!(html.contains("https://www.imdb.com/title/tt0133093/"));
}

#[tokio::test]
async fn test_movie_page_hides_watch_button_when_disabled() {
    let mut config = cinescope::config::Config::load_from("nonexistent-test-config.toml").unwrap();
    config.site.show_watch_button = false;
    let app = TestApp::with_config(config).await;

    let html = app.server().get("/movie/603").await.text();
    assert!(!html.contains("Watch Trailer"));
}

#[tokio::test]
async fn test_unknown_movie_renders_not_found_page() {
    let app = TestApp::new().await;

    let response = app.server().get("/movie/999999").await;

    response.assert_status_not_found();
    assert!(response.text().contains("/movie/999999"));
}

#[tokio::test]
async fn test_movie_page_upstream_failure_renders_error_page() {
    let app = TestApp::new().await;
    app.provider().set_failing(true);

    let response = app.server().get("/movie/603").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("Something went wrong"));
}

// =============================================================================
// Fallback and Static Files
// =============================================================================

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let app = TestApp::new().await;

    let response = app.server().get("/no/such/page").await;

    response.assert_status_not_found();
    let html = response.text();
    assert!(html.contains("404"));
    assert!(html.contains("/no/such/page"));
}

#[tokio::test]
async fn test_static_stylesheet() {
    let app = TestApp::new().await;

    let response = app.server().get("/static/css/app.css").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "text/css");
    assert_eq!(response.header("cache-control"), "public, max-age=2592000");
    assert_eq!(response.header("pragma"), "public");
}

#[tokio::test]
async fn test_pages_are_not_cacheable() {
    let app = TestApp::new().await;

    let response = app.server().get("/").await;

    assert_eq!(
        response.header("cache-control"),
        "no-store, no-cache, must-revalidate, max-age=0"
    );
    assert_eq!(response.header("expires"), "Wed, 11 Jan 1984 05:00:00 GMT");
}

#[tokio::test]
async fn test_missing_static_file_is_not_cacheable() {
    let app = TestApp::new().await;

    let response = app.server().get("/static/img/missing.png").await;

    response.assert_status_not_found();
    assert_eq!(response.header("pragma"), "no-cache");
}
