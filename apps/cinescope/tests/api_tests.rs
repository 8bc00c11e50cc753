//! Integration tests for the JSON API.

mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.server().get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Cinescope is running");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["provider"], "fake");
}

#[tokio::test]
async fn test_popular_movies() {
    let app = TestApp::new().await;

    let response = app.server().get("/api/movies/popular").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body.is_array());
    assert_eq!(body[0]["id"], "pop1");
    assert_eq!(body[0]["title"], "Popular One");
    assert_eq!(body[0]["release_date"], "2024-01-01");
}

#[tokio::test]
async fn test_top_rated_movies_are_cached_per_page() {
    let app = TestApp::new().await;

    let first = app.server().get("/api/movies/top-rated?page=2").await;
    first.assert_status_ok();
    let body: Vec<serde_json::Value> = first.json();
    assert_eq!(body.len(), 10);

    app.server().get("/api/movies/top-rated?page=2").await.assert_status_ok();
    assert_eq!(app.provider().calls(), 1);

    app.server().get("/api/movies/top-rated?page=3").await.assert_status_ok();
    assert_eq!(app.provider().calls(), 2);

    let db = app.db().lock().await;
    let keys: Vec<String> = db
        .prepare("SELECT key FROM cache_entries ORDER BY key")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(keys, vec!["api_top_rated_movies_2", "api_top_rated_movies_3"]);
}

#[tokio::test]
async fn test_search_movies() {
    let app = TestApp::new().await;

    let response = app
        .server()
        .get("/api/movies/search")
        .add_query_param("query", "matrix")
        .await;

    response.assert_status_ok();
    let body: Vec<serde_json::Value> = response.json();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["title"], "The Matrix");
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = TestApp::new().await;

    for path in [
        "/api/movies/search",
        "/api/movies/search?query=",
        "/api/movies/search?query=%20",
    ] {
        let response = app.server().get(path).await;
        response.assert_status_bad_request();
        response.assert_json(&json!({
            "error": "bad_request",
            "message": "Query parameter is required"
        }));
    }
    assert_eq!(app.provider().calls(), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway_and_not_cached() {
    let app = TestApp::new().await;
    app.provider().set_failing(true);

    let response = app.server().get("/api/movies/popular").await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "upstream_error");
    assert_eq!(app.cached_entries().await, 0);

    app.provider().set_failing(false);
    app.server().get("/api/movies/popular").await.assert_status_ok();
    assert_eq!(app.cached_entries().await, 1);
}

#[tokio::test]
async fn test_api_responses_are_not_cacheable() {
    let app = TestApp::new().await;

    let response = app.server().get("/api/movies/popular").await;

    assert_eq!(response.header("pragma"), "no-cache");
}
