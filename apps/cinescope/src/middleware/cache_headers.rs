//! HTTP caching headers.
//!
//! GET responses get `Cache-Control`, `Pragma` and `Expires` headers chosen
//! from the request path's extension. Error responses are never cacheable.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

const YEAR: u64 = 365 * 24 * 60 * 60;
const MONTH: u64 = 30 * 24 * 60 * 60;
const HOUR: u64 = 60 * 60;

/// A date far in the past, marks a response as already expired.
const EXPIRED: &str = "Wed, 11 Jan 1984 05:00:00 GMT";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp", "avif", "ico"];
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "woff", "woff2"];
const PAGE_EXTENSIONS: &[&str] = &["php", "html", "htm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    NoCache,
    MaxAge(u64),
}

impl CachePolicy {
    /// Policy for a request path, decided by its file extension.
    pub fn for_path(path: &str) -> Self {
        let file = path.rsplit('/').next().unwrap_or_default();
        let Some((_, ext)) = file.rsplit_once('.') else {
            return CachePolicy::NoCache;
        };
        let ext = ext.to_ascii_lowercase();
        let ext = ext.as_str();

        if ext.is_empty() || PAGE_EXTENSIONS.contains(&ext) {
            CachePolicy::NoCache
        } else if IMAGE_EXTENSIONS.contains(&ext) || FONT_EXTENSIONS.contains(&ext) {
            CachePolicy::MaxAge(YEAR)
        } else if ext == "css" || ext == "js" {
            CachePolicy::MaxAge(MONTH)
        } else {
            CachePolicy::MaxAge(HOUR)
        }
    }

    /// Write the caching headers, replacing any set by the handler.
    pub fn apply(&self, headers: &mut HeaderMap, now: DateTime<Utc>) {
        match self {
            CachePolicy::NoCache => {
                headers.insert(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
                );
                headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
                headers.insert(header::EXPIRES, HeaderValue::from_static(EXPIRED));
            }
            CachePolicy::MaxAge(secs) => {
                let expires = now + chrono::Duration::seconds(i64::try_from(*secs).unwrap_or(0));
                let expires = expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string();

                if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", secs)) {
                    headers.insert(header::CACHE_CONTROL, value);
                }
                headers.insert(header::PRAGMA, HeaderValue::from_static("public"));
                if let Ok(value) = HeaderValue::from_str(&expires) {
                    headers.insert(header::EXPIRES, value);
                }
            }
        }
    }
}

/// Middleware setting caching headers on GET responses.
pub async fn cache_headers(request: Request<Body>, next: Next) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    let status = response.status();
    let policy = if status.is_client_error() || status.is_server_error() {
        CachePolicy::NoCache
    } else {
        CachePolicy::for_path(&path)
    };

    policy.apply(response.headers_mut(), Utc::now());
    response
}
