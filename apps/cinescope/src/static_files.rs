//! Embedded static assets.
//!
//! The stylesheet and images are compiled into the binary. Caching headers
//! are added by the cache headers middleware.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "static/"]
pub struct StaticAssets;

/// Serve embedded files at /static/*path
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => {
            tracing::debug!(path = %path, "Static asset not found");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
