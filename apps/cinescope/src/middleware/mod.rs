//! HTTP middleware for Cinescope.

pub mod cache_headers;

pub use cache_headers::cache_headers;
