//! Movie metadata wire formats and normalization.
//!
//! TMDB and OMDB describe the same movies with very different JSON shapes
//! (`title` vs `Title`, relative image paths vs absolute URLs, structured
//! credits vs comma-separated strings). This crate holds the serde types for
//! both upstream formats and turns them into one common record
//! ([`MovieSummary`], [`MovieDetails`], [`SearchPage`]).
//!
//! Nothing here performs I/O.

pub mod model;
pub mod omdb;
pub mod tmdb;

pub use model::{
    release_year, Fact, Genre, MovieDetails, MovieSummary, SearchPage, Trailer, TOP_CAST_LIMIT,
};
