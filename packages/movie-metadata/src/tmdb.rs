//! TMDB (The Movie Database) v3 wire format.
//!
//! TMDB returns snake_case JSON with numeric ids and image paths relative to
//! its image CDN. Details requests are expected to use
//! `append_to_response=credits,videos` so that directors, cast and trailers
//! come back in a single call.

use serde::Deserialize;

use crate::model::{
    non_empty, Genre, MovieDetails, MovieSummary, SearchPage, Trailer, TOP_CAST_LIMIT,
};

/// Default TMDB image CDN base.
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
/// Image size used for posters.
pub const POSTER_SIZE: &str = "w500";
/// Image size used for backdrops.
pub const BACKDROP_SIZE: &str = "original";

/// Build an absolute image URL from a TMDB relative path.
///
/// Common sizes: "w92", "w154", "w185", "w342", "w500", "w780", "original".
/// Paths that are already absolute URLs are returned unchanged.
pub fn image_url(base: &str, size: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}{}", base.trim_end_matches('/'), size, path)
}

fn optional_image(base: &str, size: &str, path: Option<String>) -> Option<String> {
    non_empty(path).map(|p| image_url(base, size, &p))
}

// =============================================================================
// Response Types
// =============================================================================

/// Paginated list wrapper (search, top rated, popular).
#[derive(Debug, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

/// Movie list entry.
#[derive(Debug, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

/// Movie details with appended credits and videos.
#[derive(Debug, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
    #[serde(default)]
    pub videos: Option<TmdbVideos>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCast>,
    #[serde(default)]
    pub crew: Vec<TmdbCrew>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCast {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbCrew {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TmdbVideos {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub video_type: String,
}

/// Error body TMDB sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct TmdbStatus {
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub status_message: String,
}

// =============================================================================
// Normalization
// =============================================================================

impl TmdbMovie {
    pub fn into_summary(self, image_base: &str) -> MovieSummary {
        MovieSummary {
            id: self.id.to_string(),
            title: self.title,
            poster_url: optional_image(image_base, POSTER_SIZE, self.poster_path),
            release_date: non_empty(self.release_date),
            vote_average: self.vote_average,
            overview: non_empty(self.overview),
            directors: Vec::new(),
        }
    }
}

impl TmdbPage<TmdbMovie> {
    pub fn into_search_page(self, image_base: &str) -> SearchPage {
        SearchPage {
            results: self
                .results
                .into_iter()
                .map(|m| m.into_summary(image_base))
                .collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

impl TmdbCredits {
    /// Crew members credited with the `Director` job, in credit order.
    pub fn directors(&self) -> Vec<String> {
        self.crew
            .iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn top_cast(&self) -> Vec<String> {
        self.cast
            .iter()
            .take(TOP_CAST_LIMIT)
            .map(|c| c.name.clone())
            .collect()
    }
}

impl TmdbVideos {
    /// First YouTube trailer, falling back to any YouTube video.
    pub fn trailer(&self) -> Option<Trailer> {
        let youtube = || self.results.iter().filter(|v| v.site == "YouTube");
        youtube()
            .find(|v| v.video_type == "Trailer")
            .or_else(|| youtube().next())
            .map(|v| Trailer {
                name: v.name.clone(),
                key: v.key.clone(),
                site: v.site.clone(),
            })
    }
}

impl TmdbMovieDetails {
    pub fn into_details(self, image_base: &str) -> MovieDetails {
        let credits = self.credits.unwrap_or_default();
        let trailer = self.videos.as_ref().and_then(TmdbVideos::trailer);

        MovieDetails {
            id: self.id.to_string(),
            title: self.title,
            overview: non_empty(self.overview),
            tagline: non_empty(self.tagline),
            release_date: non_empty(self.release_date),
            poster_url: optional_image(image_base, POSTER_SIZE, self.poster_path),
            backdrop_url: optional_image(image_base, BACKDROP_SIZE, self.backdrop_path),
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            runtime_minutes: self.runtime.filter(|r| *r > 0),
            genres: self
                .genres
                .into_iter()
                .map(|g| Genre {
                    id: g.id.to_string(),
                    name: g.name,
                })
                .collect(),
            directors: credits.directors(),
            top_cast: credits.top_cast(),
            imdb_id: non_empty(self.imdb_id),
            trailer,
            facts: Vec::new(),
        }
    }
}
