//! Common movie record shared by every upstream provider.

use serde::{Deserialize, Serialize};

/// Maximum number of cast members kept on a [`MovieDetails`].
pub const TOP_CAST_LIMIT: usize = 5;

/// A movie as it appears in listings (home page, search results, API lists).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Provider id. TMDB ids are stringified numbers, OMDB ids are IMDb ids (`tt…`).
    pub id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub overview: Option<String>,
    #[serde(default)]
    pub directors: Vec<String>,
}

impl MovieSummary {
    pub fn year(&self) -> Option<String> {
        self.release_date.as_deref().and_then(release_year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

/// A video attached to a movie, typically a YouTube trailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trailer {
    pub name: String,
    pub key: String,
    pub site: String,
}

impl Trailer {
    /// Watch URL for the trailer, when the hosting site is known.
    pub fn url(&self) -> Option<String> {
        match self.site.as_str() {
            "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            "Vimeo" => Some(format!("https://vimeo.com/{}", self.key)),
            _ => None,
        }
    }
}

/// A labelled piece of extra information (awards, box office, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub label: String,
    pub value: String,
}

/// Full movie record rendered on the details page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub top_cast: Vec<String>,
    pub imdb_id: Option<String>,
    pub trailer: Option<Trailer>,
    #[serde(default)]
    pub facts: Vec<Fact>,
}

impl MovieDetails {
    /// Listing view of this movie.
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            poster_url: self.poster_url.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
            overview: self.overview.clone(),
            directors: self.directors.clone(),
        }
    }

    pub fn year(&self) -> Option<String> {
        self.release_date.as_deref().and_then(release_year)
    }
}

/// One page of movie results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<MovieSummary>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl SearchPage {
    /// A page with no results, used when the upstream has nothing (or failed).
    pub fn empty(page: u32) -> Self {
        Self {
            results: Vec::new(),
            page,
            total_pages: 0,
            total_results: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Extract the year from a release date.
///
/// Accepts `2010-07-16` (TMDB), `16 Jul 2010` (OMDB `Released`) and `2010` or
/// `2010–2012` (OMDB `Year`). Returns the first run of four ASCII digits.
pub fn release_year(date: &str) -> Option<String> {
    let bytes = date.as_bytes();
    bytes
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .map(|start| date[start..start + 4].to_string())
}

/// Treat empty or whitespace-only strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}
