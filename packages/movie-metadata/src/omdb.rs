//! OMDB (Open Movie Database) wire format.
//!
//! OMDB answers every request with HTTP 200 and signals failure through the
//! `Response` field (`"True"` / `"False"`). Fields are PascalCase strings, with
//! `"N/A"` standing for a missing value, and lists (directors, actors, genres)
//! are comma-separated.

use serde::Deserialize;

use crate::model::{
    non_empty, Fact, Genre, MovieDetails, MovieSummary, SearchPage, TOP_CAST_LIMIT,
};

/// OMDB returns ten search results per page.
pub const OMDB_PAGE_SIZE: u64 = 10;

const IMDB_SOURCE: &str = "Internet Movie Database";
const TAGLINE_CHARS: usize = 100;

/// Map OMDB's `"N/A"` placeholder (and empty strings) to `None`.
pub fn not_available(value: Option<String>) -> Option<String> {
    non_empty(value).filter(|v| v != "N/A")
}

/// Split an OMDB comma-separated list (`"Lana Wachowski, Lilly Wachowski"`).
pub fn split_list(value: Option<&str>) -> Vec<String> {
    match value {
        Some(v) if v != "N/A" => v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse a runtime such as `"148 min"`.
pub fn parse_runtime(value: &str) -> Option<u32> {
    let minutes = value.trim().trim_end_matches("min").trim();
    match minutes.parse::<u32>() {
        Ok(0) => None,
        Ok(m) => Some(m),
        Err(_) => {
            tracing::debug!(runtime = %value, "Unrecognised OMDB runtime");
            None
        }
    }
}

/// Parse a rating such as `"8.8/10"` or `"8.8"` onto a 0-10 scale.
pub fn parse_rating(value: &str) -> Option<f64> {
    value
        .split('/')
        .next()
        .and_then(|v| v.trim().parse::<f64>().ok())
}

/// Parse a vote count such as `"2,512,331"`.
pub fn parse_votes(value: &str) -> Option<u64> {
    value.replace(',', "").trim().parse().ok()
}

/// Stable genre id. OMDB only names genres, so the id is the md5 of the name.
pub fn genre_id(name: &str) -> String {
    format!("{:x}", md5::compute(name.as_bytes()))
}

/// Short tagline derived from the plot: the first 100 characters plus `...`.
pub fn tagline_from_plot(plot: &str) -> Option<String> {
    if plot.trim().is_empty() {
        return None;
    }
    let head: String = plot.chars().take(TAGLINE_CHARS).collect();
    Some(format!("{}...", head))
}

// =============================================================================
// Response Types
// =============================================================================

/// Response of a `?s=` search request.
#[derive(Debug, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchItem>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbSearchItem {
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(default)]
    pub poster: Option<String>,
}

/// Response of a `?i=` details request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbMovie {
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub awards: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub ratings: Vec<OmdbRating>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes", default)]
    pub imdb_votes: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    #[serde(rename = "BoxOffice", default)]
    pub box_office: Option<String>,
    #[serde(default)]
    pub production: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbRating {
    pub source: String,
    pub value: String,
}

// =============================================================================
// Normalization
// =============================================================================

impl OmdbSearchItem {
    /// Search hits carry no rating, overview or credits.
    pub fn into_summary(self) -> MovieSummary {
        MovieSummary {
            id: self.imdb_id,
            title: self.title,
            poster_url: not_available(self.poster),
            release_date: not_available(self.year),
            vote_average: 0.0,
            overview: None,
            directors: Vec::new(),
        }
    }
}

impl OmdbSearchResponse {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }

    pub fn into_search_page(self, page: u32) -> SearchPage {
        if !self.is_success() {
            return SearchPage::empty(page);
        }

        let total_results = self
            .total_results
            .as_deref()
            .and_then(parse_votes)
            .unwrap_or(0);
        let total_pages =
            u32::try_from(total_results.div_ceil(OMDB_PAGE_SIZE)).unwrap_or(u32::MAX);

        SearchPage {
            results: self.search.into_iter().map(OmdbSearchItem::into_summary).collect(),
            page,
            total_pages,
            total_results,
        }
    }
}

impl OmdbMovie {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }

    /// IMDb rating from the `Ratings` list, falling back to `imdbRating`.
    fn rating(&self) -> f64 {
        self.ratings
            .iter()
            .find(|r| r.source == IMDB_SOURCE)
            .and_then(|r| parse_rating(&r.value))
            .or_else(|| self.imdb_rating.as_deref().and_then(parse_rating))
            .unwrap_or(0.0)
    }

    /// Normalize a successful details response. Returns `None` when OMDB
    /// reported an error or the record has no id or title.
    pub fn into_details(self) -> Option<MovieDetails> {
        if !self.is_success() {
            return None;
        }

        let vote_average = self.rating();
        let vote_count = self.imdb_votes.as_deref().and_then(parse_votes).unwrap_or(0);
        let runtime_minutes = self.runtime.as_deref().and_then(parse_runtime);
        let directors = split_list(self.director.as_deref());
        let top_cast: Vec<String> = split_list(self.actors.as_deref())
            .into_iter()
            .take(TOP_CAST_LIMIT)
            .collect();
        let genres = split_list(self.genre.as_deref())
            .into_iter()
            .map(|name| Genre {
                id: genre_id(&name),
                name,
            })
            .collect();

        let facts = [
            ("Awards", self.awards),
            ("Box Office", self.box_office),
            ("Country", self.country),
            ("Language", self.language),
            ("Writer", self.writer),
            ("Production", self.production),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            not_available(value).map(|value| Fact {
                label: label.to_string(),
                value,
            })
        })
        .collect();

        let plot = not_available(self.plot);
        let tagline = plot.as_deref().and_then(tagline_from_plot);
        let imdb_id = not_available(self.imdb_id)?;
        let title = not_available(self.title)?;

        Some(MovieDetails {
            id: imdb_id.clone(),
            title,
            overview: plot,
            tagline,
            release_date: not_available(self.released).or_else(|| not_available(self.year)),
            poster_url: not_available(self.poster),
            backdrop_url: None,
            vote_average,
            vote_count,
            runtime_minutes,
            genres,
            directors,
            top_cast,
            imdb_id: Some(imdb_id),
            trailer: None,
            facts,
        })
    }
}
