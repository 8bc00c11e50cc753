//! Movie details page.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use movie_metadata::{Fact, MovieDetails};

use crate::AppState;

use super::utils::{format_count, format_rating, format_runtime, join_names};
use super::{PageError, SiteView};

pub struct GenreLink {
    pub name: String,
    pub href: String,
}

/// Details page view of a movie. Missing values are empty strings.
pub struct MovieView {
    pub title: String,
    pub year: String,
    pub runtime: String,
    pub rating: String,
    pub vote_count: String,
    pub tagline: String,
    pub overview: String,
    pub poster_url: String,
    pub backdrop_url: String,
    pub genres: Vec<GenreLink>,
    pub director_label: String,
    pub directors: String,
    pub cast: String,
    pub trailer_url: String,
    pub imdb_url: String,
    pub facts: Vec<Fact>,
}

impl From<MovieDetails> for MovieView {
    fn from(movie: MovieDetails) -> Self {
        let year = movie.year().unwrap_or_default();
        let director_label = if movie.directors.len() > 1 {
            "Directors"
        } else {
            "Director"
        };
        // Fall back to the poster so the hero always has an image
        let backdrop_url = movie
            .backdrop_url
            .clone()
            .or_else(|| movie.poster_url.clone())
            .unwrap_or_default();

        Self {
            year,
            runtime: format_runtime(movie.runtime_minutes),
            rating: format_rating(movie.vote_average),
            vote_count: format_count(movie.vote_count),
            tagline: movie.tagline.unwrap_or_default(),
            overview: movie
                .overview
                .unwrap_or_else(|| "No description available.".to_string()),
            poster_url: movie.poster_url.unwrap_or_default(),
            backdrop_url,
            genres: movie
                .genres
                .into_iter()
                .map(|g| GenreLink {
                    href: format!("/search?query={}", urlencoding::encode(&g.name)),
                    name: g.name,
                })
                .collect(),
            director_label: director_label.to_string(),
            directors: join_names(&movie.directors),
            cast: join_names(&movie.top_cast),
            trailer_url: movie
                .trailer
                .as_ref()
                .and_then(|t| t.url())
                .unwrap_or_default(),
            imdb_url: movie
                .imdb_id
                .map(|id| format!("https://www.imdb.com/title/{}/", id))
                .unwrap_or_default(),
            facts: movie.facts,
            title: movie.title,
        }
    }
}

#[derive(Template)]
#[template(path = "pages/movie.html")]
pub struct MovieTemplate {
    pub site: SiteView,
    pub movie: MovieView,
}

/// GET /movie/:id
pub async fn page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<MovieTemplate, PageError> {
    match state.catalog.details(&id).await {
        Ok(movie) => Ok(MovieTemplate {
            site: state.site(),
            movie: MovieView::from(movie),
        }),
        Err(error) => Err(PageError {
            site: state.site(),
            path: format!("/movie/{}", id),
            error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_metadata::{Genre, Trailer};

    fn details() -> MovieDetails {
        MovieDetails {
            id: "603".to_string(),
            title: "The Matrix".to_string(),
            release_date: Some("1999-03-31".to_string()),
            poster_url: Some("https://img/poster.jpg".to_string()),
            vote_average: 8.217,
            vote_count: 24512,
            runtime_minutes: Some(136),
            genres: vec![Genre {
                id: "878".to_string(),
                name: "Science Fiction".to_string(),
            }],
            directors: vec!["Lana Wachowski".to_string(), "Lilly Wachowski".to_string()],
            top_cast: vec!["Keanu Reeves".to_string()],
            imdb_id: Some("tt0133093".to_string()),
            trailer: Some(Trailer {
                name: "Trailer".to_string(),
                key: "vKQi3bBA1y8".to_string(),
                site: "YouTube".to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_movie_view() {
        let view = MovieView::from(details());

        assert_eq!(view.year, "1999");
        assert_eq!(view.runtime, "2h 16m");
        assert_eq!(view.rating, "8.2");
        assert_eq!(view.vote_count, "24,512");
        assert_eq!(view.director_label, "Directors");
        assert_eq!(view.directors, "Lana Wachowski, Lilly Wachowski");
        assert_eq!(view.backdrop_url, "https://img/poster.jpg");
        assert_eq!(view.genres[0].href, "/search?query=Science%20Fiction");
        assert_eq!(view.imdb_url, "https://www.imdb.com/title/tt0133093/");
        assert!(view.trailer_url.contains("vKQi3bBA1y8"));
        assert_eq!(view.overview, "No description available.");
    }
}
