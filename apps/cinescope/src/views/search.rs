//! Search results page.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};

use crate::api::movies::{page_number, search_text, SearchQuery};
use crate::AppState;

use super::utils::{chunk_rows, format_count};
use super::{MovieCard, SiteView};

#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub site: SiteView,
    pub query: String,
    pub rows: Vec<Vec<MovieCard>>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: String,
    pub previous_href: String,
    pub next_href: String,
}

fn page_href(query: &str, page: u32) -> String {
    format!("/search?query={}&page={}", urlencoding::encode(query), page)
}

/// GET /search?query=&page=
pub async fn page(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let Some(query) = search_text(params.query.as_deref()) else {
        return Redirect::to("/").into_response();
    };
    let page = page_number(params.page.as_deref());

    let results = state.catalog.search(query, page).await;
    let cards: Vec<MovieCard> = results.results.iter().map(MovieCard::from).collect();

    let previous_href = if results.has_previous() {
        page_href(query, page - 1)
    } else {
        String::new()
    };
    let next_href = if results.has_next() {
        page_href(query, page + 1)
    } else {
        String::new()
    };

    SearchTemplate {
        site: state.site(),
        query: query.to_string(),
        rows: chunk_rows(&cards, state.config.site.row_size),
        page,
        total_pages: results.total_pages,
        total_results: format_count(results.total_results),
        previous_href,
        next_href,
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_href_encodes_query() {
        assert_eq!(
            page_href("star wars & co", 2),
            "/search?query=star%20wars%20%26%20co&page=2"
        );
    }
}
