//! Query-string parsing for list endpoints.
//!
//! Values arrive as raw strings so a malformed number becomes a field
//! violation on the same [`Validator`] pass as the range checks, rather than
//! an opaque extractor rejection.

use movify_core::filters::{Filters, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT, MOVIE_SORT_SAFELIST};
use movify_core::search::{parse_csv, MovieSearch};
use movify_core::validator::Validator;
use serde::Deserialize;

/// `GET /movies?title=&genres=&page=&page_size=&sort=`
#[derive(Debug, Default, Deserialize)]
pub struct ListMoviesParams {
    pub title: Option<String>,
    /// Comma-separated genre names.
    pub genres: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

impl ListMoviesParams {
    /// Split into search criteria and (not yet validated) filters, recording
    /// non-integer `page`/`page_size` on `v`.
    pub fn into_search(self, v: &mut Validator) -> (MovieSearch, Filters) {
        let search = MovieSearch::new(
            self.title.as_deref().unwrap_or(""),
            self.genres.as_deref().map(parse_csv).unwrap_or_default(),
        );

        let filters = Filters {
            page: read_int(self.page.as_deref(), "page", DEFAULT_PAGE, v),
            page_size: read_int(self.page_size.as_deref(), "page_size", DEFAULT_PAGE_SIZE, v),
            sort: self.sort.unwrap_or_else(|| DEFAULT_SORT.to_string()),
            sort_safelist: MOVIE_SORT_SAFELIST,
        };

        (search, filters)
    }
}

/// Parse an optional integer parameter, falling back to `default` when it is
/// absent or empty.
fn read_int(raw: Option<&str>, key: &str, default: i64, v: &mut Validator) -> i64 {
    match raw {
        None | Some("") => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            v.add_error(key, "must be an integer value");
            default
        }),
    }
}
