//! Movie search criteria.
//!
//! Title matching is delegated to PostgreSQL full-text search
//! (`plainto_tsquery('simple', ..)`), which tokenizes raw input itself, so
//! the title is only whitespace-normalized here. Genre filtering is set
//! containment: a movie matches when it carries every requested genre.

/// Title text and required genres for a movie listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieSearch {
    pub title: String,
    pub genres: Vec<String>,
}

impl MovieSearch {
    pub fn new(title: &str, genres: Vec<String>) -> Self {
        Self {
            title: normalize_title(title),
            genres,
        }
    }
}

/// Trim and collapse runs of whitespace. Empty input stays empty (match all).
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a comma-separated list, trimming items and dropping empty ones.
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
