//! Pagination and sort intent for list endpoints.
//!
//! Client-supplied sort keys are never interpolated into SQL. A key is first
//! checked against the server-side safelist during validation, then resolved
//! to a [`SortColumn`] whose SQL text is a compile-time constant.

use serde::Serialize;

use crate::validator::{permitted_value, Validator};

// ---------------------------------------------------------------------------
// Bounds and defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const DEFAULT_SORT: &str = "id";

/// Upper bound for `page`, and for `page * page_size` (bounds OFFSET cost).
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Prefix marking a descending sort key.
pub const DESCENDING_MARKER: char = '-';

/// Sort keys accepted by the movie list endpoint.
pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "id",
    "title",
    "release_date",
    "runtime",
    "popularity",
    "-id",
    "-title",
    "-release_date",
    "-runtime",
    "-popularity",
];

// ---------------------------------------------------------------------------
// Sort resolution
// ---------------------------------------------------------------------------

/// Columns a movie listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Title,
    ReleaseDate,
    Runtime,
    Popularity,
}

impl SortColumn {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "release_date" => Some(Self::ReleaseDate),
            "runtime" => Some(Self::Runtime),
            "popularity" => Some(Self::Popularity),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::ReleaseDate => "release_date",
            Self::Runtime => "runtime",
            Self::Popularity => "popularity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Requested page, page size and sort key, plus the safelist the key is
/// checked against.
#[derive(Debug, Clone)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
            sort_safelist: MOVIE_SORT_SAFELIST,
        }
    }
}

impl Filters {
    /// Resolve the requested key to a column.
    ///
    /// # Panics
    ///
    /// Panics if the key is not in the safelist. [`validate_filters`] must
    /// have rejected such a key before the filters reach a query.
    pub fn sort_column(&self) -> SortColumn {
        if permitted_value(self.sort.as_str(), self.sort_safelist) {
            let bare = self
                .sort
                .strip_prefix(DESCENDING_MARKER)
                .unwrap_or(&self.sort);
            if let Some(column) = SortColumn::from_name(bare) {
                return column;
            }
        }
        panic!("unsafe sort parameter: {}", self.sort);
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with(DESCENDING_MARKER) {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Check page bounds and that the sort key is safelisted.
pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
    if f.page_size > 0 {
        v.check(
            f.page <= MAX_PAGE / f.page_size,
            "page",
            "must not reach past the 10 millionth record",
        );
    }
    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        f.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    v.check(
        permitted_value(f.sort.as_str(), f.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Position of a page within the full matching result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

/// Derive pagination metadata from the pre-pagination match count.
///
/// All fields are zero when nothing matched.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
