//! Movie entity model, DTOs and field validation.

use movify_core::runtime::Runtime;
use movify_core::types::{DbId, Timestamp};
use movify_core::validator::{unique, Validator};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::genre::{sanitize_genres, Genre};

pub const MAX_TITLE_BYTES: usize = 500;
pub const MIN_GENRES: usize = 1;
pub const MAX_GENRES: usize = 5;

/// A movie with its genres, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_tmdb: Option<i64>,
    pub title: String,
    pub overview: String,
    pub release_date: String,
    #[serde(skip_serializing_if = "Runtime::is_unset")]
    pub runtime: Runtime,
    pub popularity: f64,
    pub poster_path: String,
    pub genres: Vec<Genre>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A `movies` row joined with its aggregated genre columns.
#[derive(Debug, FromRow)]
pub(crate) struct MovieRow {
    id: DbId,
    id_tmdb: Option<i64>,
    title: String,
    overview: String,
    release_date: String,
    #[sqlx(try_from = "i32")]
    runtime: Runtime,
    popularity: f64,
    poster_path: String,
    created_at: Timestamp,
    updated_at: Timestamp,
    genre_ids: Option<Vec<Option<DbId>>>,
    genre_tmdb_ids: Option<Vec<Option<i64>>>,
    genre_names: Option<Vec<Option<String>>>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            id_tmdb: row.id_tmdb,
            title: row.title,
            overview: row.overview,
            release_date: row.release_date,
            runtime: row.runtime,
            popularity: row.popularity,
            poster_path: row.poster_path,
            genres: sanitize_genres(row.genre_ids, row.genre_tmdb_ids, row.genre_names),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A search result row: the movie plus the pre-pagination match count.
#[derive(Debug, FromRow)]
pub(crate) struct MovieSearchRow {
    pub total_records: i64,
    #[sqlx(flatten)]
    pub movie: MovieRow,
}

/// Full writable field set of a movie.
///
/// Used as the create body and as the write-back document for updates.
/// Missing fields default to empty values so validation reports them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NewMovie {
    pub id_tmdb: Option<i64>,
    pub title: String,
    pub overview: String,
    pub release_date: String,
    pub runtime: Runtime,
    pub popularity: f64,
    pub poster_path: String,
    pub genres: Option<Vec<String>>,
}

impl NewMovie {
    /// Genre names in display order; empty when none were supplied.
    pub fn genre_names(&self) -> &[String] {
        self.genres.as_deref().unwrap_or_default()
    }
}

impl From<&Movie> for NewMovie {
    fn from(movie: &Movie) -> Self {
        NewMovie {
            id_tmdb: movie.id_tmdb,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            release_date: movie.release_date.clone(),
            runtime: movie.runtime,
            popularity: movie.popularity,
            poster_path: movie.poster_path.clone(),
            genres: Some(movie.genres.iter().map(|g| g.name.clone()).collect()),
        }
    }
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMovie {
    pub id_tmdb: Option<i64>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<Runtime>,
    pub popularity: Option<f64>,
    pub poster_path: Option<String>,
    pub genres: Option<Vec<String>>,
}

impl UpdateMovie {
    /// Overlay the present fields onto `current`, producing the document to
    /// re-validate and write back.
    pub fn apply_to(self, current: &Movie) -> NewMovie {
        let mut next = NewMovie::from(current);
        if let Some(id_tmdb) = self.id_tmdb {
            next.id_tmdb = Some(id_tmdb);
        }
        if let Some(title) = self.title {
            next.title = title;
        }
        if let Some(overview) = self.overview {
            next.overview = overview;
        }
        if let Some(release_date) = self.release_date {
            next.release_date = release_date;
        }
        if let Some(runtime) = self.runtime {
            next.runtime = runtime;
        }
        if let Some(popularity) = self.popularity {
            next.popularity = popularity;
        }
        if let Some(poster_path) = self.poster_path {
            next.poster_path = poster_path;
        }
        if let Some(genres) = self.genres {
            next.genres = Some(genres);
        }
        next
    }
}

/// Record every field violation of `movie` on `v`.
pub fn validate_movie(v: &mut Validator, movie: &NewMovie) {
    v.check(
        movie.id_tmdb.map_or(true, |id| id > 0),
        "id_tmdb",
        "must be a positive integer",
    );

    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(!movie.overview.is_empty(), "overview", "must be provided");
    v.check(!movie.release_date.is_empty(), "release_date", "must be provided");

    v.check(!movie.runtime.is_unset(), "runtime", "must be provided");
    v.check(movie.runtime.minutes() > 0, "runtime", "must be a positive integer");

    v.check(movie.popularity != 0.0, "popularity", "must be provided");
    v.check(movie.popularity > 0.0, "popularity", "must be a positive number");

    v.check(!movie.poster_path.is_empty(), "poster_path", "must be provided");

    let genres = movie.genre_names();
    v.check(movie.genres.is_some(), "genres", "must be provided");
    v.check(genres.len() >= MIN_GENRES, "genres", "must contain at least 1 genre");
    v.check(genres.len() <= MAX_GENRES, "genres", "must not contain more than 5 genres");
    v.check(unique(genres), "genres", "must not contain duplicate values");
    v.check(
        genres.iter().all(|g| !g.trim().is_empty()),
        "genres",
        "must not contain blank values",
    );
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn casablanca() -> NewMovie {
        NewMovie {
            id_tmdb: Some(289),
            title: "Casablanca".into(),
            overview: "In Casablanca, Morocco in December 1941...".into(),
            release_date: "1942-11-26".into(),
            runtime: Runtime::new(102),
            popularity: 10.5,
            poster_path: "/p.jpg".into(),
            genres: Some(vec!["Drama".into()]),
        }
    }

    fn errors(movie: &NewMovie) -> Validator {
        let mut v = Validator::new();
        validate_movie(&mut v, movie);
        v
    }

    fn stored(movie: &NewMovie) -> Movie {
        let now = Utc::now();
        Movie {
            id: 7,
            id_tmdb: movie.id_tmdb,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            release_date: movie.release_date.clone(),
            runtime: movie.runtime,
            popularity: movie.popularity,
            poster_path: movie.poster_path.clone(),
            genres: movie
                .genre_names()
                .iter()
                .enumerate()
                .map(|(i, name)| Genre {
                    id: i as DbId + 1,
                    id_tmdb: None,
                    name: name.clone(),
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    // -- validate_movie ------------------------------------------------------

    #[test]
    fn valid_movie_passes() {
        assert!(errors(&casablanca()).is_valid());
    }

    #[test]
    fn external_id_is_optional() {
        let movie = NewMovie { id_tmdb: None, ..casablanca() };
        assert!(errors(&movie).is_valid());
    }

    #[test]
    fn non_positive_external_id_rejected() {
        let movie = NewMovie { id_tmdb: Some(0), ..casablanca() };
        assert_eq!(errors(&movie).errors().get("id_tmdb"), Some("must be a positive integer"));
    }

    #[test]
    fn empty_document_reports_every_field() {
        let v = errors(&NewMovie::default());
        let e = v.errors();
        assert_eq!(e.get("title"), Some("must be provided"));
        assert_eq!(e.get("overview"), Some("must be provided"));
        assert_eq!(e.get("release_date"), Some("must be provided"));
        assert_eq!(e.get("runtime"), Some("must be provided"));
        assert_eq!(e.get("popularity"), Some("must be provided"));
        assert_eq!(e.get("poster_path"), Some("must be provided"));
        assert_eq!(e.get("genres"), Some("must be provided"));
        assert_eq!(e.len(), 7);
    }

    #[test]
    fn title_length_limit_in_bytes() {
        let movie = NewMovie { title: "a".repeat(500), ..casablanca() };
        assert!(errors(&movie).is_valid());

        let movie = NewMovie { title: "a".repeat(501), ..casablanca() };
        assert_eq!(
            errors(&movie).errors().get("title"),
            Some("must not be more than 500 bytes long")
        );

        // 250 two-byte characters is 500 bytes; one more tips it over.
        let movie = NewMovie { title: "é".repeat(251), ..casablanca() };
        assert!(!errors(&movie).is_valid());
    }

    #[test]
    fn negative_runtime_rejected() {
        let movie = NewMovie { runtime: Runtime::new(-10), ..casablanca() };
        assert_eq!(errors(&movie).errors().get("runtime"), Some("must be a positive integer"));
    }

    #[test]
    fn negative_popularity_rejected() {
        let movie = NewMovie { popularity: -1.5, ..casablanca() };
        assert_eq!(
            errors(&movie).errors().get("popularity"),
            Some("must be a positive number")
        );
    }

    #[test]
    fn empty_genre_list_rejected() {
        let movie = NewMovie { genres: Some(vec![]), ..casablanca() };
        assert_eq!(errors(&movie).errors().get("genres"), Some("must contain at least 1 genre"));
    }

    #[test]
    fn too_many_genres_rejected() {
        let genres = ["Drama", "War", "Romance", "Crime", "History", "Thriller"]
            .map(String::from)
            .to_vec();
        let movie = NewMovie { genres: Some(genres), ..casablanca() };
        assert_eq!(
            errors(&movie).errors().get("genres"),
            Some("must not contain more than 5 genres")
        );
    }

    #[test]
    fn five_genres_allowed() {
        let genres = ["Drama", "War", "Romance", "Crime", "History"].map(String::from).to_vec();
        let movie = NewMovie { genres: Some(genres), ..casablanca() };
        assert!(errors(&movie).is_valid());
    }

    #[test]
    fn duplicate_genres_rejected() {
        let genres = vec!["Drama".into(), "War".into(), "Drama".into()];
        let movie = NewMovie { genres: Some(genres), ..casablanca() };
        assert_eq!(
            errors(&movie).errors().get("genres"),
            Some("must not contain duplicate values")
        );
    }

    #[test]
    fn blank_genre_rejected() {
        let movie = NewMovie { genres: Some(vec!["  ".into()]), ..casablanca() };
        assert_eq!(errors(&movie).errors().get("genres"), Some("must not contain blank values"));
    }

    // -- deserialization -----------------------------------------------------

    #[test]
    fn create_body_deserializes() {
        let movie: NewMovie = serde_json::from_value(serde_json::json!({
            "title": "Casablanca",
            "overview": "...",
            "release_date": "1942-11-26",
            "runtime": 102,
            "popularity": 10.5,
            "poster_path": "/p.jpg",
            "genres": ["Drama"],
        }))
        .unwrap();
        assert_eq!(movie.runtime, Runtime::new(102));
        assert_eq!(movie.genre_names(), ["Drama".to_string()]);
        assert_eq!(movie.id_tmdb, None);
    }

    #[test]
    fn missing_genres_is_none() {
        let movie: NewMovie = serde_json::from_value(serde_json::json!({ "title": "x" })).unwrap();
        assert_eq!(movie.genres, None);
    }

    #[test]
    fn null_runtime_decodes_as_unset_and_fails_validation() {
        let movie: NewMovie = serde_json::from_value(serde_json::json!({
            "title": "Casablanca",
            "overview": "...",
            "release_date": "1942-11-26",
            "runtime": null,
            "popularity": 10.5,
            "poster_path": "/p.jpg",
            "genres": ["Drama"],
        }))
        .unwrap();
        assert!(movie.runtime.is_unset());

        let v = errors(&movie);
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors().get("runtime"), Some("must be provided"));
    }

    #[test]
    fn null_runtime_in_patch_keeps_stored_value() {
        let current = stored(&casablanca());
        let patch: UpdateMovie =
            serde_json::from_value(serde_json::json!({ "runtime": null })).unwrap();
        assert_eq!(patch.apply_to(&current).runtime, Runtime::new(102));
    }

    #[test]
    fn malformed_runtime_string_fails_decode() {
        let result = serde_json::from_value::<UpdateMovie>(serde_json::json!({
            "runtime": "-5 mins"
        }));
        assert!(result.is_err());
    }

    // -- UpdateMovie ---------------------------------------------------------

    #[test]
    fn empty_patch_keeps_everything() {
        let current = stored(&casablanca());
        let next = UpdateMovie::default().apply_to(&current);
        assert_eq!(next, casablanca());
    }

    #[test]
    fn patch_overrides_present_fields_only() {
        let current = stored(&casablanca());
        let patch: UpdateMovie = serde_json::from_value(serde_json::json!({
            "title": "Casablanca (Restored)",
            "runtime": "103 mins",
            "genres": ["Drama", "Romance"],
        }))
        .unwrap();

        let next = patch.apply_to(&current);
        assert_eq!(next.title, "Casablanca (Restored)");
        assert_eq!(next.runtime, Runtime::new(103));
        assert_eq!(next.genre_names(), ["Drama".to_string(), "Romance".to_string()]);
        assert_eq!(next.overview, current.overview);
        assert_eq!(next.popularity, current.popularity);
        assert_eq!(next.id_tmdb, Some(289));
    }

    #[test]
    fn patched_document_is_revalidated() {
        let current = stored(&casablanca());
        let patch = UpdateMovie {
            genres: Some(vec![]),
            ..UpdateMovie::default()
        };
        let next = patch.apply_to(&current);
        assert!(!errors(&next).is_valid());
    }

    // -- serialization -------------------------------------------------------

    #[test]
    fn movie_serializes_rendered_runtime() {
        let json = serde_json::to_value(stored(&casablanca())).unwrap();
        assert_eq!(json["runtime"], "102 mins");
        assert_eq!(json["genres"][0]["name"], "Drama");
        assert!(json["genres"][0].get("id_tmdb").is_none());
    }

    #[test]
    fn unset_runtime_is_omitted() {
        let movie = NewMovie { runtime: Runtime::default(), ..casablanca() };
        let json = serde_json::to_value(stored(&movie)).unwrap();
        assert!(json.get("runtime").is_none());
    }
}
