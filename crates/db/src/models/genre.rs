//! Genre entity model.

use movify_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A genre row from the `genres` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Genre {
    pub id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_tmdb: Option<i64>,
    pub name: String,
}

/// Rebuild a genre list from the parallel, per-element nullable arrays an
/// aggregated join produces.
///
/// Elements whose id or name is NULL are skipped: a sparse join result is
/// tolerated as missing data rather than treated as a decode failure. A NULL
/// array (no linked genres) yields an empty list.
pub fn sanitize_genres(
    ids: Option<Vec<Option<DbId>>>,
    tmdb_ids: Option<Vec<Option<i64>>>,
    names: Option<Vec<Option<String>>>,
) -> Vec<Genre> {
    let ids = ids.unwrap_or_default();
    let names = names.unwrap_or_default();
    let mut tmdb_ids = tmdb_ids.unwrap_or_default().into_iter();

    ids.into_iter()
        .zip(names)
        .filter_map(|(id, name)| {
            let id_tmdb = tmdb_ids.next().flatten();
            Some(Genre {
                id: id?,
                id_tmdb,
                name: name?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_arrays_yield_empty_list() {
        assert!(sanitize_genres(None, None, None).is_empty());
    }

    #[test]
    fn null_elements_are_skipped() {
        let genres = sanitize_genres(
            Some(vec![Some(1), None, Some(3)]),
            Some(vec![Some(18), None, None]),
            Some(vec![Some("Drama".into()), Some("Ghost".into()), Some("War".into())]),
        );
        assert_eq!(
            genres,
            vec![
                Genre { id: 1, id_tmdb: Some(18), name: "Drama".into() },
                Genre { id: 3, id_tmdb: None, name: "War".into() },
            ]
        );
    }

    #[test]
    fn missing_name_skips_element() {
        let genres = sanitize_genres(
            Some(vec![Some(1), Some(2)]),
            None,
            Some(vec![None, Some("Comedy".into())]),
        );
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].name, "Comedy");
        assert_eq!(genres[0].id_tmdb, None);
    }

    #[test]
    fn order_is_preserved() {
        let genres = sanitize_genres(
            Some(vec![Some(9), Some(2)]),
            None,
            Some(vec![Some("War".into()), Some("Drama".into())]),
        );
        let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["War", "Drama"]);
    }
}
