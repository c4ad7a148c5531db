//! Repository for the `movies` table and its genre links.

use std::time::Duration;

use movify_core::filters::{calculate_metadata, Filters, Metadata};
use movify_core::search::MovieSearch;
use movify_core::types::DbId;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::error::{bounded, StoreError, ROW_TIMEOUT};
use crate::models::movie::{Movie, MovieRow, MovieSearchRow, NewMovie};

/// Default wall-clock budget for a search.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Movie columns plus the aggregated genre arrays.
const COLUMNS: &str = "\
    m.id, m.id_tmdb, m.title, m.overview, m.release_date, m.runtime, \
    m.popularity, m.poster_path, m.created_at, m.updated_at, \
    g.genre_ids, g.genre_tmdb_ids, g.genre_names";

/// `movies` with genres folded into per-movie arrays in display order.
///
/// Genre arrays are NULL for a movie without links, and may hold NULL
/// elements when a link has no matching genre row.
const SOURCE: &str = "\
    movies m \
    LEFT JOIN LATERAL ( \
        SELECT array_agg(gn.id ORDER BY mg.position) AS genre_ids, \
               array_agg(gn.id_tmdb ORDER BY mg.position) AS genre_tmdb_ids, \
               array_agg(gn.name ORDER BY mg.position) AS genre_names \
        FROM movie_genres mg \
        LEFT JOIN genres gn ON gn.id = mg.genre_id \
        WHERE mg.movie_id = m.id \
    ) g ON TRUE";

/// Provides CRUD and search operations for movies.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a new movie and link its genres, returning the stored record.
    ///
    /// A duplicate `id_tmdb` surfaces as [`StoreError::Conflict`].
    pub async fn create(pool: &PgPool, input: &NewMovie) -> Result<Movie, StoreError> {
        bounded("movie.create", ROW_TIMEOUT, async {
            let mut tx = pool.begin().await?;

            let id: DbId = sqlx::query_scalar(
                "INSERT INTO movies \
                    (id_tmdb, title, overview, release_date, runtime, popularity, poster_path) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING id",
            )
            .bind(input.id_tmdb)
            .bind(&input.title)
            .bind(&input.overview)
            .bind(&input.release_date)
            .bind(input.runtime.minutes())
            .bind(input.popularity)
            .bind(&input.poster_path)
            .fetch_one(&mut *tx)
            .await?;

            Self::set_genres_inner(&mut tx, id, input.genre_names()).await?;
            let row = Self::fetch_row(&mut *tx, id).await?.ok_or(sqlx::Error::RowNotFound)?;

            tx.commit().await?;
            tracing::debug!(movie_id = id, "Movie created");
            Ok(row.into())
        })
        .await
    }

    /// Find a movie by ID. Ids below 1 never exist and skip the round-trip.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Movie>, StoreError> {
        if id < 1 {
            return Ok(None);
        }

        bounded("movie.find_by_id", ROW_TIMEOUT, async {
            let row = Self::fetch_row(pool, id).await?;
            Ok(row.map(Movie::from))
        })
        .await
    }

    /// Replace every writable column of movie `id` and relink its genres.
    ///
    /// Returns `None` if no row with the given `id` exists, including when it
    /// was deleted after the caller read it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &NewMovie,
    ) -> Result<Option<Movie>, StoreError> {
        if id < 1 {
            return Ok(None);
        }

        bounded("movie.update", ROW_TIMEOUT, async {
            let mut tx = pool.begin().await?;

            let result = sqlx::query(
                "UPDATE movies SET \
                    id_tmdb = $2, title = $3, overview = $4, release_date = $5, \
                    runtime = $6, popularity = $7, poster_path = $8, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(input.id_tmdb)
            .bind(&input.title)
            .bind(&input.overview)
            .bind(&input.release_date)
            .bind(input.runtime.minutes())
            .bind(input.popularity)
            .bind(&input.poster_path)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Ok(None);
            }

            Self::set_genres_inner(&mut tx, id, input.genre_names()).await?;
            let row = Self::fetch_row(&mut *tx, id).await?;

            tx.commit().await?;
            Ok(row.map(Movie::from))
        })
        .await
    }

    /// Delete a movie by ID. Returns `true` if exactly one row was removed.
    ///
    /// Genre links go with it via `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, StoreError> {
        if id < 1 {
            return Ok(false);
        }

        bounded("movie.delete", ROW_TIMEOUT, async {
            let result = sqlx::query("DELETE FROM movies WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;
            Ok(result.rows_affected() == 1)
        })
        .await
    }

    /// Page through movies matching `search`, ordered by the resolved sort
    /// column with `id` as tie-break.
    ///
    /// The match count comes from a window over the same statement as the
    /// page, so both observe one snapshot. The count is read off the first
    /// returned row, so a page past the end yields no rows and all-zero
    /// [`Metadata`] (`total_records == 0`) even when earlier pages hold
    /// matches.
    ///
    /// `filters` must already have passed
    /// [`validate_filters`](movify_core::filters::validate_filters).
    pub async fn search(
        pool: &PgPool,
        search: &MovieSearch,
        filters: &Filters,
        budget: Duration,
    ) -> Result<(Vec<Movie>, Metadata), StoreError> {
        let query = format!(
            "SELECT count(*) OVER() AS total_records, {COLUMNS} \
             FROM {SOURCE} \
             WHERE ($1::text = '' OR to_tsvector('simple', m.title) @@ plainto_tsquery('simple', $1)) \
               AND (cardinality($2::text[]) = 0 OR g.genre_names @> $2::text[]) \
             ORDER BY m.{column} {direction}, m.id ASC \
             LIMIT $3 OFFSET $4",
            column = filters.sort_column().as_sql(),
            direction = filters.sort_direction().as_sql(),
        );

        let rows = bounded("movie.search", budget, async {
            let rows = sqlx::query_as::<_, MovieSearchRow>(&query)
                .bind(&search.title)
                .bind(&search.genres)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(pool)
                .await?;
            Ok(rows)
        })
        .await?;

        let total_records = rows.first().map_or(0, |r| r.total_records);
        let movies: Vec<Movie> = rows.into_iter().map(|r| r.movie.into()).collect();
        let metadata = calculate_metadata(total_records, filters.page, filters.page_size);

        tracing::debug!(
            title = %search.title,
            genres = ?search.genres,
            page = filters.page,
            page_size = filters.page_size,
            sort = %filters.sort,
            total_records,
            "Movie search executed"
        );

        Ok((movies, metadata))
    }

    async fn fetch_row<'e, E>(executor: E, id: DbId) -> Result<Option<MovieRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM {SOURCE} WHERE m.id = $1");
        sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Replace the genre links of `movie_id`, creating genres by name as
    /// needed. Link `position` keeps the input order.
    async fn set_genres_inner(
        tx: &mut Transaction<'_, Postgres>,
        movie_id: DbId,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM movie_genres WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&mut **tx)
            .await?;

        if names.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "WITH input AS ( \
                SELECT name, ord FROM unnest($2::text[]) WITH ORDINALITY AS t(name, ord) \
             ), \
             upserted AS ( \
                INSERT INTO genres (name) SELECT name FROM input \
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
                RETURNING id, name \
             ) \
             INSERT INTO movie_genres (movie_id, genre_id, position) \
             SELECT $1, u.id, i.ord::int FROM input i JOIN upserted u ON u.name = i.name",
        )
        .bind(movie_id)
        .bind(names)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
