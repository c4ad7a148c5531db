//! Repository for the `genres` table.

use sqlx::PgPool;

use crate::error::{bounded, StoreError, ROW_TIMEOUT};
use crate::models::genre::Genre;

/// Provides read access to genres. Genres are created implicitly when a
/// movie is written with a name not seen before.
pub struct GenreRepo;

impl GenreRepo {
    /// List all genres ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Genre>, StoreError> {
        bounded("genre.list", ROW_TIMEOUT, async {
            let genres = sqlx::query_as::<_, Genre>(
                "SELECT id, id_tmdb, name FROM genres ORDER BY name, id",
            )
            .fetch_all(pool)
            .await?;
            Ok(genres)
        })
        .await
    }
}
