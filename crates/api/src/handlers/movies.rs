//! Handlers for the `/movies` resource.
//!
//! Every write is validated in full before touching the store, so a client
//! sees all field violations in one response and nothing is partially
//! applied.

use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use movify_core::error::CoreError;
use movify_core::filters::validate_filters;
use movify_core::types::DbId;
use movify_core::validator::Validator;
use movify_db::models::movie::{validate_movie, Movie, NewMovie, UpdateMovie};
use movify_db::repositories::MovieRepo;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::query::ListMoviesParams;
use crate::response::{DataResponse, PaginatedResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Movie", id })
}

fn validate(input: &NewMovie) -> Result<(), CoreError> {
    let mut v = Validator::new();
    validate_movie(&mut v, input);
    v.finish()
}

/// POST /api/v1/movies
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewMovie>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;

    let movie = MovieRepo::create(&state.pool, &input).await?;
    tracing::info!(movie_id = movie.id, title = %movie.title, "Movie created");

    let location = format!("/api/v1/movies/{}", movie.id);
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(DataResponse { data: movie }),
    ))
}

/// GET /api/v1/movies
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListMoviesParams>,
) -> AppResult<Json<PaginatedResponse<Movie>>> {
    let mut v = Validator::new();
    let (search, filters) = params.into_search(&mut v);
    validate_filters(&mut v, &filters);
    v.finish()?;

    let (movies, metadata) =
        MovieRepo::search(&state.pool, &search, &filters, state.config.search_timeout()).await?;

    Ok(Json(PaginatedResponse {
        data: movies,
        metadata,
    }))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Movie>>> {
    let movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: movie }))
}

/// PATCH /api/v1/movies/{id}
///
/// Read-modify-write: absent fields keep their stored values, the merged
/// document is re-validated, then written back whole. Concurrent updates to
/// the same movie are last-writer-wins.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    JsonBody(patch): JsonBody<UpdateMovie>,
) -> AppResult<Json<DataResponse<Movie>>> {
    let current = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let next = patch.apply_to(&current);
    validate(&next)?;

    let movie = MovieRepo::update(&state.pool, id, &next)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(movie_id = id, "Movie updated");

    Ok(Json(DataResponse { data: movie }))
}

/// DELETE /api/v1/movies/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if MovieRepo::delete(&state.pool, id).await? {
        tracing::info!(movie_id = id, "Movie deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
