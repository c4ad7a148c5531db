//! Route definitions for the `/genres` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::genres;
use crate::state::AppState;

/// Routes mounted at `/genres`.
///
/// ```text
/// GET    /        -> list
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(genres::list))
}
