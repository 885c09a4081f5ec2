//! Route definitions for the `/outbreaks` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::outbreak;
use crate::state::AppState;

/// Routes mounted at `/outbreaks`.
///
/// ```text
/// GET    /                 -> list_outbreaks
/// POST   /detect           -> detect
/// GET    /{id}             -> get_outbreak
/// PUT    /{id}/status      -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(outbreak::list_outbreaks))
        .route("/detect", post(outbreak::detect))
        .route("/{id}", get(outbreak::get_outbreak))
        .route("/{id}/status", put(outbreak::update_status))
}
