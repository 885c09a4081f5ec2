use axum::routing::get;
use axum::Router;

use crate::handlers::case;
use crate::state::AppState;

/// Routes mounted at `/cases`.
///
/// ```text
/// GET    /    -> list_cases
/// POST   /    -> create_cases
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(case::list_cases).post(case::create_cases))
}
