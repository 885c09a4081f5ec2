pub mod alert;
pub mod case;
pub mod dashboard;
pub mod health;
pub mod outbreak;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /outbreaks                    list (?status=)
/// /outbreaks/detect             run detection now (POST)
/// /outbreaks/{id}               get
/// /outbreaks/{id}/status        status transition (PUT)
///
/// /alerts                       list (?unread_only=&limit=&offset=)
/// /alerts/unread-count          unread count
/// /alerts/read-all              mark all read (POST)
/// /alerts/{id}/read             mark one read (POST)
///
/// /cases                        list (?status=&limit=), intake (POST)
///
/// /dashboard/summary            headline counts
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/outbreaks", outbreak::router())
        .nest("/alerts", alert::router())
        .nest("/cases", case::router())
        .nest("/dashboard", dashboard::router())
}
