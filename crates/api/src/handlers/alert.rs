//! Handlers for the `/alerts` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use epiwatch_core::alert::AlertRecord;
use epiwatch_core::error::CoreError;
use epiwatch_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::query::{clamp_limit, clamp_offset};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum page size for alert listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for alert listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /alerts`.
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// If `true`, return only unread alerts. Defaults to `false`.
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

/// GET /api/v1/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertQuery>,
) -> AppResult<Json<DataResponse<Vec<AlertRecord>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let unread_only = params.unread_only.unwrap_or(false);

    let alerts = state.alerts.list_alerts(unread_only, limit, offset).await?;
    Ok(Json(DataResponse::new(alerts)))
}

/// POST /api/v1/alerts/{id}/read
///
/// Returns 204 No Content, or 404 if no alert has this id.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(alert_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = state.alerts.mark_read(alert_id).await?;

    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Alert",
            id: alert_id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/alerts/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = state.alerts.mark_all_read().await?;
    Ok(Json(DataResponse::new(MarkedRead { marked_read })))
}

/// GET /api/v1/alerts/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = state.alerts.unread_count().await?;
    Ok(Json(DataResponse::new(UnreadCount { count })))
}
