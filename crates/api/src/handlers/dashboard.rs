//! Handler for the dashboard summary.

use axum::extract::State;
use axum::Json;
use epiwatch_core::case::CaseStatusCounts;
use epiwatch_core::outbreak::OutbreakStatus;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Headline numbers for the surveillance dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub cases: CaseStatusCounts,
    pub active_outbreaks: usize,
    pub unread_alerts: i64,
}

/// GET /api/v1/dashboard/summary
pub async fn summary(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let cases = state.cases.status_counts().await?;
    let active_outbreaks = state
        .outbreaks
        .list_outbreaks(Some(OutbreakStatus::Active))
        .await?
        .len();
    let unread_alerts = state.alerts.unread_count().await?;

    Ok(Json(DataResponse::new(DashboardSummary {
        cases,
        active_outbreaks,
        unread_alerts,
    })))
}
