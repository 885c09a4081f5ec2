//! Handlers for the `/outbreaks` resource, including the detection trigger.

use axum::extract::{Path, Query, State};
use axum::Json;
use epiwatch_core::detection::DetectionReport;
use epiwatch_core::error::CoreError;
use epiwatch_core::outbreak::{OutbreakRecord, OutbreakStatus};
use epiwatch_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /outbreaks`.
#[derive(Debug, Deserialize)]
pub struct OutbreakListQuery {
    /// One of `active`, `contained`, `resolved`. All statuses when absent.
    pub status: Option<String>,
}

/// Request body for `PUT /outbreaks/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateOutbreakStatus {
    pub status: String,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Outbreak",
        id,
    })
}

/// POST /api/v1/outbreaks/detect
///
/// Run detection now and return the report. Per-cluster failures are part
/// of a 200 response; only a failed case-window read is an error.
pub async fn detect(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DetectionReport>>> {
    let report = state.run_detection().await?;

    tracing::info!(
        outbreaks_detected = report.outbreaks_detected,
        outbreaks_updated = report.outbreaks_updated,
        alerts_created = report.alerts_created,
        failures = report.failures.len(),
        "Outbreak detection triggered via API"
    );

    Ok(Json(DataResponse::new(report)))
}

/// GET /api/v1/outbreaks
pub async fn list_outbreaks(
    State(state): State<AppState>,
    Query(params): Query<OutbreakListQuery>,
) -> AppResult<Json<DataResponse<Vec<OutbreakRecord>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<OutbreakStatus>)
        .transpose()?;

    let outbreaks = state.outbreaks.list_outbreaks(status).await?;
    Ok(Json(DataResponse::new(outbreaks)))
}

/// GET /api/v1/outbreaks/{id}
pub async fn get_outbreak(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OutbreakRecord>>> {
    let outbreak = state
        .outbreaks
        .get_outbreak(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(outbreak)))
}

/// PUT /api/v1/outbreaks/{id}/status
///
/// Move an outbreak to `contained` or `resolved`. Backward transitions are
/// rejected with 400; a cluster still above threshold gets a fresh outbreak
/// on the next detection run instead.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOutbreakStatus>,
) -> AppResult<Json<DataResponse<OutbreakRecord>>> {
    let next: OutbreakStatus = input.status.parse()?;

    let current = state
        .outbreaks
        .get_outbreak(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    current.status.validate_transition(next)?;

    let updated = state
        .outbreaks
        .set_status(id, next)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        outbreak_id = id,
        from = %current.status,
        to = %next,
        "Outbreak status changed"
    );

    Ok(Json(DataResponse::new(updated)))
}
