//! Handlers for the `/cases` resource: intake and listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use epiwatch_core::case::{CaseFilter, CaseRecord, CaseStatus, NewCase, PreparedCase};
use epiwatch_core::error::CoreError;
use epiwatch_core::types::CalendarDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::query::clamp_limit;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_LIMIT: i64 = 100;
const DEFAULT_LIMIT: i64 = 10;

/// Query parameters for `GET /cases`.
#[derive(Debug, Deserialize)]
pub struct CaseListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// `POST /cases` accepts a single case object or an array of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CaseIntake {
    Batch(Vec<NewCase>),
    Single(NewCase),
}

/// Mirrors the shape of the request: one record or a list.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreatedCases {
    Batch(Vec<CaseRecord>),
    Single(CaseRecord),
}

/// POST /api/v1/cases
///
/// Validates every case before inserting any; the batch is stored atomically.
pub async fn create_cases(
    State(state): State<AppState>,
    Json(intake): Json<CaseIntake>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedCases>>)> {
    let today = Utc::now().date_naive();

    let created = match intake {
        CaseIntake::Single(case) => {
            let prepared = case.into_prepared(today)?;
            let mut records = state.cases.insert_cases(vec![prepared]).await?;
            let record = records.pop().ok_or_else(|| {
                AppError::InternalError("case store returned no record for insert".into())
            })?;
            CreatedCases::Single(record)
        }
        CaseIntake::Batch(cases) => {
            if cases.is_empty() {
                return Err(AppError::BadRequest("Case batch must not be empty".into()));
            }
            let prepared = prepare_batch(cases, today)?;
            CreatedCases::Batch(state.cases.insert_cases(prepared).await?)
        }
    };

    let count = match &created {
        CreatedCases::Batch(records) => records.len(),
        CreatedCases::Single(_) => 1,
    };
    tracing::info!(count, "Cases recorded");

    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

/// Prepare every case, naming the offending index on the first failure.
fn prepare_batch(
    cases: Vec<NewCase>,
    today: CalendarDate,
) -> Result<Vec<PreparedCase>, CoreError> {
    cases
        .into_iter()
        .enumerate()
        .map(|(index, case)| {
            case.into_prepared(today).map_err(|err| match err {
                CoreError::Validation(msg) => CoreError::Validation(format!("cases[{index}]: {msg}")),
                other => other,
            })
        })
        .collect()
}

/// GET /api/v1/cases
///
/// Most recently reported first. `limit` defaults to 10, capped at 100.
pub async fn list_cases(
    State(state): State<AppState>,
    Query(params): Query<CaseListQuery>,
) -> AppResult<Json<DataResponse<Vec<CaseRecord>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<CaseStatus>)
        .transpose()?;
    let filter = CaseFilter {
        status,
        limit: clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
    };

    let cases = state.cases.list_cases(&filter).await?;
    Ok(Json(DataResponse::new(cases)))
}
