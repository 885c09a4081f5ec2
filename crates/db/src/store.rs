//! [`PgStore`]: the `epiwatch_core` store traits backed by PostgreSQL.

use async_trait::async_trait;
use epiwatch_core::alert::{AlertRecord, AlertType, NewAlert};
use epiwatch_core::case::{CaseFilter, CaseRecord, CaseStatus, CaseStatusCounts, PreparedCase};
use epiwatch_core::error::CoreError;
use epiwatch_core::outbreak::{NewOutbreak, OutbreakRecord, OutbreakStatus, OutbreakUpdate};
use epiwatch_core::store::{AlertStore, BatchResult, CaseStore, OutbreakStore, StoreError};
use epiwatch_core::types::{CalendarDate, DbId};

use crate::repositories::{AlertRepo, CaseRepo, OutbreakRepo};
use crate::DbPool;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Store implementation over a connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error onto the store taxonomy.
///
/// - Unique violations map to [`StoreError::Conflict`] naming the constraint.
/// - Everything else becomes [`StoreError::Backend`].
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    StoreError::Backend(err.to_string())
}

fn map_row_error(err: CoreError) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Convert a batch of rows, failing on the first row that does not parse.
fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = CoreError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(map_row_error))
        .collect()
}

#[async_trait]
impl CaseStore for PgStore {
    async fn query_cases(&self, onset_from: CalendarDate) -> Result<Vec<CaseRecord>, StoreError> {
        let rows = CaseRepo::list_since(&self.pool, onset_from)
            .await
            .map_err(map_sqlx_error)?;
        convert_all(rows)
    }

    async fn insert_cases(&self, cases: Vec<PreparedCase>) -> Result<Vec<CaseRecord>, StoreError> {
        let rows = CaseRepo::create_many(&self.pool, &cases)
            .await
            .map_err(map_sqlx_error)?;
        convert_all(rows)
    }

    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, StoreError> {
        let status = filter.status.map(|s| s.as_str());
        let rows = CaseRepo::list(&self.pool, status, filter.limit)
            .await
            .map_err(map_sqlx_error)?;
        convert_all(rows)
    }

    async fn status_counts(&self) -> Result<CaseStatusCounts, StoreError> {
        let grouped = CaseRepo::count_by_status(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let mut counts = CaseStatusCounts::default();
        for (status, count) in grouped {
            let status: CaseStatus = status.parse().map_err(map_row_error)?;
            counts.add(status, count);
        }
        Ok(counts)
    }
}

#[async_trait]
impl OutbreakStore for PgStore {
    async fn find_active_outbreak(
        &self,
        disease_name: &str,
        location: &str,
    ) -> Result<Option<OutbreakRecord>, StoreError> {
        OutbreakRepo::find_active(&self.pool, disease_name, location)
            .await
            .map_err(map_sqlx_error)?
            .map(OutbreakRecord::try_from)
            .transpose()
            .map_err(map_row_error)
    }

    async fn insert_outbreaks(&self, outbreaks: Vec<NewOutbreak>) -> BatchResult<OutbreakRecord> {
        let mut results = Vec::with_capacity(outbreaks.len());
        for outbreak in &outbreaks {
            let result = match OutbreakRepo::create(&self.pool, outbreak).await {
                Ok(row) => OutbreakRecord::try_from(row).map_err(map_row_error),
                Err(e) => Err(map_sqlx_error(e)),
            };
            results.push(result);
        }
        results
    }

    async fn update_outbreak(&self, id: DbId, update: OutbreakUpdate) -> Result<(), StoreError> {
        let found = OutbreakRepo::update_counts(&self.pool, id, &update)
            .await
            .map_err(map_sqlx_error)?;
        if !found {
            return Err(StoreError::NotFound {
                entity: "Outbreak",
                id,
            });
        }
        Ok(())
    }

    async fn list_outbreaks(
        &self,
        status: Option<OutbreakStatus>,
    ) -> Result<Vec<OutbreakRecord>, StoreError> {
        let rows = OutbreakRepo::list(&self.pool, status.map(|s| s.as_str()))
            .await
            .map_err(map_sqlx_error)?;
        convert_all(rows)
    }

    async fn get_outbreak(&self, id: DbId) -> Result<Option<OutbreakRecord>, StoreError> {
        OutbreakRepo::get_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
            .map(OutbreakRecord::try_from)
            .transpose()
            .map_err(map_row_error)
    }

    async fn set_status(
        &self,
        id: DbId,
        status: OutbreakStatus,
    ) -> Result<Option<OutbreakRecord>, StoreError> {
        OutbreakRepo::set_status(&self.pool, id, status.as_str())
            .await
            .map_err(map_sqlx_error)?
            .map(OutbreakRecord::try_from)
            .transpose()
            .map_err(map_row_error)
    }
}

#[async_trait]
impl AlertStore for PgStore {
    async fn insert_alerts(&self, alerts: Vec<NewAlert>) -> BatchResult<AlertRecord> {
        let mut results = Vec::with_capacity(alerts.len());
        for alert in &alerts {
            let result = match AlertRepo::create(&self.pool, alert).await {
                Ok(row) => AlertRecord::try_from(row).map_err(map_row_error),
                Err(e) => Err(map_sqlx_error(e)),
            };
            results.push(result);
        }
        results
    }

    async fn list_alerts(
        &self,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertRecord>, StoreError> {
        let rows = AlertRepo::list(&self.pool, unread_only, limit, offset)
            .await
            .map_err(map_sqlx_error)?;
        convert_all(rows)
    }

    async fn mark_read(&self, id: DbId) -> Result<bool, StoreError> {
        AlertRepo::mark_read(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn mark_all_read(&self) -> Result<u64, StoreError> {
        AlertRepo::mark_all_read(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn unread_count(&self) -> Result<i64, StoreError> {
        AlertRepo::unread_count(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn has_alert(&self, outbreak_id: DbId, alert_type: AlertType) -> Result<bool, StoreError> {
        AlertRepo::exists_for_outbreak(&self.pool, outbreak_id, alert_type.as_str())
            .await
            .map_err(map_sqlx_error)
    }
}
