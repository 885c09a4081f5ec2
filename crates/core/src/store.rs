//! Store interfaces the detector and API are written against.
//!
//! Implementations live in `epiwatch-db` (PostgreSQL) and [`crate::memory`]
//! (in-process). All traits are object safe and shared as `Arc<dyn ...>`.

use async_trait::async_trait;

use crate::alert::{AlertRecord, AlertType, NewAlert};
use crate::case::{CaseFilter, CaseRecord, CaseStatusCounts, PreparedCase};
use crate::outbreak::{NewOutbreak, OutbreakRecord, OutbreakStatus, OutbreakUpdate};
use crate::types::{CalendarDate, DbId};

/// A failure inside a store implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Anything else the backend reported (connection loss, bad row data).
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Per-item outcome of a batch insert, in the same order as the input.
pub type BatchResult<T> = Vec<Result<T, StoreError>>;

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// All cases with `onset_date >= onset_from`, most recent onset first.
    async fn query_cases(&self, onset_from: CalendarDate) -> Result<Vec<CaseRecord>, StoreError>;

    /// Insert cases at intake. The whole batch succeeds or fails together.
    async fn insert_cases(&self, cases: Vec<PreparedCase>) -> Result<Vec<CaseRecord>, StoreError>;

    /// Cases for listing, newest report first.
    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, StoreError>;

    async fn status_counts(&self) -> Result<CaseStatusCounts, StoreError>;
}

#[async_trait]
pub trait OutbreakStore: Send + Sync {
    /// The `active` outbreak for (disease, location), if one exists.
    async fn find_active_outbreak(
        &self,
        disease_name: &str,
        location: &str,
    ) -> Result<Option<OutbreakRecord>, StoreError>;

    /// Insert each outbreak independently. Element `i` of the result is the
    /// outcome for element `i` of `outbreaks`.
    async fn insert_outbreaks(&self, outbreaks: Vec<NewOutbreak>) -> BatchResult<OutbreakRecord>;

    async fn update_outbreak(&self, id: DbId, update: OutbreakUpdate) -> Result<(), StoreError>;

    /// Outbreaks newest-detected first, optionally restricted to one status.
    async fn list_outbreaks(
        &self,
        status: Option<OutbreakStatus>,
    ) -> Result<Vec<OutbreakRecord>, StoreError>;

    async fn get_outbreak(&self, id: DbId) -> Result<Option<OutbreakRecord>, StoreError>;

    /// Overwrite the status. Transition rules are enforced by the caller.
    async fn set_status(
        &self,
        id: DbId,
        status: OutbreakStatus,
    ) -> Result<Option<OutbreakRecord>, StoreError>;
}

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Insert each alert independently, pairing results with inputs by position.
    async fn insert_alerts(&self, alerts: Vec<NewAlert>) -> BatchResult<AlertRecord>;

    /// Alerts newest first.
    async fn list_alerts(
        &self,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertRecord>, StoreError>;

    /// Returns `false` if no alert has this id. Marking a read alert is a no-op.
    async fn mark_read(&self, id: DbId) -> Result<bool, StoreError>;

    /// Returns the number of alerts marked.
    async fn mark_all_read(&self) -> Result<u64, StoreError>;

    async fn unread_count(&self) -> Result<i64, StoreError>;

    /// Whether an alert of `alert_type` already references `outbreak_id`.
    async fn has_alert(&self, outbreak_id: DbId, alert_type: AlertType) -> Result<bool, StoreError>;
}
