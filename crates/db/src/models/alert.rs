//! `alerts` row model.

use epiwatch_core::alert::AlertRecord;
use epiwatch_core::error::CoreError;
use epiwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::parse_column;

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertRow {
    pub id: DbId,
    pub outbreak_id: Option<DbId>,
    pub alert_type: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

impl TryFrom<AlertRow> for AlertRecord {
    type Error = CoreError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        Ok(AlertRecord {
            alert_type: parse_column("alert type", &row.alert_type)?,
            id: row.id,
            outbreak_id: row.outbreak_id,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}
