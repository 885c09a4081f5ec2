//! `outbreaks` row model.

use chrono::NaiveDate;
use epiwatch_core::error::CoreError;
use epiwatch_core::outbreak::OutbreakRecord;
use epiwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::parse_column;

/// A row from the `outbreaks` table.
#[derive(Debug, Clone, FromRow)]
pub struct OutbreakRow {
    pub id: DbId,
    pub disease_name: String,
    pub disease_category: String,
    pub location: String,
    pub case_count: i32,
    pub severity: String,
    pub status: String,
    pub detected_date: NaiveDate,
    pub updated_at: Timestamp,
}

impl TryFrom<OutbreakRow> for OutbreakRecord {
    type Error = CoreError;

    fn try_from(row: OutbreakRow) -> Result<Self, Self::Error> {
        Ok(OutbreakRecord {
            severity: parse_column("severity", &row.severity)?,
            status: parse_column("outbreak status", &row.status)?,
            id: row.id,
            disease_name: row.disease_name,
            disease_category: row.disease_category,
            location: row.location,
            case_count: row.case_count,
            detected_date: row.detected_date,
            updated_at: row.updated_at,
        })
    }
}
