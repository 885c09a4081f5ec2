//! `disease_cases` row model.

use chrono::NaiveDate;
use epiwatch_core::case::CaseRecord;
use epiwatch_core::error::CoreError;
use epiwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::parse_column;

/// A row from the `disease_cases` table.
#[derive(Debug, Clone, FromRow)]
pub struct CaseRow {
    pub id: DbId,
    pub disease_name: String,
    pub disease_category: String,
    pub location: Option<String>,
    pub onset_date: NaiveDate,
    pub report_date: NaiveDate,
    pub status: String,
    pub patient_age: Option<i32>,
    pub patient_gender: Option<String>,
    pub symptoms: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<CaseRow> for CaseRecord {
    type Error = CoreError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        Ok(CaseRecord {
            status: parse_column("case status", &row.status)?,
            id: row.id,
            disease_name: row.disease_name,
            disease_category: row.disease_category,
            location: row.location,
            onset_date: row.onset_date,
            report_date: row.report_date,
            patient_age: row.patient_age,
            patient_gender: row.patient_gender,
            symptoms: row.symptoms,
            latitude: row.latitude,
            longitude: row.longitude,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}
