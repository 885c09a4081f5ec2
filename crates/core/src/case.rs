//! Case records: the reported disease occurrences the detector clusters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{CalendarDate, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Category assigned when intake does not supply one.
pub const DEFAULT_DISEASE_CATEGORY: &str = "other";

pub const STATUS_REPORTED: &str = "reported";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_RESOLVED: &str = "resolved";
pub const VALID_STATUSES: &[&str] = &[STATUS_REPORTED, STATUS_CONFIRMED, STATUS_RESOLVED];

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Clinical status of a reported case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Reported,
    Confirmed,
    Resolved,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseStatus::Reported => STATUS_REPORTED,
            CaseStatus::Confirmed => STATUS_CONFIRMED,
            CaseStatus::Resolved => STATUS_RESOLVED,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_REPORTED => Ok(CaseStatus::Reported),
            STATUS_CONFIRMED => Ok(CaseStatus::Confirmed),
            STATUS_RESOLVED => Ok(CaseStatus::Resolved),
            other => Err(CoreError::Validation(format!(
                "Invalid case status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single reported disease occurrence.
#[derive(Debug, Clone, Serialize)]
pub struct CaseRecord {
    pub id: DbId,
    pub disease_name: String,
    pub disease_category: String,
    pub location: Option<String>,
    pub onset_date: CalendarDate,
    pub report_date: CalendarDate,
    pub status: CaseStatus,
    pub patient_age: Option<i32>,
    pub patient_gender: Option<String>,
    pub symptoms: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for case intake.
///
/// Optional fields fall back to intake defaults when the case is prepared
/// for insertion (see [`NewCase::into_prepared`]).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCase {
    #[validate(length(min = 1, max = 200))]
    pub disease_name: String,
    #[validate(length(min = 1, max = 100))]
    pub disease_category: Option<String>,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    pub onset_date: CalendarDate,
    pub report_date: Option<CalendarDate>,
    pub status: Option<CaseStatus>,
    #[validate(range(min = 0, max = 150))]
    pub patient_age: Option<i32>,
    #[validate(length(max = 50))]
    pub patient_gender: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

/// A validated case with every intake default resolved, ready for a store.
#[derive(Debug, Clone)]
pub struct PreparedCase {
    pub disease_name: String,
    pub disease_category: String,
    pub location: Option<String>,
    pub onset_date: CalendarDate,
    pub report_date: CalendarDate,
    pub status: CaseStatus,
    pub patient_age: Option<i32>,
    pub patient_gender: Option<String>,
    pub symptoms: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

impl NewCase {
    /// Validate the DTO and resolve defaults against `today`.
    ///
    /// A blank disease name is rejected even though it passes the length
    /// rule, since such a record could never be clustered.
    pub fn into_prepared(self, today: CalendarDate) -> Result<PreparedCase, CoreError> {
        self.validate()?;
        if self.disease_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "disease_name must not be blank".to_string(),
            ));
        }

        Ok(PreparedCase {
            disease_name: self.disease_name,
            disease_category: self
                .disease_category
                .unwrap_or_else(|| DEFAULT_DISEASE_CATEGORY.to_string()),
            location: self.location.filter(|l| !l.is_empty()),
            onset_date: self.onset_date,
            report_date: self.report_date.unwrap_or(today),
            status: self.status.unwrap_or_default(),
            patient_age: self.patient_age,
            patient_gender: self.patient_gender,
            symptoms: self.symptoms,
            latitude: self.latitude,
            longitude: self.longitude,
            notes: self.notes,
        })
    }
}

/// Filter for case listing.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
    pub limit: i64,
}

/// Case totals by status, for the dashboard summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseStatusCounts {
    pub total: i64,
    pub reported: i64,
    pub confirmed: i64,
    pub resolved: i64,
}

impl CaseStatusCounts {
    /// Add `count` cases of `status` to the totals.
    pub fn add(&mut self, status: CaseStatus, count: i64) {
        self.total += count;
        match status {
            CaseStatus::Reported => self.reported += count,
            CaseStatus::Confirmed => self.confirmed += count,
            CaseStatus::Resolved => self.resolved += count,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
