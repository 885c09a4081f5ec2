//! Alert records emitted when outbreak state changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::outbreak::Severity;
use crate::types::{DbId, Timestamp};

/// What kind of outbreak state change an alert describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// A cluster crossed the outbreak threshold for the first time.
    NewOutbreak,
    /// An active outbreak grew without changing severity band.
    CaseIncrease,
    /// An active outbreak grew into a different severity band.
    SeverityChange,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::NewOutbreak => "new_outbreak",
            AlertType::CaseIncrease => "case_increase",
            AlertType::SeverityChange => "severity_change",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_outbreak" => Ok(AlertType::NewOutbreak),
            "case_increase" => Ok(AlertType::CaseIncrease),
            "severity_change" => Ok(AlertType::SeverityChange),
            other => Err(CoreError::Validation(format!("Invalid alert type '{other}'"))),
        }
    }
}

/// A persisted alert.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    pub id: DbId,
    pub outbreak_id: Option<DbId>,
    pub alert_type: AlertType,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// Insert payload for an alert. Alerts are always created unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub outbreak_id: Option<DbId>,
    pub alert_type: AlertType,
    pub message: String,
}

impl NewAlert {
    /// Alert for an outbreak that was just created.
    pub fn new_outbreak(outbreak_id: DbId, disease: &str, location: &str, cases: usize) -> Self {
        Self {
            outbreak_id: Some(outbreak_id),
            alert_type: AlertType::NewOutbreak,
            message: format!("New outbreak detected: {cases} cases of {disease} in {location}"),
        }
    }

    /// Alert for an active outbreak that moved into a new severity band.
    pub fn severity_change(
        outbreak_id: DbId,
        disease: &str,
        location: &str,
        severity: Severity,
    ) -> Self {
        Self {
            outbreak_id: Some(outbreak_id),
            alert_type: AlertType::SeverityChange,
            message: format!("Outbreak severity changed to {severity}: {disease} in {location}"),
        }
    }

    /// Alert for an active outbreak that gained `increase` cases.
    pub fn case_increase(outbreak_id: DbId, disease: &str, location: &str, increase: i32) -> Self {
        Self {
            outbreak_id: Some(outbreak_id),
            alert_type: AlertType::CaseIncrease,
            message: format!("{increase} new cases reported for {disease} in {location}"),
        }
    }
}
