//! Outbreak records, severity banding, and status transitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{CalendarDate, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Cluster size at which an outbreak becomes `critical`.
pub const CRITICAL_MIN_CASES: usize = 20;
/// Cluster size at which an outbreak becomes `high`.
pub const HIGH_MIN_CASES: usize = 10;
/// Cluster size at which an outbreak becomes `medium`.
pub const MEDIUM_MIN_CASES: usize = 5;

/// Severity band of an outbreak, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classify a cluster by its case count. The highest matching band wins.
    pub fn classify(case_count: usize) -> Self {
        if case_count >= CRITICAL_MIN_CASES {
            Severity::Critical
        } else if case_count >= HIGH_MIN_CASES {
            Severity::High
        } else if case_count >= MEDIUM_MIN_CASES {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(CoreError::Validation(format!(
                "Invalid severity '{other}'. Must be one of: low, medium, high, critical"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an outbreak. The detector only ever reads or writes
/// `Active`; the other states are set by people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutbreakStatus {
    Active,
    Contained,
    Resolved,
}

impl OutbreakStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutbreakStatus::Active => "active",
            OutbreakStatus::Contained => "contained",
            OutbreakStatus::Resolved => "resolved",
        }
    }

    /// Check that moving from `self` to `next` is an allowed external action.
    ///
    /// Outbreaks only move forward: `active -> contained -> resolved`, with
    /// `active -> resolved` as a shortcut. Reopening is not allowed; if the
    /// cluster is still above threshold the next detection run opens a new
    /// outbreak instead.
    pub fn validate_transition(self, next: OutbreakStatus) -> Result<(), CoreError> {
        use OutbreakStatus::*;
        match (self, next) {
            (Active, Contained) | (Active, Resolved) | (Contained, Resolved) => Ok(()),
            (from, to) => Err(CoreError::Validation(format!(
                "Cannot change outbreak status from '{from}' to '{to}'"
            ))),
        }
    }
}

impl fmt::Display for OutbreakStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutbreakStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OutbreakStatus::Active),
            "contained" => Ok(OutbreakStatus::Contained),
            "resolved" => Ok(OutbreakStatus::Resolved),
            other => Err(CoreError::Validation(format!(
                "Invalid outbreak status '{other}'. Must be one of: active, contained, resolved"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A detected or ongoing cluster of cases sharing disease and location.
#[derive(Debug, Clone, Serialize)]
pub struct OutbreakRecord {
    pub id: DbId,
    pub disease_name: String,
    pub disease_category: String,
    pub location: String,
    pub case_count: i32,
    pub severity: Severity,
    pub status: OutbreakStatus,
    pub detected_date: CalendarDate,
    pub updated_at: Timestamp,
}

/// Insert payload for a newly detected outbreak. Always created `active`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOutbreak {
    pub disease_name: String,
    pub disease_category: String,
    pub location: String,
    pub case_count: i32,
    pub severity: Severity,
    pub detected_date: CalendarDate,
}

/// Fields the detector rewrites on an active outbreak whose cluster grew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutbreakUpdate {
    pub case_count: i32,
    pub severity: Severity,
}
