//! Windowing and grouping of case records into (disease, location) clusters.
//!
//! Keys compare as exact, case-sensitive strings. "Boston" and "boston, MA"
//! are different clusters; there is no fuzzy or geospatial matching.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::case::CaseRecord;
use crate::types::CalendarDate;

/// Length of the clustering window, in days. The window is inclusive of
/// its first day.
pub const WINDOW_DAYS: i64 = 30;

/// Minimum cluster size that counts as an outbreak.
pub const OUTBREAK_MIN_CASES: usize = 3;

/// Location used for cases reported without one.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// First onset date inside the window ending at `today`.
pub fn window_start(today: CalendarDate) -> CalendarDate {
    today - Duration::days(WINDOW_DAYS)
}

/// Composite clustering key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterKey {
    pub disease_name: String,
    pub location: String,
}

impl ClusterKey {
    /// Key for a case, or `None` if the case has no usable disease name.
    pub fn for_case(case: &CaseRecord) -> Option<Self> {
        if case.disease_name.trim().is_empty() {
            return None;
        }
        let location = match case.location.as_deref() {
            Some(loc) if !loc.is_empty() => loc.to_string(),
            _ => UNKNOWN_LOCATION.to_string(),
        };
        Some(Self {
            disease_name: case.disease_name.clone(),
            location,
        })
    }
}

/// Cases sharing one [`ClusterKey`], in window order (most recent onset first).
#[derive(Debug, Clone)]
pub struct Cluster {
    pub key: ClusterKey,
    pub cases: Vec<CaseRecord>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.cases.len()
    }

    pub fn is_outbreak(&self) -> bool {
        self.size() >= OUTBREAK_MIN_CASES
    }

    /// Category of the most recent case, used when opening an outbreak.
    pub fn disease_category(&self) -> &str {
        self.cases
            .first()
            .map(|c| c.disease_category.as_str())
            .unwrap_or(crate::case::DEFAULT_DISEASE_CATEGORY)
    }
}

/// Partition `cases` by key. Clusters come back sorted by key so runs over
/// the same data are processed in the same order.
pub fn group_cases(cases: Vec<CaseRecord>) -> Vec<Cluster> {
    let mut groups: BTreeMap<ClusterKey, Vec<CaseRecord>> = BTreeMap::new();
    for case in cases {
        if let Some(key) = ClusterKey::for_case(&case) {
            groups.entry(key).or_default().push(case);
        }
    }
    groups
        .into_iter()
        .map(|(key, cases)| Cluster { key, cases })
        .collect()
}

/// Clusters at or above the outbreak threshold.
pub fn outbreak_clusters(cases: Vec<CaseRecord>) -> Vec<Cluster> {
    group_cases(cases)
        .into_iter()
        .filter(Cluster::is_outbreak)
        .collect()
}
