//! Decide what a cluster means for the outbreak it maps to.
//!
//! Pure logic: the caller looks up the existing active outbreak and applies
//! the returned decision.

use crate::alert::NewAlert;
use crate::outbreak::{NewOutbreak, OutbreakRecord, OutbreakUpdate, Severity};
use crate::types::{CalendarDate, DbId};

use super::cluster::Cluster;

/// Outcome of reconciling one eligible cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// No active outbreak exists for the key: open one.
    Create(NewOutbreak),
    /// The active outbreak grew into a different severity band.
    Escalate {
        outbreak_id: DbId,
        update: OutbreakUpdate,
    },
    /// The active outbreak grew within its current band.
    Grow {
        outbreak_id: DbId,
        update: OutbreakUpdate,
        increase: i32,
    },
    /// Cluster is no larger than the stored count. The detector never shrinks
    /// an outbreak.
    Unchanged,
}

impl Reconciliation {
    /// The alert describing an update to an existing outbreak.
    ///
    /// Returns `None` for `Create` (its alert needs the generated id) and
    /// `Unchanged`.
    pub fn update_alert(&self, disease: &str, location: &str) -> Option<NewAlert> {
        match self {
            Reconciliation::Escalate {
                outbreak_id,
                update,
            } => Some(NewAlert::severity_change(
                *outbreak_id,
                disease,
                location,
                update.severity,
            )),
            Reconciliation::Grow {
                outbreak_id,
                increase,
                ..
            } => Some(NewAlert::case_increase(
                *outbreak_id,
                disease,
                location,
                *increase,
            )),
            Reconciliation::Create(_) | Reconciliation::Unchanged => None,
        }
    }
}

/// Reconcile `cluster` against the active outbreak for its key, if any.
pub fn reconcile(
    cluster: &Cluster,
    existing: Option<&OutbreakRecord>,
    today: CalendarDate,
) -> Reconciliation {
    let size = cluster.size();
    let case_count = i32::try_from(size).unwrap_or(i32::MAX);
    let severity = Severity::classify(size);

    let Some(outbreak) = existing else {
        return Reconciliation::Create(NewOutbreak {
            disease_name: cluster.key.disease_name.clone(),
            disease_category: cluster.disease_category().to_string(),
            location: cluster.key.location.clone(),
            case_count,
            severity,
            detected_date: today,
        });
    };

    if case_count <= outbreak.case_count {
        return Reconciliation::Unchanged;
    }

    let update = OutbreakUpdate {
        case_count,
        severity,
    };
    if severity != outbreak.severity {
        Reconciliation::Escalate {
            outbreak_id: outbreak.id,
            update,
        }
    } else {
        Reconciliation::Grow {
            outbreak_id: outbreak.id,
            update,
            increase: case_count - outbreak.case_count,
        }
    }
}
