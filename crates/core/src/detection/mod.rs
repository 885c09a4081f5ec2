//! Outbreak detection.
//!
//! A detection run reads every case whose onset falls in the last
//! [`WINDOW_DAYS`] days, groups them by (disease, location), and reconciles
//! each cluster of at least [`OUTBREAK_MIN_CASES`] against the active
//! outbreak for that key:
//!
//! - no active outbreak: open one and emit a `new_outbreak` alert
//! - cluster grew into a new severity band: update, emit `severity_change`
//! - cluster grew within its band: update, emit `case_increase`
//! - otherwise: nothing
//!
//! An active outbreak that has no `new_outbreak` alert (its alert insert
//! failed on an earlier run) gets one on the next run that sees it.
//!
//! Every run recomputes from the full window, so running twice over
//! unchanged data writes nothing the second time.
//!
//! Callers must not run two detections concurrently against the same
//! stores; the API serializes runs behind a lock.

pub mod cluster;
pub mod reconcile;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::alert::{AlertType, NewAlert};
use crate::outbreak::{NewOutbreak, OutbreakRecord};
use crate::store::{AlertStore, CaseStore, OutbreakStore, StoreError};
use crate::types::CalendarDate;

pub use cluster::{
    outbreak_clusters, window_start, Cluster, ClusterKey, OUTBREAK_MIN_CASES, UNKNOWN_LOCATION,
    WINDOW_DAYS,
};
pub use reconcile::{reconcile, Reconciliation};

// ---------------------------------------------------------------------------
// Results and errors
// ---------------------------------------------------------------------------

/// A failure that aborts the whole run before any write.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("Failed to read case window: {0}")]
    CaseWindow(#[source] StoreError),
}

/// Which write (or read) failed for a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    LookupOutbreak,
    LookupAlert,
    InsertOutbreak,
    UpdateOutbreak,
    InsertAlert,
}

/// A per-cluster failure. Other clusters in the same run are unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterFailure {
    pub disease_name: String,
    pub location: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Summary of a detection run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionReport {
    /// Outbreaks created this run.
    pub outbreaks_detected: usize,
    /// Existing active outbreaks whose count grew.
    pub outbreaks_updated: usize,
    /// Alerts persisted this run.
    pub alerts_created: usize,
    /// Clusters at or above the outbreak threshold.
    pub clusters_evaluated: usize,
    pub failures: Vec<ClusterFailure>,
}

impl DetectionReport {
    /// `true` when the run changed nothing and hit no errors.
    pub fn is_noop(&self) -> bool {
        self.outbreaks_detected == 0
            && self.outbreaks_updated == 0
            && self.alerts_created == 0
            && self.failures.is_empty()
    }

    fn record_failure(&mut self, key: &ClusterKey, stage: FailureStage, error: &StoreError) {
        tracing::warn!(
            disease = %key.disease_name,
            location = %key.location,
            stage = ?stage,
            error = %error,
            "Outbreak detection: cluster failed"
        );
        self.failures.push(ClusterFailure {
            disease_name: key.disease_name.clone(),
            location: key.location.clone(),
            stage,
            message: error.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Runs detection against injected stores.
#[derive(Clone)]
pub struct OutbreakDetector {
    cases: Arc<dyn CaseStore>,
    outbreaks: Arc<dyn OutbreakStore>,
    alerts: Arc<dyn AlertStore>,
}

impl OutbreakDetector {
    pub fn new(
        cases: Arc<dyn CaseStore>,
        outbreaks: Arc<dyn OutbreakStore>,
        alerts: Arc<dyn AlertStore>,
    ) -> Self {
        Self {
            cases,
            outbreaks,
            alerts,
        }
    }

    /// Run detection for the current UTC date.
    pub async fn detect(&self) -> Result<DetectionReport, DetectionError> {
        self.detect_at(Utc::now().date_naive()).await
    }

    /// Run detection with the window ending at `today`.
    pub async fn detect_at(&self, today: CalendarDate) -> Result<DetectionReport, DetectionError> {
        let onset_from = window_start(today);
        let cases = self
            .cases
            .query_cases(onset_from)
            .await
            .map_err(DetectionError::CaseWindow)?;

        let mut report = DetectionReport::default();
        if cases.is_empty() {
            tracing::debug!(%onset_from, "Outbreak detection: no recent cases to analyze");
            return Ok(report);
        }

        let case_total = cases.len();
        let clusters = outbreak_clusters(cases);
        report.clusters_evaluated = clusters.len();

        let mut creates: Vec<(ClusterKey, NewOutbreak)> = Vec::new();
        let mut missing_alerts: Vec<(ClusterKey, NewAlert)> = Vec::new();
        let mut update_alerts: Vec<(ClusterKey, NewAlert)> = Vec::new();

        for cluster in &clusters {
            let key = &cluster.key;
            let existing = match self
                .outbreaks
                .find_active_outbreak(&key.disease_name, &key.location)
                .await
            {
                Ok(existing) => existing,
                Err(e) => {
                    report.record_failure(key, FailureStage::LookupOutbreak, &e);
                    continue;
                }
            };

            if let Some(outbreak) = &existing {
                match self.alerts.has_alert(outbreak.id, AlertType::NewOutbreak).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::info!(
                            outbreak_id = outbreak.id,
                            disease = %key.disease_name,
                            location = %key.location,
                            "Outbreak detection: raising missing new_outbreak alert"
                        );
                        missing_alerts.push((key.clone(), new_outbreak_alert(outbreak)));
                    }
                    Err(e) => report.record_failure(key, FailureStage::LookupAlert, &e),
                }
            }

            let decision = reconcile(cluster, existing.as_ref(), today);
            match &decision {
                Reconciliation::Create(new) => creates.push((key.clone(), new.clone())),
                Reconciliation::Unchanged => {}
                Reconciliation::Escalate {
                    outbreak_id,
                    update,
                }
                | Reconciliation::Grow {
                    outbreak_id,
                    update,
                    ..
                } => {
                    if let Err(e) = self.outbreaks.update_outbreak(*outbreak_id, *update).await {
                        report.record_failure(key, FailureStage::UpdateOutbreak, &e);
                        continue;
                    }
                    report.outbreaks_updated += 1;
                    if let Some(alert) = decision.update_alert(&key.disease_name, &key.location) {
                        update_alerts.push((key.clone(), alert));
                    }
                }
            }
        }

        missing_alerts.extend(self.insert_new_outbreaks(creates, &mut report).await);
        self.insert_alerts(missing_alerts, &mut report).await;
        self.insert_alerts(update_alerts, &mut report).await;

        tracing::info!(
            cases = case_total,
            clusters = report.clusters_evaluated,
            outbreaks_detected = report.outbreaks_detected,
            outbreaks_updated = report.outbreaks_updated,
            alerts_created = report.alerts_created,
            failures = report.failures.len(),
            "Outbreak detection complete"
        );

        Ok(report)
    }

    /// Insert all new outbreaks as one batch and build a `new_outbreak`
    /// alert for each one that was actually stored.
    async fn insert_new_outbreaks(
        &self,
        creates: Vec<(ClusterKey, NewOutbreak)>,
        report: &mut DetectionReport,
    ) -> Vec<(ClusterKey, NewAlert)> {
        if creates.is_empty() {
            return Vec::new();
        }

        let (keys, payloads): (Vec<ClusterKey>, Vec<NewOutbreak>) = creates.into_iter().unzip();
        let mut results = self.outbreaks.insert_outbreaks(payloads).await.into_iter();

        let mut alerts = Vec::with_capacity(keys.len());
        for key in keys {
            match results.next() {
                Some(Ok(outbreak)) => {
                    report.outbreaks_detected += 1;
                    alerts.push((key, new_outbreak_alert(&outbreak)));
                }
                Some(Err(e)) => report.record_failure(&key, FailureStage::InsertOutbreak, &e),
                None => report.record_failure(
                    &key,
                    FailureStage::InsertOutbreak,
                    &StoreError::Backend("store returned no result for outbreak".to_string()),
                ),
            }
        }
        alerts
    }

    async fn insert_alerts(&self, alerts: Vec<(ClusterKey, NewAlert)>, report: &mut DetectionReport) {
        if alerts.is_empty() {
            return;
        }

        let (keys, payloads): (Vec<ClusterKey>, Vec<NewAlert>) = alerts.into_iter().unzip();
        let mut results = self.alerts.insert_alerts(payloads).await.into_iter();

        for key in keys {
            match results.next() {
                Some(Ok(_)) => report.alerts_created += 1,
                Some(Err(e)) => report.record_failure(&key, FailureStage::InsertAlert, &e),
                None => report.record_failure(
                    &key,
                    FailureStage::InsertAlert,
                    &StoreError::Backend("store returned no result for alert".to_string()),
                ),
            }
        }
    }
}

fn new_outbreak_alert(outbreak: &OutbreakRecord) -> NewAlert {
    NewAlert::new_outbreak(
        outbreak.id,
        &outbreak.disease_name,
        &outbreak.location,
        usize::try_from(outbreak.case_count).unwrap_or_default(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
