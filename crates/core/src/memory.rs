//! In-process store implementation.
//!
//! [`InMemoryStore`] implements [`CaseStore`], [`OutbreakStore`] and
//! [`AlertStore`] over plain collections behind a single async lock. It
//! enforces the same single-active-outbreak rule as the database schema, so
//! detector and HTTP tests exercise the real conflict behaviour without a
//! PostgreSQL instance.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::alert::{AlertRecord, AlertType, NewAlert};
use crate::case::{CaseFilter, CaseRecord, CaseStatusCounts, PreparedCase};
use crate::outbreak::{NewOutbreak, OutbreakRecord, OutbreakStatus, OutbreakUpdate};
use crate::store::{AlertStore, BatchResult, CaseStore, OutbreakStore, StoreError};
use crate::types::{CalendarDate, DbId};

#[derive(Debug, Default)]
struct Tables {
    cases: Vec<CaseRecord>,
    outbreaks: Vec<OutbreakRecord>,
    alerts: Vec<AlertRecord>,
    next_id: DbId,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn has_active(&self, disease_name: &str, location: &str) -> bool {
        self.outbreaks.iter().any(|o| {
            o.status == OutbreakStatus::Active
                && o.disease_name == disease_name
                && o.location == location
        })
    }
}

/// Shared in-memory backing for all three stores.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an outbreak row directly, bypassing the detector. Used to set up
    /// pre-existing state; respects the single-active-outbreak rule.
    pub async fn seed_outbreak(&self, outbreak: NewOutbreak) -> Result<OutbreakRecord, StoreError> {
        let mut results = self.insert_outbreaks(vec![outbreak]).await;
        results
            .pop()
            .unwrap_or_else(|| Err(StoreError::Backend("empty insert result".to_string())))
    }

    /// Snapshot of every outbreak, in insertion order.
    pub async fn outbreaks(&self) -> Vec<OutbreakRecord> {
        self.tables.read().await.outbreaks.clone()
    }

    /// Snapshot of every alert, in insertion order.
    pub async fn alerts(&self) -> Vec<AlertRecord> {
        self.tables.read().await.alerts.clone()
    }
}

#[async_trait]
impl CaseStore for InMemoryStore {
    async fn query_cases(&self, onset_from: CalendarDate) -> Result<Vec<CaseRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut cases: Vec<CaseRecord> = tables
            .cases
            .iter()
            .filter(|c| c.onset_date >= onset_from)
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.onset_date.cmp(&a.onset_date).then(b.id.cmp(&a.id)));
        Ok(cases)
    }

    async fn insert_cases(&self, cases: Vec<PreparedCase>) -> Result<Vec<CaseRecord>, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(cases.len());
        for case in cases {
            let record = CaseRecord {
                id: tables.next_id(),
                disease_name: case.disease_name,
                disease_category: case.disease_category,
                location: case.location,
                onset_date: case.onset_date,
                report_date: case.report_date,
                status: case.status,
                patient_age: case.patient_age,
                patient_gender: case.patient_gender,
                symptoms: case.symptoms,
                latitude: case.latitude,
                longitude: case.longitude,
                notes: case.notes,
                created_at: now,
            };
            tables.cases.push(record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<CaseRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut cases: Vec<CaseRecord> = tables
            .cases
            .iter()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.report_date.cmp(&a.report_date).then(b.id.cmp(&a.id)));
        cases.truncate(usize::try_from(filter.limit).unwrap_or(0));
        Ok(cases)
    }

    async fn status_counts(&self) -> Result<CaseStatusCounts, StoreError> {
        let tables = self.tables.read().await;
        let mut counts = CaseStatusCounts::default();
        for case in &tables.cases {
            counts.add(case.status, 1);
        }
        Ok(counts)
    }
}

#[async_trait]
impl OutbreakStore for InMemoryStore {
    async fn find_active_outbreak(
        &self,
        disease_name: &str,
        location: &str,
    ) -> Result<Option<OutbreakRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .outbreaks
            .iter()
            .find(|o| {
                o.status == OutbreakStatus::Active
                    && o.disease_name == disease_name
                    && o.location == location
            })
            .cloned())
    }

    async fn insert_outbreaks(&self, outbreaks: Vec<NewOutbreak>) -> BatchResult<OutbreakRecord> {
        let mut tables = self.tables.write().await;
        let mut results = Vec::with_capacity(outbreaks.len());
        for outbreak in outbreaks {
            if tables.has_active(&outbreak.disease_name, &outbreak.location) {
                results.push(Err(StoreError::Conflict(format!(
                    "active outbreak already exists for {} in {}",
                    outbreak.disease_name, outbreak.location
                ))));
                continue;
            }
            let record = OutbreakRecord {
                id: tables.next_id(),
                disease_name: outbreak.disease_name,
                disease_category: outbreak.disease_category,
                location: outbreak.location,
                case_count: outbreak.case_count,
                severity: outbreak.severity,
                status: OutbreakStatus::Active,
                detected_date: outbreak.detected_date,
                updated_at: Utc::now(),
            };
            tables.outbreaks.push(record.clone());
            results.push(Ok(record));
        }
        results
    }

    async fn update_outbreak(&self, id: DbId, update: OutbreakUpdate) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let outbreak = tables
            .outbreaks
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::NotFound {
                entity: "Outbreak",
                id,
            })?;
        outbreak.case_count = update.case_count;
        outbreak.severity = update.severity;
        outbreak.updated_at = Utc::now();
        Ok(())
    }

    async fn list_outbreaks(
        &self,
        status: Option<OutbreakStatus>,
    ) -> Result<Vec<OutbreakRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut outbreaks: Vec<OutbreakRecord> = tables
            .outbreaks
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        outbreaks.sort_by(|a, b| b.detected_date.cmp(&a.detected_date).then(b.id.cmp(&a.id)));
        Ok(outbreaks)
    }

    async fn get_outbreak(&self, id: DbId) -> Result<Option<OutbreakRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.outbreaks.iter().find(|o| o.id == id).cloned())
    }

    async fn set_status(
        &self,
        id: DbId,
        status: OutbreakStatus,
    ) -> Result<Option<OutbreakRecord>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(outbreak) = tables.outbreaks.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        outbreak.status = status;
        outbreak.updated_at = Utc::now();
        Ok(Some(outbreak.clone()))
    }
}

#[async_trait]
impl AlertStore for InMemoryStore {
    async fn insert_alerts(&self, alerts: Vec<NewAlert>) -> BatchResult<AlertRecord> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut results = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let record = AlertRecord {
                id: tables.next_id(),
                outbreak_id: alert.outbreak_id,
                alert_type: alert.alert_type,
                message: alert.message,
                is_read: false,
                created_at: now,
            };
            tables.alerts.push(record.clone());
            results.push(Ok(record));
        }
        results
    }

    async fn list_alerts(
        &self,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertRecord>, StoreError> {
        let tables = self.tables.read().await;
        // Ids are monotonic, so reverse insertion order is newest first.
        Ok(tables
            .alerts
            .iter()
            .rev()
            .filter(|a| !unread_only || !a.is_read)
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: DbId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let mut marked = 0;
        for alert in tables.alerts.iter_mut().filter(|a| !a.is_read) {
            alert.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn unread_count(&self) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.alerts.iter().filter(|a| !a.is_read).count() as i64)
    }

    async fn has_alert(&self, outbreak_id: DbId, alert_type: AlertType) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .alerts
            .iter()
            .any(|a| a.outbreak_id == Some(outbreak_id) && a.alert_type == alert_type))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::case::CaseStatus;
    use crate::outbreak::Severity;

    fn new_outbreak(disease: &str, location: &str) -> NewOutbreak {
        NewOutbreak {
            disease_name: disease.to_string(),
            disease_category: "infectious".to_string(),
            location: location.to_string(),
            case_count: 3,
            severity: Severity::Low,
            detected_date: CalendarDate::from_ymd_opt(2026, 10, 1).unwrap(),
        }
    }

    fn case_with_onset(onset_date: CalendarDate) -> PreparedCase {
        PreparedCase {
            disease_name: "Influenza".to_string(),
            disease_category: "infectious".to_string(),
            location: Some("Boston".to_string()),
            onset_date,
            report_date: onset_date,
            status: CaseStatus::Reported,
            patient_age: None,
            patient_gender: None,
            symptoms: Vec::new(),
            latitude: None,
            longitude: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn case_window_orders_by_onset_then_newest_id() {
        let store = InMemoryStore::new();
        let early = CalendarDate::from_ymd_opt(2026, 10, 1).unwrap();
        let late = CalendarDate::from_ymd_opt(2026, 10, 5).unwrap();
        let inserted = store
            .insert_cases(vec![
                case_with_onset(early),
                case_with_onset(late),
                case_with_onset(early),
                case_with_onset(late),
            ])
            .await
            .unwrap();
        let ids: Vec<DbId> = inserted.iter().map(|c| c.id).collect();

        let window = store.query_cases(early).await.unwrap();
        let listed: Vec<DbId> = window.iter().map(|c| c.id).collect();

        assert_eq!(listed, vec![ids[3], ids[1], ids[2], ids[0]]);
    }

    #[tokio::test]
    async fn second_active_outbreak_for_key_conflicts() {
        let store = InMemoryStore::new();
        let results = store
            .insert_outbreaks(vec![
                new_outbreak("Influenza", "Boston"),
                new_outbreak("Influenza", "Boston"),
                new_outbreak("Influenza", "Denver"),
            ])
            .await;

        assert_matches!(results[0], Ok(_));
        assert_matches!(results[1], Err(StoreError::Conflict(_)));
        assert_matches!(results[2], Ok(_));
    }

    #[tokio::test]
    async fn resolved_outbreak_frees_key() {
        let store = InMemoryStore::new();
        let first = store.seed_outbreak(new_outbreak("Cholera", "Lima")).await.unwrap();
        store
            .set_status(first.id, OutbreakStatus::Resolved)
            .await
            .unwrap();

        assert!(store.find_active_outbreak("Cholera", "Lima").await.unwrap().is_none());
        assert_matches!(store.seed_outbreak(new_outbreak("Cholera", "Lima")).await, Ok(_));
    }

    #[tokio::test]
    async fn update_missing_outbreak_is_not_found() {
        let store = InMemoryStore::new();
        let update = OutbreakUpdate {
            case_count: 5,
            severity: Severity::Medium,
        };
        assert_matches!(
            store.update_outbreak(99, update).await,
            Err(StoreError::NotFound { id: 99, .. })
        );
    }

    #[tokio::test]
    async fn alerts_list_newest_first_and_mark_read() {
        let store = InMemoryStore::new();
        let inserted = store
            .insert_alerts(vec![
                NewAlert::new_outbreak(1, "Influenza", "Boston", 3),
                NewAlert::case_increase(1, "Influenza", "Boston", 2),
            ])
            .await;
        let second_id = inserted[1].as_ref().unwrap().id;

        let listed = store.list_alerts(false, 10, 0).await.unwrap();
        assert_eq!(listed[0].id, second_id);
        assert_eq!(listed[0].alert_type, AlertType::CaseIncrease);

        assert!(store.mark_read(second_id).await.unwrap());
        assert!(!store.mark_read(12345).await.unwrap());
        assert_eq!(store.unread_count().await.unwrap(), 1);
        assert_eq!(store.mark_all_read().await.unwrap(), 1);
        assert!(store.list_alerts(true, 10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn has_alert_matches_outbreak_and_type() {
        let store = InMemoryStore::new();
        store
            .insert_alerts(vec![NewAlert::case_increase(7, "Influenza", "Boston", 2)])
            .await;

        assert!(store.has_alert(7, AlertType::CaseIncrease).await.unwrap());
        assert!(!store.has_alert(7, AlertType::NewOutbreak).await.unwrap());
        assert!(!store.has_alert(8, AlertType::CaseIncrease).await.unwrap());
    }
}
