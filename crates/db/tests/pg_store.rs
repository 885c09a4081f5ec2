//! Integration tests for [`PgStore`] against a real database.
//!
//! Require `DATABASE_URL`; run with `cargo test -p epiwatch-db -- --ignored`.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};
use epiwatch_core::alert::AlertType;
use epiwatch_core::case::{CaseFilter, CaseStatus, PreparedCase};
use epiwatch_core::detection::OutbreakDetector;
use epiwatch_core::outbreak::{NewOutbreak, OutbreakStatus, OutbreakUpdate, Severity};
use epiwatch_core::store::{AlertStore, CaseStore, OutbreakStore, StoreError};
use epiwatch_db::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn new_case(disease: &str, location: Option<&str>, days_ago: i64) -> PreparedCase {
    PreparedCase {
        disease_name: disease.to_string(),
        disease_category: "infectious".to_string(),
        location: location.map(str::to_string),
        onset_date: today() - Duration::days(days_ago),
        report_date: today(),
        status: CaseStatus::Reported,
        patient_age: Some(34),
        patient_gender: None,
        symptoms: vec!["fever".to_string(), "cough".to_string()],
        latitude: Some(40.71),
        longitude: Some(-74.0),
        notes: None,
    }
}

fn new_outbreak(disease: &str, location: &str) -> NewOutbreak {
    NewOutbreak {
        disease_name: disease.to_string(),
        disease_category: "infectious".to_string(),
        location: location.to_string(),
        case_count: 3,
        severity: Severity::Low,
        detected_date: today(),
    }
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn case_window_is_inclusive_and_ordered(pool: PgPool) {
    let store = PgStore::new(pool);
    store
        .insert_cases(vec![
            new_case("Influenza", Some("Boston"), 31),
            new_case("Influenza", Some("Boston"), 30),
            new_case("Influenza", Some("Boston"), 2),
        ])
        .await
        .unwrap();

    let cases = store.query_cases(today() - Duration::days(30)).await.unwrap();

    assert_eq!(cases.len(), 2);
    assert!(cases[0].onset_date > cases[1].onset_date);
    assert_eq!(cases[0].symptoms, vec!["fever", "cough"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn status_counts_group_by_status(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut confirmed = new_case("Cholera", None, 1);
    confirmed.status = CaseStatus::Confirmed;
    store
        .insert_cases(vec![new_case("Cholera", None, 1), confirmed])
        .await
        .unwrap();

    let counts = store.status_counts().await.unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.reported, 1);
    assert_eq!(counts.confirmed, 1);

    let filter = CaseFilter {
        status: Some(CaseStatus::Confirmed),
        limit: 10,
    };
    assert_eq!(store.list_cases(&filter).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Outbreaks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn second_active_outbreak_violates_unique_index(pool: PgPool) {
    let store = PgStore::new(pool);
    let results = store
        .insert_outbreaks(vec![
            new_outbreak("Influenza", "Boston"),
            new_outbreak("Influenza", "Boston"),
        ])
        .await;

    assert_matches!(results[0], Ok(_));
    assert_matches!(
        &results[1],
        Err(StoreError::Conflict(msg)) if msg.contains("uq_outbreaks_active_key")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_and_status_change_round_trip(pool: PgPool) {
    let store = PgStore::new(pool);
    let created = store
        .insert_outbreaks(vec![new_outbreak("Measles", "Lyon")])
        .await
        .remove(0)
        .unwrap();

    store
        .update_outbreak(
            created.id,
            OutbreakUpdate {
                case_count: 11,
                severity: Severity::High,
            },
        )
        .await
        .unwrap();
    let found = store.find_active_outbreak("Measles", "Lyon").await.unwrap().unwrap();
    assert_eq!(found.case_count, 11);
    assert_eq!(found.severity, Severity::High);

    let resolved = store
        .set_status(created.id, OutbreakStatus::Resolved)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.status, OutbreakStatus::Resolved);
    assert!(store.find_active_outbreak("Measles", "Lyon").await.unwrap().is_none());

    assert_matches!(
        store
            .update_outbreak(
                999_999,
                OutbreakUpdate {
                    case_count: 1,
                    severity: Severity::Low,
                },
            )
            .await,
        Err(StoreError::NotFound { .. })
    );
}

// ---------------------------------------------------------------------------
// Detection end to end
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn detection_against_postgres_is_idempotent(pool: PgPool) {
    let store = Arc::new(PgStore::new(pool));
    store
        .insert_cases((0..5).map(|_| new_case("Influenza", Some("New York, NY"), 1)).collect())
        .await
        .unwrap();
    let detector = OutbreakDetector::new(store.clone(), store.clone(), store.clone());

    let first = detector.detect_at(today()).await.unwrap();
    assert_eq!(first.outbreaks_detected, 1);
    assert_eq!(first.alerts_created, 1);

    let second = detector.detect_at(today()).await.unwrap();
    assert!(second.is_noop());

    let alerts = store.list_alerts(false, 10, 0).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::NewOutbreak);
    let outbreak_id = alerts[0].outbreak_id.unwrap();
    assert!(store.has_alert(outbreak_id, AlertType::NewOutbreak).await.unwrap());
    assert!(!store.has_alert(outbreak_id, AlertType::CaseIncrease).await.unwrap());
    assert_eq!(store.unread_count().await.unwrap(), 1);
    assert!(store.mark_read(alerts[0].id).await.unwrap());
    assert_eq!(store.unread_count().await.unwrap(), 0);
}
