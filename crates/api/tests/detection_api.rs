//! HTTP-level tests for the detection trigger and the outbreak resource.
//!
//! Requests go straight to the router via `tower::ServiceExt`, backed by a
//! shared in-memory store.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get, post, put_json, seed_cases, today};
use epiwatch_core::memory::InMemoryStore;
use epiwatch_core::outbreak::{NewOutbreak, Severity};

fn existing(disease: &str, location: &str, case_count: i32, severity: Severity) -> NewOutbreak {
    NewOutbreak {
        disease_name: disease.to_string(),
        disease_category: "respiratory".to_string(),
        location: location.to_string(),
        case_count,
        severity,
        detected_date: today(),
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn detect_opens_outbreak_and_alert_for_new_cluster() {
    let store = Arc::new(InMemoryStore::new());
    seed_cases(&store, "Influenza", "New York, NY", 3).await;

    let response = post(common::build_test_app(store.clone()), "/api/v1/outbreaks/detect").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["outbreaks_detected"], 1);
    assert_eq!(json["data"]["outbreaks_updated"], 0);
    assert_eq!(json["data"]["alerts_created"], 1);
    assert_eq!(json["data"]["failures"].as_array().unwrap().len(), 0);

    let outbreaks = body_json(get(common::build_test_app(store.clone()), "/api/v1/outbreaks").await).await;
    let outbreak = &outbreaks["data"][0];
    assert_eq!(outbreak["disease_name"], "Influenza");
    assert_eq!(outbreak["location"], "New York, NY");
    assert_eq!(outbreak["case_count"], 3);
    assert_eq!(outbreak["severity"], "low");
    assert_eq!(outbreak["status"], "active");

    let alerts = body_json(get(common::build_test_app(store), "/api/v1/alerts").await).await;
    assert_eq!(alerts["data"][0]["alert_type"], "new_outbreak");
    assert_eq!(
        alerts["data"][0]["message"],
        "New outbreak detected: 3 cases of Influenza in New York, NY"
    );
}

#[tokio::test]
async fn second_detect_over_unchanged_data_is_noop() {
    let store = Arc::new(InMemoryStore::new());
    seed_cases(&store, "Cholera", "Dhaka", 4).await;

    post(common::build_test_app(store.clone()), "/api/v1/outbreaks/detect").await;
    let response = post(common::build_test_app(store.clone()), "/api/v1/outbreaks/detect").await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["outbreaks_detected"], 0);
    assert_eq!(json["data"]["outbreaks_updated"], 0);
    assert_eq!(json["data"]["alerts_created"], 0);
    assert_eq!(store.outbreaks().await.len(), 1);
    assert_eq!(store.alerts().await.len(), 1);
}

#[tokio::test]
async fn growth_across_band_reports_severity_change() {
    let store = Arc::new(InMemoryStore::new());
    store
        .seed_outbreak(existing("Influenza", "New York, NY", 3, Severity::Low))
        .await
        .unwrap();
    seed_cases(&store, "Influenza", "New York, NY", 6).await;

    let json = body_json(post(common::build_test_app(store.clone()), "/api/v1/outbreaks/detect").await).await;
    assert_eq!(json["data"]["outbreaks_detected"], 0);
    assert_eq!(json["data"]["outbreaks_updated"], 1);

    let outbreaks = store.outbreaks().await;
    assert_eq!(outbreaks[0].case_count, 6);
    assert_eq!(outbreaks[0].severity, Severity::Medium);

    let alerts = body_json(get(common::build_test_app(store), "/api/v1/alerts").await).await;
    assert_eq!(alerts["data"][0]["alert_type"], "severity_change");
}

#[tokio::test]
async fn below_threshold_cluster_creates_nothing() {
    let store = Arc::new(InMemoryStore::new());
    seed_cases(&store, "Measles", "Lyon", 2).await;

    let json = body_json(post(common::build_test_app(store.clone()), "/api/v1/outbreaks/detect").await).await;

    assert_eq!(json["data"]["outbreaks_detected"], 0);
    assert_eq!(json["data"]["clusters_evaluated"], 0);
    assert!(store.outbreaks().await.is_empty());
}

// ---------------------------------------------------------------------------
// Outbreak resource
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_outbreak_by_id_and_missing_id() {
    let store = Arc::new(InMemoryStore::new());
    let outbreak = store
        .seed_outbreak(existing("Dengue", "Manila", 7, Severity::Medium))
        .await
        .unwrap();

    let response = get(
        common::build_test_app(store.clone()),
        &format!("/api/v1/outbreaks/{}", outbreak.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["disease_name"], "Dengue");

    let response = get(common::build_test_app(store), "/api/v1/outbreaks/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_outbreaks_filters_by_status() {
    let store = Arc::new(InMemoryStore::new());
    let resolved = store
        .seed_outbreak(existing("Dengue", "Manila", 7, Severity::Medium))
        .await
        .unwrap();
    store
        .seed_outbreak(existing("Mumps", "Leeds", 4, Severity::Low))
        .await
        .unwrap();

    put_json(
        common::build_test_app(store.clone()),
        &format!("/api/v1/outbreaks/{}/status", resolved.id),
        serde_json::json!({ "status": "resolved" }),
    )
    .await;

    let json = body_json(get(common::build_test_app(store.clone()), "/api/v1/outbreaks?status=active").await).await;
    let active = json["data"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["disease_name"], "Mumps");

    let response = get(common::build_test_app(store), "/api/v1/outbreaks?status=dormant").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn status_transitions_only_move_forward() {
    let store = Arc::new(InMemoryStore::new());
    let outbreak = store
        .seed_outbreak(existing("Cholera", "Dhaka", 12, Severity::High))
        .await
        .unwrap();
    let uri = format!("/api/v1/outbreaks/{}/status", outbreak.id);

    let response = put_json(
        common::build_test_app(store.clone()),
        &uri,
        serde_json::json!({ "status": "contained" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "contained");

    let response = put_json(
        common::build_test_app(store.clone()),
        &uri,
        serde_json::json!({ "status": "active" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        common::build_test_app(store.clone()),
        &uri,
        serde_json::json!({ "status": "resolved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json(
        common::build_test_app(store),
        "/api/v1/outbreaks/424242/status",
        serde_json::json!({ "status": "resolved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resolved_outbreak_is_replaced_on_next_detection() {
    let store = Arc::new(InMemoryStore::new());
    seed_cases(&store, "Influenza", "Boston", 3).await;
    post(common::build_test_app(store.clone()), "/api/v1/outbreaks/detect").await;
    let first = store.outbreaks().await[0].id;

    put_json(
        common::build_test_app(store.clone()),
        &format!("/api/v1/outbreaks/{first}/status"),
        serde_json::json!({ "status": "resolved" }),
    )
    .await;

    let json = body_json(post(common::build_test_app(store.clone()), "/api/v1/outbreaks/detect").await).await;
    assert_eq!(json["data"]["outbreaks_detected"], 1);

    let outbreaks = store.outbreaks().await;
    assert_eq!(outbreaks.len(), 2);
    assert_ne!(outbreaks[1].id, first);
}

#[tokio::test]
async fn concurrent_triggers_are_serialized() {
    let store = Arc::new(InMemoryStore::new());
    seed_cases(&store, "Influenza", "Chicago", 5).await;
    // One router, cloned, so both requests share the detection lock.
    let app = common::build_test_app(store.clone());

    let (a, b) = tokio::join!(
        post(app.clone(), "/api/v1/outbreaks/detect"),
        post(app, "/api/v1/outbreaks/detect"),
    );
    let (a, b) = (body_json(a).await, body_json(b).await);

    let detected = a["data"]["outbreaks_detected"].as_u64().unwrap()
        + b["data"]["outbreaks_detected"].as_u64().unwrap();
    assert_eq!(detected, 1);
    assert!(a["data"]["failures"].as_array().unwrap().is_empty());
    assert!(b["data"]["failures"].as_array().unwrap().is_empty());
    assert_eq!(store.alerts().await.len(), 1);
}
