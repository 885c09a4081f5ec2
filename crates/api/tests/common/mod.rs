#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use epiwatch_api::config::{ServerConfig, StoreBackend};
use epiwatch_api::router::build_app_router;
use epiwatch_api::state::AppState;
use epiwatch_core::case::{CaseStatus, PreparedCase};
use epiwatch_core::memory::InMemoryStore;
use epiwatch_core::store::CaseStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        detection_interval_secs: 0,
        store_backend: StoreBackend::Memory,
        database_url: None,
    }
}

/// Build the full application router over `store`, with the production
/// middleware stack.
pub fn build_test_app(store: Arc<InMemoryStore>) -> Router {
    build_app_router(AppState::new(test_config(), store))
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A valid case with onset `days_ago` days before today.
pub fn case(disease: &str, location: Option<&str>, days_ago: i64) -> PreparedCase {
    PreparedCase {
        disease_name: disease.to_string(),
        disease_category: "respiratory".to_string(),
        location: location.map(str::to_string),
        onset_date: today() - Duration::days(days_ago),
        report_date: today(),
        status: CaseStatus::Reported,
        patient_age: Some(41),
        patient_gender: Some("female".to_string()),
        symptoms: vec!["fever".to_string()],
        latitude: None,
        longitude: None,
        notes: None,
    }
}

/// Insert `count` recent cases of `disease` at `location`.
pub async fn seed_cases(store: &InMemoryStore, disease: &str, location: &str, count: usize) {
    let cases = (0..count).map(|_| case(disease, Some(location), 1)).collect();
    store.insert_cases(cases).await.unwrap();
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
