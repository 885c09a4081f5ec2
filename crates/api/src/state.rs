use std::sync::Arc;

use epiwatch_core::detection::{DetectionError, DetectionReport, OutbreakDetector};
use epiwatch_core::store::{AlertStore, CaseStore, OutbreakStore};
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub cases: Arc<dyn CaseStore>,
    pub outbreaks: Arc<dyn OutbreakStore>,
    pub alerts: Arc<dyn AlertStore>,
    pub detector: OutbreakDetector,
    /// Held for the duration of a detection run. Shared by the HTTP trigger
    /// and the scheduled job so runs never overlap.
    pub detection_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Build state from one backend that implements every store.
    pub fn new<S>(config: ServerConfig, store: Arc<S>) -> Self
    where
        S: CaseStore + OutbreakStore + AlertStore + 'static,
    {
        let cases: Arc<dyn CaseStore> = store.clone();
        let outbreaks: Arc<dyn OutbreakStore> = store.clone();
        let alerts: Arc<dyn AlertStore> = store;
        let detector = OutbreakDetector::new(cases.clone(), outbreaks.clone(), alerts.clone());

        Self {
            config: Arc::new(config),
            cases,
            outbreaks,
            alerts,
            detector,
            detection_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run detection once, waiting for any run already in progress to finish.
    pub async fn run_detection(&self) -> Result<DetectionReport, DetectionError> {
        let _guard = self.detection_lock.lock().await;
        self.detector.detect().await
    }
}
