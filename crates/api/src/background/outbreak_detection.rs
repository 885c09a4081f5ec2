//! Scheduled outbreak detection.
//!
//! Runs detection on a fixed interval using `tokio::time::interval`. Runs
//! share the detection lock with the HTTP trigger, so a scheduled run that
//! fires during a manual one waits for it to finish.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Run the detection loop until `cancel` is triggered.
///
/// The first run happens immediately. Cancellation is only observed between
/// runs; a run in progress always completes.
pub async fn run(state: AppState, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Outbreak detection job started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Outbreak detection job stopping");
                break;
            }
            _ = ticker.tick() => {
                match state.run_detection().await {
                    Ok(report) if report.is_noop() => {
                        tracing::debug!(
                            clusters_evaluated = report.clusters_evaluated,
                            "Outbreak detection: no changes"
                        );
                    }
                    Ok(report) => {
                        tracing::info!(
                            outbreaks_detected = report.outbreaks_detected,
                            outbreaks_updated = report.outbreaks_updated,
                            alerts_created = report.alerts_created,
                            failures = report.failures.len(),
                            "Outbreak detection: scheduled run complete"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Outbreak detection: scheduled run failed");
                    }
                }
            }
        }
    }
}
