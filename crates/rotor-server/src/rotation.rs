use rotor_core::Rotor;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Drive the cursor once per `period`, starting one full period from now.
///
/// Each tick runs on the blocking pool and is awaited before the next one
/// is scheduled, so ticks never overlap. Aborting the returned handle stops
/// the schedule but lets an in-flight tick finish.
pub fn spawn_rotation(rotor: Arc<Rotor>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(period_secs = period.as_secs_f64(), "rotation started");
        loop {
            ticker.tick().await;
            let rotor = Arc::clone(&rotor);
            match tokio::task::spawn_blocking(move || rotor.tick()).await {
                Ok(report) => {
                    if !report.summary.triggered.is_empty() {
                        tracing::info!(
                            index = report.state.index,
                            triggered = report.summary.triggered.len(),
                            "tick triggered conditions"
                        );
                    }
                }
                Err(e) => tracing::error!(error = %e, "rotation tick panicked"),
            }
        }
    })
}
