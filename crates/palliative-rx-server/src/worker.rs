//! Background inventory monitor.

use std::time::Duration;

use palliative_rx_core::ScanReport;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::error::ApiError;
use crate::state::AppState;

/// One monitor pass against the shared database.
pub async fn run_once(state: &AppState) -> Result<ScanReport, ApiError> {
    let monitor = state.monitor().clone();
    state.with_db(move |db| monitor.run(db)).await
}

/// Run the monitor immediately and then every `period` until `shutdown`
/// changes or its sender is dropped. A failed pass is logged and the loop
/// keeps going.
pub fn spawn(state: AppState, period: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = period.as_secs(), "Inventory monitor started");
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = run_once(&state).await {
                        error!("Inventory monitor pass failed: {}", e);
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Inventory monitor stopped");
    })
}
