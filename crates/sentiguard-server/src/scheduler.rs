//! Background sweep scheduler

use sentiguard_engine::IngestEngine;
use sentiguard_store::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Run periodic sweeps until the shutdown channel fires.
///
/// The first sweep happens one full interval after startup, so a crash loop
/// cannot hammer the upstream API. Each sweep ends with a journal
/// compaction, keeping the store's on-disk history bounded.
pub async fn run(
    engine: Arc<IngestEngine>,
    store: Arc<dyn Store>,
    interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    if interval_secs == 0 {
        info!("sweep scheduler disabled");
        return;
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await; // first tick completes immediately

    info!(interval_secs, "sweep scheduler started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = engine.sweep().await;
                if !report.errors.is_empty() {
                    warn!(errors = report.errors.len(), "sweep finished with errors");
                }
                if let Err(e) = store.compact() {
                    error!(error = %e, "journal compaction failed");
                }
            }
            _ = shutdown.changed() => {
                info!("sweep scheduler stopping");
                return;
            }
        }
    }
}
