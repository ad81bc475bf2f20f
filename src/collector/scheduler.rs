use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use super::cycle::CollectionCycle;
use super::ports::{BuildClient, JobStore, QualityStore, ReportConverter};

/// Drives collection cycles on a fixed cadence.
///
/// Cycles for one collector never overlap: a tick that fires while the
/// previous cycle is still running is skipped with a warning.
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Runs cycles forever at the configured interval.
    pub async fn run<C, V, J, Q>(
        &self,
        cycle: Arc<CollectionCycle<C, V, J, Q>>,
        servers: Vec<String>,
    ) where
        C: BuildClient + 'static,
        V: ReportConverter + 'static,
        J: JobStore + 'static,
        Q: QualityStore + 'static,
    {
        info!(
            "Scheduling collection every {} seconds",
            self.interval.as_secs()
        );

        let running = Arc::new(Mutex::new(()));
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Ok(guard) = running.clone().try_lock_owned() else {
                warn!("Previous collection cycle still running, skipping tick");
                continue;
            };

            let cycle = Arc::clone(&cycle);
            let servers = servers.clone();
            tokio::spawn(async move {
                let _running = guard;
                if let Err(e) = cycle.run(&servers).await {
                    warn!("Collection cycle failed: {e}");
                }
            });
        }
    }
}
