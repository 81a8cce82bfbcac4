//! Periodic settlement trigger

use crate::errors::SettlementError;
use crate::orchestrator::SettlementOrchestrator;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// **Triggers a settlement run on a fixed interval**
///
/// The first run happens one interval after start. A tick that arrives
/// while a run (manual or scheduled) is still in progress is skipped.
pub struct SettlementScheduler {
    orchestrator: Arc<SettlementOrchestrator>,
    period: Duration,
}

impl SettlementScheduler {
    pub fn new(orchestrator: Arc<SettlementOrchestrator>, period: Duration) -> Self {
        Self {
            orchestrator,
            period,
        }
    }

    /// Starts the scheduler in the background.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            log::info!("Settlement scheduled every {:?}.", self.period);

            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                log::info!("Scheduled settlement run starting.");

                match self.orchestrator.run_settlement().await {
                    Ok(report) => log::info!("Scheduled settlement run done: {}.", report.summary()),
                    Err(SettlementError::AlreadyRunning) => {
                        log::info!("Scheduled settlement run skipped; a run is in progress.")
                    }
                    Err(err) => log::error!("Scheduled settlement run failed: {}", err),
                }
            }
        })
    }
}
