//! Round scheduler
//!
//! Thin adapter between the external schedule trigger and the engine: one
//! tick snapshots the registry, runs one round and reports it. A tick never
//! fails; whatever goes wrong inside a round is already absorbed into
//! sentinel results, so the next tick always runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::registry::DestinationRegistry;
use super::reporter::ResultReporter;
use super::round::RoundCoordinator;

pub struct RoundScheduler {
    registry: Arc<DestinationRegistry>,
    coordinator: RoundCoordinator,
    reporter: ResultReporter,
}

impl RoundScheduler {
    pub fn new(
        registry: Arc<DestinationRegistry>,
        coordinator: RoundCoordinator,
        reporter: ResultReporter,
    ) -> Self {
        Self {
            registry,
            coordinator,
            reporter,
        }
    }

    /// Run one round: snapshot, probe, report. No-op when no destinations
    /// are known.
    pub async fn tick(&self) {
        let snapshot = self.registry.snapshot();
        if snapshot.is_empty() {
            debug!("No destinations, skipping the round");
            return;
        }

        info!("Probing {} destinations", snapshot.len());
        let results = self.coordinator.run_round(snapshot).await;
        self.reporter.report(results).await;
    }

    /// Drive `tick()` from a fixed-period interval task, for deployments
    /// without an external trigger. Overlap between a slow round and the
    /// next period is accepted, not prevented.
    pub fn spawn_on_interval(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }
}
