//! Round coordinator
//!
//! Fans out one probe task per snapshot destination, collects completions
//! under the round budget and force-cancels the rest. Every destination in
//! the snapshot gets exactly one result: either the probe's own outcome or
//! a synthesized timeout.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::executor::Prober;
use super::types::{Destination, ProbeResult};
use crate::config::ProbeConfig;

/// Runs one round of probes against a destination snapshot.
///
/// Rounds are independent: nothing carries over between them, and an
/// overlapping round (the previous one still running when the next tick
/// fires) is permitted rather than prevented.
pub struct RoundCoordinator {
    prober: Arc<dyn Prober>,
    config: ProbeConfig,
}

impl RoundCoordinator {
    pub fn new(prober: Arc<dyn Prober>, config: ProbeConfig) -> Self {
        Self { prober, config }
    }

    /// Probe every destination in the snapshot concurrently and return the
    /// full result list, sized exactly to the snapshot.
    ///
    /// Completions are awaited directly under an absolute deadline of
    /// `rounds x wait`. At the deadline every outstanding probe task is
    /// aborted, which drops its in-flight request, and a timeout result is
    /// synthesized in its place.
    pub async fn run_round(&self, snapshot: Vec<Destination>) -> Vec<ProbeResult> {
        // Snapshots are unique by resource id; the set also tracks which
        // destinations still owe a result.
        let mut outstanding: HashSet<Destination> = snapshot.into_iter().collect();
        let total = outstanding.len();
        debug!("Starting a round of {} probes", total);

        let mut inflight: JoinSet<ProbeResult> = JoinSet::new();
        for destination in outstanding.iter().cloned() {
            let prober = Arc::clone(&self.prober);
            inflight.spawn(async move { prober.probe(&destination).await });
        }

        let deadline = Instant::now() + self.config.timeout();
        let mut results = Vec::with_capacity(total);

        loop {
            tokio::select! {
                joined = inflight.join_next() => {
                    match joined {
                        Some(Ok(result)) => {
                            outstanding.remove(&result.destination);
                            results.push(result);
                        }
                        Some(Err(join_error)) => {
                            // The probe task itself died; its destination
                            // stays outstanding and is synthesized below.
                            warn!("Probe task failed to join: {}", join_error);
                        }
                        None => break,
                    }
                }
                _ = sleep_until(deadline) => break,
            }
        }

        if !outstanding.is_empty() {
            warn!(
                "Cancelling {} probes still outstanding after {}ms",
                outstanding.len(),
                self.config.timeout_ms()
            );
        }
        inflight.abort_all();

        let now = Utc::now();
        for destination in outstanding.drain() {
            results.push(ProbeResult::timeout(
                destination,
                now,
                self.config.timeout_ms(),
            ));
        }

        debug!("Round complete with {} results", results.len());
        results
    }
}
