//! Result reporter
//!
//! Shapes a round's results into the three outbound contracts: generic
//! metric records for the metrics store, flat samples for the alerting bus,
//! and trait updates for the trait store. All hand-offs are one-way; a
//! collaborator failure is logged and never retried.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::types::ProbeResult;
use crate::collaborators::metrics::{AlertBus, MetricRecord, MetricsStore, SingleMetric};
use crate::collaborators::traits_store::{TraitStore, TraitUpdate};

pub struct ResultReporter {
    metrics: Arc<dyn MetricsStore>,
    alerts: Arc<dyn AlertBus>,
    traits: Arc<dyn TraitStore>,
}

impl ResultReporter {
    pub fn new(
        metrics: Arc<dyn MetricsStore>,
        alerts: Arc<dyn AlertBus>,
        traits: Arc<dyn TraitStore>,
    ) -> Self {
        Self {
            metrics,
            alerts,
            traits,
        }
    }

    /// Publish a fully resolved round. Called exactly once per round, after
    /// every probe has completed or been cancelled.
    pub async fn report(&self, results: Vec<ProbeResult>) {
        if results.is_empty() {
            return;
        }
        debug!("Reporting {} probe results", results.len());

        // Metric and sample batches are addressed per tenant.
        let mut by_tenant: HashMap<String, (Vec<MetricRecord>, Vec<SingleMetric>)> =
            HashMap::new();

        for result in &results {
            let timestamp = result.timestamp.timestamp_millis();
            let resource_id = &result.destination.resource_id;
            let duration_id = format!("{}.status.duration", resource_id);
            let code_id = format!("{}.status.code", resource_id);

            let (records, samples) = by_tenant
                .entry(result.destination.tenant_id.clone())
                .or_default();
            records.push(MetricRecord::single(
                duration_id.as_str(),
                timestamp,
                result.duration_ms as f64,
            ));
            records.push(MetricRecord::single(
                code_id.as_str(),
                timestamp,
                f64::from(result.code),
            ));
            samples.push(SingleMetric::new(
                duration_id.as_str(),
                timestamp,
                result.duration_ms as f64,
            ));
            samples.push(SingleMetric::new(
                code_id.as_str(),
                timestamp,
                f64::from(result.code),
            ));
        }

        for (tenant_id, (records, samples)) in by_tenant {
            if let Err(e) = self.metrics.store_metrics(&tenant_id, records).await {
                warn!("Metrics store rejected batch for tenant {}: {}", tenant_id, e);
            }
            if let Err(e) = self.alerts.publish_samples(&tenant_id, samples).await {
                warn!("Alert bus rejected batch for tenant {}: {}", tenant_id, e);
            }
        }

        // Trait updates are fire-and-forget: hand each one to its own task
        // and move on.
        for result in results {
            let update = TraitUpdate::from_traits(&result.destination, &result.traits);
            let store = Arc::clone(&self.traits);
            tokio::spawn(async move {
                let resource_id = update.resource_id.clone();
                if let Err(e) = store.store_traits(update).await {
                    warn!("Trait store rejected update for {}: {}", resource_id, e);
                }
            });
        }
    }
}
