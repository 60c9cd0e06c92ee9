//! Metrics-store and alerting-bus collaborator interfaces
//!
//! Two outbound shapes exist for the same measurements: a generic metric
//! record for the metrics store, and a flat numeric sample for the
//! low-latency alerting bus.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One timestamped value inside a metric record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub value: f64,
}

/// Generic metric record for the metrics store, one per destination per
/// measured dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Metric id, e.g. `"<resourceId>.status.duration"`
    pub id: String,
    pub data: Vec<DataPoint>,
}

impl MetricRecord {
    pub fn single(id: impl Into<String>, timestamp: i64, value: f64) -> Self {
        Self {
            id: id.into(),
            data: vec![DataPoint { timestamp, value }],
        }
    }
}

/// Flat numeric sample for the alerting bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleMetric {
    /// Metric name, e.g. `"<resourceId>.status.code"`
    pub metric_name: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub value: f64,
}

impl SingleMetric {
    pub fn new(metric_name: impl Into<String>, timestamp: i64, value: f64) -> Self {
        Self {
            metric_name: metric_name.into(),
            timestamp,
            value,
        }
    }
}

/// The external metrics store. Persistence and delivery guarantees are the
/// store's own concern; the engine never retries.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn store_metrics(&self, tenant_id: &str, metrics: Vec<MetricRecord>) -> Result<()>;
}

/// The low-latency event bus feeding alerting.
#[async_trait]
pub trait AlertBus: Send + Sync {
    async fn publish_samples(&self, tenant_id: &str, samples: Vec<SingleMetric>) -> Result<()>;
}
