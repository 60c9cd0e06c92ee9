//! Collaborator interfaces at the engine boundary
//!
//! The engine is a library wired to external systems it does not own: the
//! inventory that knows which URLs exist, the metrics store, the alerting
//! bus, and the trait store. Each is modeled as an async trait so deployments
//! supply real integrations and tests supply recording stubs.

pub mod inventory;
pub mod metrics;
pub mod traits_store;

pub use inventory::{Inventory, RawResource, ResourceListener, URL_TYPE};
pub use metrics::{AlertBus, DataPoint, MetricRecord, MetricsStore, SingleMetric};
pub use traits_store::{TraitStore, TraitUpdate};
