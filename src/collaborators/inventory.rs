//! Inventory collaborator interface
//!
//! The inventory holds the canonical resource records and emits an event for
//! every resource created after startup. The engine consumes it two ways: a
//! bulk listing at startup and a push-style subscription for resources
//! created afterwards.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::pinger::types::Destination;

/// Resource type id of probe-able URL resources in the inventory.
pub const URL_TYPE: &str = "URL";

/// A resource record as the inventory emits it, before filtering.
///
/// The discovery stream carries every resource kind; only records with
/// `resource_type == URL_TYPE` become destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResource {
    /// Tenant owning the resource
    pub tenant_id: String,
    /// Environment the resource lives in
    pub environment_id: String,
    /// Unique resource id
    pub resource_id: String,
    /// Resource type id, e.g. "URL"
    pub resource_type: String,
    /// Free-form resource properties; URL resources carry "url" and
    /// optionally "method"
    pub properties: HashMap<String, String>,
}

impl RawResource {
    pub fn new(
        tenant_id: impl Into<String>,
        environment_id: impl Into<String>,
        resource_id: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            environment_id: environment_id.into(),
            resource_id: resource_id.into(),
            resource_type: resource_type.into(),
            properties: HashMap::new(),
        }
    }
}

/// Callback invoked for every created resource. Runs on a thread the
/// inventory chooses, so implementations must not block for long.
pub type ResourceListener = Box<dyn Fn(RawResource) + Send + Sync>;

/// The inventory system holding canonical destination records.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// List every URL resource currently known, already converted to
    /// destinations. Called once at startup.
    async fn list_all_url_destinations(&self) -> Result<Vec<Destination>>;

    /// Subscribe to resource-created events. The listener receives raw
    /// records of every type and is invoked from an arbitrary inventory
    /// thread.
    fn on_resource_created(&self, listener: ResourceListener);
}
