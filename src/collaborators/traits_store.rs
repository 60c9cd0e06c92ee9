//! Trait-store collaborator interface
//!
//! Extracted traits are persisted as properties of the probed resource,
//! tagged with the identity of the destination and the capture instant.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::pinger::traits::Traits;
use crate::pinger::types::Destination;

/// One trait hand-off: the extracted traits plus the identity of the
/// resource they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitUpdate {
    pub tenant_id: String,
    pub environment_id: String,
    pub resource_id: String,
    /// Epoch milliseconds of the capture instant
    pub timestamp: i64,
    /// Trait kind (canonical header name) to value
    pub traits: BTreeMap<String, String>,
}

impl TraitUpdate {
    pub fn from_traits(destination: &Destination, traits: &Traits) -> Self {
        Self {
            tenant_id: destination.tenant_id.clone(),
            environment_id: destination.environment_id.clone(),
            resource_id: destination.resource_id.clone(),
            timestamp: traits.timestamp().timestamp_millis(),
            traits: traits.to_string_map(),
        }
    }
}

/// The store persisting extracted traits. Hand-offs are fire-and-forget
/// from the engine's perspective.
#[async_trait]
pub trait TraitStore: Send + Sync {
    async fn store_traits(&self, update: TraitUpdate) -> Result<()>;
}
