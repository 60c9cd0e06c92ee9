//! Core data model for the probing engine
//!
//! `Destination` identifies one thing to probe; `ProbeResult` is the outcome
//! of one probe in one round. Both are plain values: destinations are never
//! mutated in place, and results live only until the round is reported.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};

use super::traits::Traits;
use crate::collaborators::inventory::{RawResource, URL_TYPE};

/// HTTP method used when a destination does not specify one.
pub const DEFAULT_METHOD: &str = "GET";

/// Sentinel status code for probes that failed at the transport level
/// (DNS, connect, TLS, malformed URL). Not a real HTTP status.
pub const TRANSPORT_ERROR_CODE: i32 = -1;

/// Sentinel status code for probes cancelled at the round budget.
pub const TIMEOUT_CODE: i32 = -2;

/// A destination for probing.
///
/// Identity is the `resource_id` alone: two destinations with the same id
/// compare equal even when their URL or method differ. This mirrors the
/// inventory, where the resource id is the unique key and url/method are
/// just properties of the record.
#[derive(Debug, Clone)]
pub struct Destination {
    /// Tenant owning the probed resource
    pub tenant_id: String,
    /// Environment the resource lives in
    pub environment_id: String,
    /// Unique resource id, the sole identity of this destination
    pub resource_id: String,
    /// URL to probe
    pub url: String,
    /// HTTP method to use, defaults to GET
    pub method: String,
}

impl Destination {
    /// Create a destination probed with the default method (GET).
    pub fn new(
        tenant_id: impl Into<String>,
        environment_id: impl Into<String>,
        resource_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::with_method(tenant_id, environment_id, resource_id, url, DEFAULT_METHOD)
    }

    /// Create a destination with an explicit method. An empty method falls
    /// back to the default.
    pub fn with_method(
        tenant_id: impl Into<String>,
        environment_id: impl Into<String>,
        resource_id: impl Into<String>,
        url: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        let method = method.into();
        Self {
            tenant_id: tenant_id.into(),
            environment_id: environment_id.into(),
            resource_id: resource_id.into(),
            url: url.into(),
            method: if method.is_empty() {
                DEFAULT_METHOD.to_string()
            } else {
                method
            },
        }
    }

    /// Convert a raw inventory resource into a destination.
    ///
    /// Returns `None` for resources that are not of the URL type; the
    /// discovery stream carries all resource kinds and only URL resources
    /// are probed.
    pub fn from_resource(resource: &RawResource) -> Option<Self> {
        if resource.resource_type != URL_TYPE {
            return None;
        }
        let url = resource.properties.get("url")?.clone();
        let method = resource
            .properties
            .get("method")
            .cloned()
            .unwrap_or_default();
        Some(Self::with_method(
            resource.tenant_id.clone(),
            resource.environment_id.clone(),
            resource.resource_id.clone(),
            url,
            method,
        ))
    }

    /// Human-readable name used in log output.
    pub fn name(&self) -> String {
        format!("{}.{}", self.resource_id, self.url)
    }
}

impl PartialEq for Destination {
    fn eq(&self, other: &Self) -> bool {
        self.resource_id == other.resource_id
    }
}

impl Eq for Destination {}

impl Hash for Destination {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resource_id.hash(state);
    }
}

/// Outcome of one probe of one destination in one round.
///
/// Exactly one of these exists per snapshot destination per round. It is
/// consumed by the reporter and never retained.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// The probed destination
    pub destination: Destination,
    /// Instant the outcome was captured
    pub timestamp: DateTime<Utc>,
    /// Elapsed wall-clock time of the probe in milliseconds
    pub duration_ms: u64,
    /// HTTP status code, or a negative sentinel for transport error / timeout
    pub code: i32,
    /// True when the probe was cancelled at the round budget
    pub timed_out: bool,
    /// Traits extracted from the response headers, empty on failure paths
    pub traits: Traits,
}

impl ProbeResult {
    /// Result for a destination that answered with an HTTP response.
    pub fn responded(
        destination: Destination,
        timestamp: DateTime<Utc>,
        duration_ms: u64,
        code: i32,
        traits: Traits,
    ) -> Self {
        Self {
            destination,
            timestamp,
            duration_ms,
            code,
            timed_out: false,
            traits,
        }
    }

    /// Result for a probe that failed before an HTTP response arrived.
    pub fn transport_error(
        destination: Destination,
        timestamp: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        Self {
            destination,
            timestamp,
            duration_ms,
            code: TRANSPORT_ERROR_CODE,
            timed_out: false,
            traits: Traits::empty(timestamp),
        }
    }

    /// Result synthesized by the coordinator for a probe cancelled at the
    /// round budget. `duration_ms` is the full budget, keeping the invariant
    /// that timed-out results never report less than the budget.
    pub fn timeout(destination: Destination, timestamp: DateTime<Utc>, budget_ms: u64) -> Self {
        Self {
            destination,
            timestamp,
            duration_ms: budget_ms,
            code: TIMEOUT_CODE,
            timed_out: true,
            traits: Traits::empty(timestamp),
        }
    }
}
