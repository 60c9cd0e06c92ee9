//! Trait extraction from HTTP response headers
//!
//! A trait is an interesting piece of information about a probed site, such
//! as the web server implementation or the framework serving the
//! application. Only a closed set of response headers is recognized; all
//! other headers are ignored.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use tracing::trace;

/// The closed set of response headers that carry trait information.
///
/// Matching against header names is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TraitHeader {
    Server,
    XAspnetVersion,
    XPoweredBy,
    XRuntime,
    XVersion,
}

impl TraitHeader {
    const ALL: [TraitHeader; 5] = [
        TraitHeader::Server,
        TraitHeader::XAspnetVersion,
        TraitHeader::XPoweredBy,
        TraitHeader::XRuntime,
        TraitHeader::XVersion,
    ];

    /// Canonical (lowercase) header name for this trait kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraitHeader::Server => "server",
            TraitHeader::XAspnetVersion => "x-aspnet-version",
            TraitHeader::XPoweredBy => "x-powered-by",
            TraitHeader::XRuntime => "x-runtime",
            TraitHeader::XVersion => "x-version",
        }
    }

    /// Case-insensitive lookup of a header name against the recognized set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|h| h.as_str().eq_ignore_ascii_case(name))
    }
}

/// A collection of traits extracted from one HTTP response, stamped with the
/// instant the response was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traits {
    timestamp: DateTime<Utc>,
    items: BTreeMap<TraitHeader, String>,
}

impl Traits {
    /// Collect traits from the given response headers.
    ///
    /// Headers are scanned in response order. A recognized kind that occurs
    /// more than once yields the sorted, de-duplicated, comma-space-joined
    /// union of all of its values; each kind accumulates independently and
    /// never leaks into another kind's entry.
    pub fn collect(headers: &HeaderMap, timestamp: DateTime<Utc>) -> Self {
        let mut values: BTreeMap<TraitHeader, BTreeSet<String>> = BTreeMap::new();

        for (name, value) in headers.iter() {
            let Some(kind) = TraitHeader::from_name(name.as_str()) else {
                continue;
            };
            let Ok(value) = value.to_str() else {
                // Non-ASCII trait values are not expected from real servers;
                // skip rather than store garbage.
                continue;
            };
            trace!("Found a trait header {}: {}", name, value);
            values.entry(kind).or_default().insert(value.to_string());
        }

        let items = values
            .into_iter()
            .map(|(kind, set)| {
                let joined = set.into_iter().collect::<Vec<_>>().join(", ");
                (kind, joined)
            })
            .collect();

        Self { timestamp, items }
    }

    /// An empty trait set, used on failure paths where no response headers
    /// are available.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            items: BTreeMap::new(),
        }
    }

    /// The extracted trait kind / value entries.
    pub fn items(&self) -> &BTreeMap<TraitHeader, String> {
        &self.items
    }

    /// The instant the response these traits came from was received.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Entries keyed by the canonical header name, for hand-off to
    /// collaborators that speak strings.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.items
            .iter()
            .map(|(kind, value)| (kind.as_str().to_string(), value.clone()))
            .collect()
    }
}
