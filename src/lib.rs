//! Probe Engine Library
//!
//! Concurrent round-based probing of a dynamic set of URL destinations:
//! each tick snapshots the live destination set, probes every destination
//! in parallel under a wall-clock budget, extracts fingerprinting traits
//! from response headers and hands the results to external metrics,
//! alerting and trait-store collaborators.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub mod collaborators;
pub mod config;
pub mod pinger;

pub use config::ProbeConfig;
pub use pinger::{
    Destination, DestinationRegistry, HttpProber, ProbeResult, Prober, ResultReporter,
    RoundCoordinator, RoundScheduler, TraitHeader, Traits,
};

/// Install the JSON tracing subscriber. Call once at process startup; the
/// embedding process may install its own subscriber instead.
pub fn init_tracing() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .json()
        .init();
}
