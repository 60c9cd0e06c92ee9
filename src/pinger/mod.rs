//! The probing engine
//!
//! This module contains the round-based probing core:
//! - `types`: destinations and probe results
//! - `traits`: trait extraction from response headers
//! - `executor`: the HTTP prober
//! - `registry`: the live destination set and discovery merge
//! - `round`: concurrent fan-out with the timeout budget
//! - `reporter`: shaping results for the publishing collaborators
//! - `scheduler`: the tick adapter tying the pieces together

pub mod executor;
pub mod registry;
pub mod reporter;
pub mod round;
pub mod scheduler;
pub mod traits;
pub mod types;

pub use executor::{HttpProber, Prober};
pub use registry::DestinationRegistry;
pub use reporter::ResultReporter;
pub use round::RoundCoordinator;
pub use scheduler::RoundScheduler;
pub use traits::{TraitHeader, Traits};
pub use types::{Destination, ProbeResult, TIMEOUT_CODE, TRANSPORT_ERROR_CODE};
