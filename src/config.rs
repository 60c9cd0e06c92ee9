//! Engine configuration
//!
//! Defaults mirror the production schedule: 15 polling rounds of 500 ms
//! each, for a 7500 ms round budget. Environment variables override the
//! defaults at deployment time.

use std::env;
use std::time::Duration;

/// Configuration for one probing engine instance.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Number of polling rounds before outstanding probes are cancelled
    pub rounds: u32,
    /// Wait between polling rounds
    pub wait: Duration,
    /// Per-request timeout on the HTTP client, independent of the round
    /// budget
    pub request_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        let rounds = 15;
        let wait = Duration::from_millis(500);
        Self {
            rounds,
            wait,
            request_timeout: wait * rounds,
        }
    }
}

impl ProbeConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Recognized variables: `PROBE_ROUNDS`, `PROBE_WAIT_MILLIS`,
    /// `PROBE_REQUEST_TIMEOUT_MILLIS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let rounds = env_parse("PROBE_ROUNDS").unwrap_or(defaults.rounds);
        let wait = env_parse("PROBE_WAIT_MILLIS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.wait);
        let request_timeout = env_parse("PROBE_REQUEST_TIMEOUT_MILLIS")
            .map(Duration::from_millis)
            .unwrap_or(wait * rounds);
        Self {
            rounds,
            wait,
            request_timeout,
        }
    }

    /// Total round budget after which outstanding probes are cancelled and
    /// reported as timeouts.
    pub fn timeout(&self) -> Duration {
        self.wait * self.rounds
    }

    /// The round budget in milliseconds, as reported on timed-out results.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout().as_millis() as u64
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_is_7500_ms() {
        let config = ProbeConfig::default();
        assert_eq!(config.rounds, 15);
        assert_eq!(config.wait, Duration::from_millis(500));
        assert_eq!(config.timeout(), Duration::from_millis(7500));
        assert_eq!(config.timeout_ms(), 7500);
    }

    #[test]
    fn request_timeout_defaults_to_round_budget() {
        let config = ProbeConfig::default();
        assert_eq!(config.request_timeout, config.timeout());
    }
}
