//! HTTP probe executor
//!
//! Issues exactly one request per probe and always resolves to a
//! `ProbeResult` — transport failures of any kind become an error-sentinel
//! result rather than an error the round has to handle.

use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method};
use thiserror::Error;
use tracing::{debug, warn};

use super::traits::Traits;
use super::types::{Destination, ProbeResult};
use crate::config::ProbeConfig;

/// Why a probe never produced an HTTP response.
///
/// Every variant collapses to the same transport-error sentinel result; the
/// distinction only feeds the log line.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Performs one network probe of one destination.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe the destination. Never fails: transport problems resolve to a
    /// sentinel result. Exactly one result per invocation.
    async fn probe(&self, destination: &Destination) -> ProbeResult;
}

/// `Prober` backed by a shared `reqwest` client.
///
/// The client carries its own per-request timeout as a backstop; the round
/// budget is enforced separately by the coordinator, which aborts the probe
/// task. Dropping the in-flight future releases the connection.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    async fn attempt(
        &self,
        destination: &Destination,
        started: Instant,
    ) -> std::result::Result<ProbeResult, ProbeFailure> {
        let method = Method::from_bytes(destination.method.as_bytes())
            .map_err(|_| ProbeFailure::InvalidMethod(destination.method.clone()))?;

        let response = self
            .client
            .request(method, &destination.url)
            .send()
            .await?;

        let timestamp = Utc::now();
        let duration_ms = started.elapsed().as_millis() as u64;
        let code = i32::from(response.status().as_u16());
        let traits = Traits::collect(response.headers(), timestamp);

        Ok(ProbeResult::responded(
            destination.clone(),
            timestamp,
            duration_ms,
            code,
            traits,
        ))
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, destination: &Destination) -> ProbeResult {
        let started = Instant::now();
        match self.attempt(destination, started).await {
            Ok(result) => {
                debug!(
                    "Probed {} -> {} in {}ms",
                    destination.name(),
                    result.code,
                    result.duration_ms
                );
                result
            }
            Err(failure) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                warn!("Probe of {} failed: {}", destination.name(), failure);
                ProbeResult::transport_error(destination.clone(), Utc::now(), duration_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinger::traits::TraitHeader;
    use crate::pinger::types::TRANSPORT_ERROR_CODE;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a canned HTTP response to every connection, returning the base
    /// URL of the listener.
    async fn spawn_server(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn probe_records_status_and_traits() {
        let url = spawn_server(
            "HTTP/1.1 200 OK\r\n\
             Server: nginx\r\n\
             X-Powered-By: PHP/8\r\n\
             X-Powered-By: PHP/7\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        )
        .await;

        let prober = HttpProber::new(&ProbeConfig::default()).unwrap();
        let destination = Destination::new("t1", "e1", "r1", url);
        let result = prober.probe(&destination).await;

        assert_eq!(result.code, 200);
        assert!(!result.timed_out);
        assert_eq!(
            result.traits.items().get(&TraitHeader::Server),
            Some(&"nginx".to_string())
        );
        assert_eq!(
            result.traits.items().get(&TraitHeader::XPoweredBy),
            Some(&"PHP/7, PHP/8".to_string())
        );
    }

    #[tokio::test]
    async fn probe_reports_non_success_status() {
        let url = spawn_server(
            "HTTP/1.1 503 Service Unavailable\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        )
        .await;

        let prober = HttpProber::new(&ProbeConfig::default()).unwrap();
        let destination = Destination::new("t1", "e1", "r1", url);
        let result = prober.probe(&destination).await;

        assert_eq!(result.code, 503);
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn connection_refused_yields_error_sentinel() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::new(&ProbeConfig::default()).unwrap();
        let destination = Destination::new("t1", "e1", "r1", format!("http://{}", addr));
        let result = prober.probe(&destination).await;

        assert_eq!(result.code, TRANSPORT_ERROR_CODE);
        assert!(!result.timed_out);
        assert!(result.traits.items().is_empty());
    }

    #[tokio::test]
    async fn malformed_url_yields_error_sentinel() {
        let prober = HttpProber::new(&ProbeConfig::default()).unwrap();
        let destination = Destination::new("t1", "e1", "r1", "not a url at all");
        let result = prober.probe(&destination).await;

        assert_eq!(result.code, TRANSPORT_ERROR_CODE);
        assert!(result.traits.items().is_empty());
    }

    #[tokio::test]
    async fn malformed_method_yields_error_sentinel() {
        let url = spawn_server("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;

        let prober = HttpProber::new(&ProbeConfig::default()).unwrap();
        let destination = Destination::with_method("t1", "e1", "r1", url, "NOT A METHOD");
        let result = prober.probe(&destination).await;

        assert_eq!(result.code, TRANSPORT_ERROR_CODE);
    }
}
