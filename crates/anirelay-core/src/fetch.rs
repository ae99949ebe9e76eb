//! Outbound fetch capability.
//!
//! The relay never talks to the network directly; it goes through the
//! [`Fetcher`] trait so the HTTP client can be swapped out in tests and
//! the upstream timeout lives in one place.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Default timeout for upstream requests.
///
/// The source of truth for upstream latency is third-party streaming and
/// metadata hosts, which occasionally hang; 15s keeps a stuck fetch from
/// pinning a connection indefinitely.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetch error type.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// Upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// Failed to read the response body.
    #[error("failed to read body: {0}")]
    Body(String),
}

/// A successful upstream response.
#[derive(Debug, Clone)]
pub struct Upstream {
    /// Upstream HTTP status code (always 2xx here).
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
}

/// Capability for fetching a remote resource.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues a GET to `url` and returns the body.
    ///
    /// Implementations must treat non-2xx statuses as errors; the relay
    /// never forwards upstream error bodies.
    async fn fetch(&self, url: &str) -> Result<Upstream, FetchError>;
}

/// Production fetcher backed by reqwest.
///
/// Follows redirects with the client default policy and enforces an
/// explicit per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default upstream timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_UPSTREAM_TIMEOUT)
    }

    /// Creates a fetcher with a custom upstream timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Upstream, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_15s() {
        assert_eq!(DEFAULT_UPSTREAM_TIMEOUT, Duration::from_secs(15));
    }

    #[test]
    fn status_error_carries_code() {
        let err = FetchError::Status(503);
        assert_eq!(err.to_string(), "upstream returned status 503");
    }
}
