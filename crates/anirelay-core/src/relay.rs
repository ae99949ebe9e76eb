//! The relay: fetch an upstream resource and reshape it for the caller.
//!
//! One fetch per request, no retries. A failed fetch is terminal and is
//! reported with enough context (content type + target URL) to diagnose
//! without log correlation.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::content::ContentKind;
use crate::fetch::{Fetcher, HttpFetcher};

/// Relay error type.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No target URL was supplied.
    #[error("URL parameter is required")]
    MissingUrl,

    /// The upstream fetch failed (network error or non-2xx status).
    #[error("Error fetching {kind}: {message} (url: {url})")]
    Upstream {
        kind: ContentKind,
        url: String,
        message: String,
    },

    /// Upstream declared JSON but the body does not parse.
    #[error("Error fetching application/json: {message}")]
    InvalidJson { message: String },
}

/// A transformed upstream payload, ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Textual body, returned verbatim (or pretty-printed for JSON).
    Text(String),
    /// Opaque body, returned byte-for-byte.
    Binary(Bytes),
}

impl Payload {
    /// The payload as bytes, however it is stored.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Payload::Text(s) => Bytes::copy_from_slice(s.as_bytes()),
            Payload::Binary(b) => b.clone(),
        }
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Payload::Text(s) => s.len(),
            Payload::Binary(b) => b.len(),
        }
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches upstream resources and reshapes them per content kind.
#[derive(Clone)]
pub struct Relay {
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay").finish_non_exhaustive()
    }
}

impl Relay {
    /// Creates a relay backed by the default HTTP fetcher.
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(HttpFetcher::new()))
    }

    /// Creates a relay with an injected fetch capability.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches `url` and transforms the body for `kind`.
    ///
    /// - `application/json`: parse, then re-serialize pretty-printed with
    ///   2-space indentation. A parse failure is an error, never a raw
    ///   passthrough.
    /// - `text/*`: UTF-8 text, verbatim.
    /// - anything else: raw bytes, verbatim.
    pub async fn fetch_as(&self, url: &str, kind: ContentKind) -> Result<Payload, RelayError> {
        if url.trim().is_empty() {
            return Err(RelayError::MissingUrl);
        }

        let upstream = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| RelayError::Upstream {
                kind,
                url: url.to_string(),
                message: e.to_string(),
            })?;

        debug!(url, %kind, bytes = upstream.body.len(), "Fetched upstream resource");

        transform(kind, upstream.body)
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the content-kind-specific body transformation.
fn transform(kind: ContentKind, body: Bytes) -> Result<Payload, RelayError> {
    match kind {
        ContentKind::Json => {
            let value: serde_json::Value =
                serde_json::from_slice(&body).map_err(|e| RelayError::InvalidJson {
                    message: e.to_string(),
                })?;

            // Normalizes minified upstream JSON for downstream consumers;
            // serde_json pretty-prints with 2-space indentation.
            let pretty = serde_json::to_string_pretty(&value).map_err(|e| {
                RelayError::InvalidJson {
                    message: e.to_string(),
                }
            })?;

            Ok(Payload::Text(pretty))
        }
        ContentKind::Vtt | ContentKind::Text => {
            Ok(Payload::Text(String::from_utf8_lossy(&body).into_owned()))
        }
        ContentKind::M3u8 => Ok(Payload::Binary(body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, Upstream};
    use async_trait::async_trait;

    /// Fetcher returning a canned response or error.
    struct MockFetcher {
        result: std::result::Result<Bytes, FetchError>,
    }

    impl MockFetcher {
        fn ok(body: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(Bytes::copy_from_slice(body)),
            })
        }

        fn err(error: FetchError) -> Arc<Self> {
            Arc::new(Self { result: Err(error) })
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<Upstream, FetchError> {
            match &self.result {
                Ok(body) => Ok(Upstream {
                    status: 200,
                    body: body.clone(),
                }),
                Err(FetchError::Request(m)) => Err(FetchError::Request(m.clone())),
                Err(FetchError::Status(s)) => Err(FetchError::Status(*s)),
                Err(FetchError::Body(m)) => Err(FetchError::Body(m.clone())),
            }
        }
    }

    #[tokio::test]
    async fn json_is_pretty_printed() {
        let relay = Relay::with_fetcher(MockFetcher::ok(br#"{"a":1,"b":[2,3]}"#));
        let payload = relay
            .fetch_as("https://example.com/data", ContentKind::Json)
            .await
            .unwrap();

        let expected = "{\n  \"a\": 1,\n  \"b\": [\n    2,\n    3\n  ]\n}";
        assert_eq!(payload, Payload::Text(expected.to_string()));
    }

    #[tokio::test]
    async fn json_round_trips_value() {
        let original = br#"{"title":{"romaji":"One Piece"},"episodes":1100}"#;
        let relay = Relay::with_fetcher(MockFetcher::ok(original));
        let payload = relay
            .fetch_as("https://example.com/anime", ContentKind::Json)
            .await
            .unwrap();

        let Payload::Text(body) = payload else {
            panic!("expected text payload");
        };
        let reparsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        let expected: serde_json::Value = serde_json::from_slice(original).unwrap();
        assert_eq!(reparsed, expected);
    }

    #[tokio::test]
    async fn invalid_json_is_rejected() {
        let relay = Relay::with_fetcher(MockFetcher::ok(b"not json"));
        let err = relay
            .fetch_as("https://example.com/data", ContentKind::Json)
            .await
            .unwrap_err();

        match err {
            RelayError::InvalidJson { message } => {
                assert!(!message.is_empty());
            }
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_is_verbatim() {
        let body = "WEBVTT\n\n00:00.000 --> 00:05.000\nHello\n";
        let relay = Relay::with_fetcher(MockFetcher::ok(body.as_bytes()));
        let payload = relay
            .fetch_as("https://example.com/subs.vtt", ContentKind::Vtt)
            .await
            .unwrap();

        assert_eq!(payload, Payload::Text(body.to_string()));
    }

    #[tokio::test]
    async fn m3u8_is_byte_identical() {
        let body: &[u8] = b"#EXTM3U\n#EXT-X-VERSION:3\n#EXTINF:6.0,\nseg0.ts\n";
        let relay = Relay::with_fetcher(MockFetcher::ok(body));
        let payload = relay
            .fetch_as("https://example.com/playlist.m3u8", ContentKind::M3u8)
            .await
            .unwrap();

        assert_eq!(payload, Payload::Binary(Bytes::copy_from_slice(body)));
    }

    #[tokio::test]
    async fn missing_url_fails_fast() {
        let relay = Relay::with_fetcher(MockFetcher::ok(b"{}"));
        let err = relay.fetch_as("", ContentKind::Json).await.unwrap_err();
        assert!(matches!(err, RelayError::MissingUrl));
        assert_eq!(err.to_string(), "URL parameter is required");
    }

    #[tokio::test]
    async fn upstream_failure_names_kind_and_url() {
        let relay = Relay::with_fetcher(MockFetcher::err(FetchError::Status(503)));
        let err = relay
            .fetch_as("https://example.com/data", ContentKind::Json)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Error fetching application/json:"));
        assert!(message.contains("https://example.com/data"));
        assert!(message.contains("503"));
    }

    #[tokio::test]
    async fn network_error_is_upstream_error_not_panic() {
        let relay = Relay::with_fetcher(MockFetcher::err(FetchError::Request(
            "dns error".to_string(),
        )));
        let err = relay
            .fetch_as("https://unreachable.invalid/x", ContentKind::Text)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Upstream { .. }));
    }
}
