//! anirelay core - fetch, transform, and caching logic for the relay.
//!
//! This crate holds everything the HTTP surface delegates to:
//!
//! - [`ContentKind`] - the four content types the relay serves and how
//!   each one's payload is handled
//! - [`Fetcher`] / [`HttpFetcher`] - the injected outbound fetch
//!   capability with an explicit upstream timeout
//! - [`Relay`] - one fetch per request, content-type-aware transform,
//!   no retries
//! - [`ResponseCache`] - optional TTL cache keyed by the inbound request
//!
//! ## Example
//!
//! ```no_run
//! use anirelay_core::{ContentKind, Relay};
//!
//! #[tokio::main]
//! async fn main() {
//!     let relay = Relay::new();
//!     let payload = relay
//!         .fetch_as("https://example.com/data.json", ContentKind::Json)
//!         .await
//!         .unwrap();
//!     println!("{} bytes", payload.len());
//! }
//! ```

mod cache;
mod content;
mod fetch;
mod relay;

pub use cache::{CachedResponse, ResponseCache, DEFAULT_MAX_AGE};
pub use content::ContentKind;
pub use fetch::{FetchError, Fetcher, HttpFetcher, Upstream, DEFAULT_UPSTREAM_TIMEOUT};
pub use relay::{Payload, Relay, RelayError};
