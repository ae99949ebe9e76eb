//! Application state for the HTTP surface.

use std::sync::Arc;

use anirelay_core::{Relay, ResponseCache};

/// OAuth client credentials for the token exchange route.
///
/// Held server-side; the browser only ever sends the authorization code.
#[derive(Clone)]
pub struct OauthConfig {
    /// Token endpoint of the OAuth provider.
    pub token_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
}

impl std::fmt::Debug for OauthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OauthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The relay performing upstream fetches.
    pub relay: Relay,
    /// Optional response cache; `None` disables caching entirely.
    pub cache: Option<Arc<ResponseCache>>,
    /// OAuth config for /exchange-token; `None` disables the route's
    /// upstream call (requests then fail with a clear envelope).
    pub oauth: Option<OauthConfig>,
    /// Client used for the token exchange forward.
    pub http: reqwest::Client,
}

impl AppState {
    /// Creates state with a default relay and an enabled cache.
    pub fn new() -> Self {
        Self {
            relay: Relay::new(),
            cache: Some(Arc::new(ResponseCache::new())),
            oauth: None,
            http: reqwest::Client::new(),
        }
    }

    /// Creates state with an injected relay and no cache (test seam).
    pub fn with_relay(relay: Relay) -> Self {
        Self {
            relay,
            cache: None,
            oauth: None,
            http: reqwest::Client::new(),
        }
    }

    /// Enables the cache layer.
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the OAuth configuration.
    pub fn with_oauth(mut self, oauth: OauthConfig) -> Self {
        self.oauth = Some(oauth);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
