//! anirelay server - HTTP surface for the caching CORS relay.
//!
//! ## Endpoints
//!
//! - `GET /api/vtt?url=<absolute-URL>` - relay a WebVTT resource
//! - `GET /api/m3u8?url=<absolute-URL>` - relay an HLS playlist
//! - `GET /api/text?url=<absolute-URL>` - relay a plain text resource
//! - `GET /api/json?url=<absolute-URL>` - relay and pretty-print JSON
//! - `POST /exchange-token` - OAuth authorization-code exchange
//!
//! Hitting a relay route without `url` returns a 200 usage explanation;
//! anything else returns 404 `{"error":"Not Found"}`.
//!
//! ## Example
//!
//! ```no_run
//! use anirelay_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::new(ServerConfig::default()).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod error;
mod handlers;
pub mod models;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use anirelay_core::{HttpFetcher, Relay, ResponseCache, DEFAULT_UPSTREAM_TIMEOUT};

pub use error::{ApiError, Result};
pub use state::{AppState, OauthConfig};

/// Default server port.
pub const DEFAULT_PORT: u16 = 3201;

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 127.0.0.1).
    pub host: String,
    /// Port to bind to (default: 3201).
    pub port: u16,
    /// Whether the response cache is enabled.
    pub cache_enabled: bool,
    /// Freshness window for cached responses, in seconds.
    pub cache_max_age: u64,
    /// Timeout for upstream fetches.
    pub upstream_timeout: Duration,
    /// OAuth credentials for /exchange-token, if configured.
    pub oauth: Option<OauthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cache_enabled: true,
            cache_max_age: 3600,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            oauth: None,
        }
    }
}

impl ServerConfig {
    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Disables the response cache.
    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Sets the OAuth configuration.
    pub fn with_oauth(mut self, oauth: OauthConfig) -> Self {
        self.oauth = Some(oauth);
        self
    }
}

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("failed to bind to {0}: {1}")]
    BindError(SocketAddr, std::io::Error),

    /// Server runtime error.
    #[error("server error: {0}")]
    Runtime(String),
}

/// The HTTP server.
pub struct Server {
    router: Router,
    addr: SocketAddr,
}

impl Server {
    /// Creates a new server with the given configuration.
    pub fn new(config: ServerConfig) -> std::result::Result<Self, ServerError> {
        let relay = Relay::with_fetcher(Arc::new(HttpFetcher::with_timeout(
            config.upstream_timeout,
        )));

        let mut state = AppState::with_relay(relay);
        if config.cache_enabled {
            state = state.with_cache(Arc::new(ResponseCache::with_max_age(
                Duration::from_secs(config.cache_max_age),
            )));
        }
        if let Some(oauth) = config.oauth.clone() {
            state = state.with_oauth(oauth);
        }

        Self::with_state(config, state)
    }

    /// Creates a server with custom application state.
    pub fn with_state(
        config: ServerConfig,
        state: AppState,
    ) -> std::result::Result<Self, ServerError> {
        // CORS layer handles preflight; success responses additionally
        // carry explicit CORS headers (see handlers).
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = build_router(state).layer(cors);

        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ServerError::Runtime(format!("invalid address: {}", e)))?;

        Ok(Self { router, addr })
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs the server until shutdown.
    pub async fn run(self) -> std::result::Result<(), ServerError> {
        info!("Starting anirelay on {}", self.addr);

        // SO_REUSEADDR so restarts are not blocked by lingering sockets
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::BindError(self.addr, e))?;
        socket
            .set_reuse_address(true)
            .map_err(|e| ServerError::BindError(self.addr, e))?;
        socket
            .bind(&self.addr.into())
            .map_err(|e| ServerError::BindError(self.addr, e))?;
        socket
            .listen(128)
            .map_err(|e| ServerError::BindError(self.addr, e))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        let std_listener: std::net::TcpListener = socket.into();
        let listener = tokio::net::TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        axum::serve(listener, self.router)
            .await
            .map_err(|e| ServerError::Runtime(e.to_string()))?;

        Ok(())
    }

    /// Returns the router for testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Builds the dispatch table.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/vtt", get(handlers::proxy_vtt))
        .route("/api/m3u8", get(handlers::proxy_m3u8))
        .route("/api/text", get(handlers::proxy_text))
        .route("/api/json", get(handlers::proxy_json))
        .route("/exchange-token", post(handlers::exchange_token))
        .fallback(handlers::not_found)
        .with_state(state)
}
