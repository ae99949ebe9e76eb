//! API route handlers.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, CONTENT_TYPE,
};
use axum::http::{Response, StatusCode, Uri};
use axum::Json;
use bytes::Bytes;
use tracing::{debug, info, warn};

use anirelay_core::{CachedResponse, ContentKind, ResponseCache};

use crate::error::{ApiError, Result};
use crate::models::{
    ProxyQuery, RouteHelp, TokenExchangeRequest, TokenExchangeResponse, UpstreamTokenResponse,
};
use crate::state::AppState;

/// GET /api/vtt - relay a WebVTT resource.
pub async fn proxy_vtt(
    state: State<AppState>,
    uri: Uri,
    query: Query<ProxyQuery>,
) -> Result<Response<Body>> {
    relay_as(ContentKind::Vtt, state, uri, query).await
}

/// GET /api/m3u8 - relay an HLS playlist.
pub async fn proxy_m3u8(
    state: State<AppState>,
    uri: Uri,
    query: Query<ProxyQuery>,
) -> Result<Response<Body>> {
    relay_as(ContentKind::M3u8, state, uri, query).await
}

/// GET /api/text - relay a plain text resource.
pub async fn proxy_text(
    state: State<AppState>,
    uri: Uri,
    query: Query<ProxyQuery>,
) -> Result<Response<Body>> {
    relay_as(ContentKind::Text, state, uri, query).await
}

/// GET /api/json - relay and pretty-print a JSON resource.
pub async fn proxy_json(
    state: State<AppState>,
    uri: Uri,
    query: Query<ProxyQuery>,
) -> Result<Response<Body>> {
    relay_as(ContentKind::Json, state, uri, query).await
}

/// Fallback for unrecognized routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Shared relay path for all four content routes.
///
/// A request without a `url` parameter gets a 200 usage explanation
/// rather than an error; an empty `url` value reaches the relay and
/// fails with 400 there.
async fn relay_as(
    kind: ContentKind,
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<ProxyQuery>,
) -> Result<Response<Body>> {
    let Some(url) = query.url else {
        debug!(route = kind.route(), "No url parameter, answering with usage help");
        return Ok(help_response(kind));
    };

    // Cache key covers the full inbound request including the query.
    let cache_key = state
        .cache
        .as_ref()
        .map(|_| ResponseCache::key("GET", &uri.to_string()));

    if let (Some(cache), Some(key)) = (&state.cache, &cache_key) {
        if let Some(hit) = cache.get(key) {
            debug!(%url, %kind, "Serving cached response");
            return Ok(success_response(
                kind,
                hit.body,
                Some(cache.max_age_secs()),
            ));
        }
    }

    let payload = state.relay.fetch_as(&url, kind).await.map_err(|e| {
        warn!(%url, %kind, error = %e, "Relay failed");
        ApiError::from(e)
    })?;

    let body = payload.to_bytes();
    info!(%url, %kind, bytes = body.len(), "Relayed upstream resource");

    let max_age = state.cache.as_ref().map(|c| c.max_age_secs());

    // Fire-and-forget store; the response path never waits on it.
    if let (Some(cache), Some(key)) = (state.cache.clone(), cache_key) {
        let stored = CachedResponse {
            status: 200,
            content_type: kind.mime_type(),
            body: body.clone(),
        };
        tokio::spawn(async move {
            cache.insert(key, stored);
        });
    }

    Ok(success_response(kind, body, max_age))
}

/// POST /exchange-token - forward an OAuth authorization code.
pub async fn exchange_token(
    State(state): State<AppState>,
    Json(req): Json<TokenExchangeRequest>,
) -> Result<Json<TokenExchangeResponse>> {
    let Some(oauth) = state.oauth.as_ref() else {
        return Err(ApiError::TokenExchange {
            message: "Token exchange is not configured".to_string(),
            details: "OAuth client credentials are not set on the server".to_string(),
        });
    };

    debug!(token_url = %oauth.token_url, "Exchanging authorization code");

    let body = serde_json::json!({
        "grant_type": "authorization_code",
        "client_id": oauth.client_id,
        "client_secret": oauth.client_secret,
        "redirect_uri": oauth.redirect_uri,
        "code": req.code,
    });

    let response = state
        .http
        .post(&oauth.token_url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ApiError::TokenExchange {
            message: "Failed to exchange token".to_string(),
            details: e.to_string(),
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| ApiError::TokenExchange {
        message: "Failed to exchange token".to_string(),
        details: e.to_string(),
    })?;

    if !status.is_success() {
        warn!(%status, "Token endpoint rejected the exchange");
        return Err(ApiError::TokenExchange {
            message: "Failed to exchange token".to_string(),
            details: text,
        });
    }

    let token: UpstreamTokenResponse =
        serde_json::from_str(&text).map_err(|e| ApiError::TokenExchange {
            message: "Failed to exchange token".to_string(),
            details: e.to_string(),
        })?;

    info!("Token exchange complete");

    Ok(Json(TokenExchangeResponse {
        access_token: token.access_token,
    }))
}

/// 200 usage explanation for a valid route hit without `url`.
fn help_response(kind: ContentKind) -> Response<Body> {
    let help = RouteHelp::for_kind(kind);
    let body = serde_json::to_vec(&help).unwrap_or_default();

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::from(body))
        .unwrap_or_default()
}

/// Builds a success response with the mandatory header set.
///
/// `Content-Type` always reflects the route's declared kind, never what
/// the upstream server said.
fn success_response(kind: ContentKind, body: Bytes, max_age: Option<u64>) -> Response<Body> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, kind.mime_type())
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS")
        .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type");

    if let Some(secs) = max_age {
        builder = builder.header(CACHE_CONTROL, format!("s-maxage={}", secs));
    }

    builder.body(Body::from(body)).unwrap_or_default()
}
