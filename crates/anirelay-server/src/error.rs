//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use anirelay_core::RelayError;

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required `url` query parameter absent or empty.
    #[error("URL parameter is required")]
    MissingUrl,

    /// Upstream fetch failed (network error or non-2xx status).
    #[error("{0}")]
    UpstreamFetch(String),

    /// Upstream declared JSON but the body does not parse.
    #[error("{0}")]
    InvalidPayload(String),

    /// Unrecognized route.
    #[error("Not Found")]
    NotFound,

    /// OAuth token exchange failed.
    #[error("{message}")]
    TokenExchange { message: String, details: String },
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::MissingUrl => ApiError::MissingUrl,
            RelayError::InvalidJson { .. } => ApiError::InvalidPayload(err.to_string()),
            RelayError::Upstream { .. } => ApiError::UpstreamFetch(err.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UpstreamFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::TokenExchange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let details = match &self {
            ApiError::TokenExchange { details, .. } => Some(details.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            details,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_message_is_exact() {
        assert_eq!(ApiError::MissingUrl.to_string(), "URL parameter is required");
    }

    #[test]
    fn not_found_message_is_exact() {
        assert_eq!(ApiError::NotFound.to_string(), "Not Found");
    }

    #[test]
    fn relay_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(RelayError::MissingUrl),
            ApiError::MissingUrl
        ));
        assert!(matches!(
            ApiError::from(RelayError::InvalidJson {
                message: "expected value at line 1".to_string()
            }),
            ApiError::InvalidPayload(_)
        ));
    }
}
