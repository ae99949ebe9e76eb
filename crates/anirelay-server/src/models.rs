//! API request and response models.

use serde::{Deserialize, Serialize};

use anirelay_core::ContentKind;

/// Query parameters for the relay routes.
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    /// Absolute URL of the upstream resource.
    ///
    /// Absent entirely → the route answers with a usage explanation;
    /// present but empty → 400.
    pub url: Option<String>,
}

/// Self-describing usage payload returned when `url` is omitted.
#[derive(Debug, Serialize)]
pub struct RouteHelp {
    /// The route path.
    pub path: &'static str,
    /// MIME type this route serves.
    #[serde(rename = "contentType")]
    pub content_type: ContentKind,
    /// What the route proxies.
    pub description: &'static str,
    /// How to call the route.
    pub usage: String,
    /// A concrete example request.
    pub example: String,
}

impl RouteHelp {
    /// Builds the help payload for a content kind.
    pub fn for_kind(kind: ContentKind) -> Self {
        Self {
            path: kind.route(),
            content_type: kind,
            description: kind.description(),
            usage: format!("GET {}?url=<absolute-URL>", kind.route()),
            example: format!(
                "GET {}?url=https://example.com/resource",
                kind.route()
            ),
        }
    }
}

/// Request body for POST /exchange-token.
#[derive(Debug, Deserialize)]
pub struct TokenExchangeRequest {
    /// OAuth authorization code from the redirect.
    pub code: String,
}

/// Response body for POST /exchange-token.
#[derive(Debug, Serialize)]
pub struct TokenExchangeResponse {
    /// Access token, casing preserved for the frontend.
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Token reply shape from the upstream OAuth provider.
#[derive(Debug, Deserialize)]
pub struct UpstreamTokenResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_help_names_the_route() {
        let help = RouteHelp::for_kind(ContentKind::M3u8);
        assert_eq!(help.path, "/api/m3u8");
        assert!(help.usage.contains("/api/m3u8?url="));

        let json = serde_json::to_value(&help).unwrap();
        assert_eq!(json["contentType"], "application/x-mpegURL");
        assert!(json["example"].as_str().unwrap().starts_with("GET /api/m3u8"));
    }

    #[test]
    fn access_token_serializes_camel_case() {
        let body = TokenExchangeResponse {
            access_token: "tok".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["accessToken"], "tok");
        assert!(json.get("access_token").is_none());
    }
}
