//! Content kinds the relay knows how to serve.
//!
//! Each kind couples a route with the MIME type the response must carry
//! and the payload handling the relay applies (see [`crate::relay`]).

use serde::{Serialize, Serializer};

/// The content types the relay can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// WebVTT subtitle tracks (`text/vtt`).
    Vtt,
    /// HLS playlists (`application/x-mpegURL`).
    M3u8,
    /// Plain text payloads (`text/plain`).
    Text,
    /// JSON payloads, normalized by re-serialization (`application/json`).
    Json,
}

impl ContentKind {
    /// All kinds, in route-table order.
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Vtt,
        ContentKind::M3u8,
        ContentKind::Text,
        ContentKind::Json,
    ];

    /// The MIME type stamped on responses for this kind.
    ///
    /// This always wins over whatever the upstream server declared.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentKind::Vtt => "text/vtt",
            ContentKind::M3u8 => "application/x-mpegURL",
            ContentKind::Text => "text/plain",
            ContentKind::Json => "application/json",
        }
    }

    /// The route this kind is served under.
    pub fn route(&self) -> &'static str {
        match self {
            ContentKind::Vtt => "/api/vtt",
            ContentKind::M3u8 => "/api/m3u8",
            ContentKind::Text => "/api/text",
            ContentKind::Json => "/api/json",
        }
    }

    /// Human-readable description for the route help payload.
    pub fn description(&self) -> &'static str {
        match self {
            ContentKind::Vtt => "Proxies WebVTT subtitle files",
            ContentKind::M3u8 => "Proxies HLS playlists and segments",
            ContentKind::Text => "Proxies plain text resources",
            ContentKind::Json => "Proxies JSON APIs, pretty-printing the response",
        }
    }

    /// Whether the payload is decoded as text or passed through as bytes.
    pub fn is_textual(&self) -> bool {
        matches!(self, ContentKind::Vtt | ContentKind::Text | ContentKind::Json)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl Serialize for ContentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_match_routes() {
        assert_eq!(ContentKind::Vtt.mime_type(), "text/vtt");
        assert_eq!(ContentKind::Vtt.route(), "/api/vtt");
        assert_eq!(ContentKind::M3u8.mime_type(), "application/x-mpegURL");
        assert_eq!(ContentKind::M3u8.route(), "/api/m3u8");
        assert_eq!(ContentKind::Text.mime_type(), "text/plain");
        assert_eq!(ContentKind::Text.route(), "/api/text");
        assert_eq!(ContentKind::Json.mime_type(), "application/json");
        assert_eq!(ContentKind::Json.route(), "/api/json");
    }

    #[test]
    fn m3u8_is_opaque() {
        assert!(!ContentKind::M3u8.is_textual());
        assert!(ContentKind::Vtt.is_textual());
        assert!(ContentKind::Text.is_textual());
        assert!(ContentKind::Json.is_textual());
    }

    #[test]
    fn routes_are_distinct() {
        for a in ContentKind::ALL {
            for b in ContentKind::ALL {
                if a != b {
                    assert_ne!(a.route(), b.route());
                    assert_ne!(a.mime_type(), b.mime_type());
                }
            }
        }
    }

    #[test]
    fn serializes_as_mime() {
        let json = serde_json::to_string(&ContentKind::M3u8).unwrap();
        assert_eq!(json, "\"application/x-mpegURL\"");
    }

    #[test]
    fn display_is_mime() {
        assert_eq!(ContentKind::Json.to_string(), "application/json");
    }
}
