//! Internal domain models for artwork resolution.
//!
//! These types are OUR types - they don't change when external APIs
//! change. All external API responses get converted into these via
//! adapters.

use crate::model::MediaType;

/// A game identified by the hash-lookup database.
#[derive(Debug, Clone, Default)]
pub struct GameInfo {
    /// Database identifier
    pub id: String,
    /// Best-available display name (see adapter name preference)
    pub name: String,
    /// Artwork assets available for this game
    pub media: Vec<MediaAsset>,
}

/// One artwork asset attached to a [`GameInfo`].
#[derive(Debug, Clone)]
pub struct MediaAsset {
    /// Which kind of artwork this is, when the source tag is recognised
    pub media_type: Option<MediaType>,
    /// Region label as the source reports it (e.g. "us", "eu", "wor")
    pub region: String,
    /// Direct download URL (may be empty for placeholder entries)
    pub url: String,
}

/// A match found in a catalog manifest by the fuzzy matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestMatch {
    /// Canonical manifest entry (no extension)
    pub name: String,
    /// True when the match came from a stripped-variant or title-only
    /// phase rather than an exact hit
    pub best_effort: bool,
}

/// Errors that can occur during artwork resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ArtworkError {
    /// Missing or invalid source configuration; fatal, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeouts, connection failures, 5xx; retried with backoff where a
    /// retry budget exists.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote answered but we couldn't make sense of it.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Provider signalled rate limiting (HTTP 429 or equivalent).
    #[error("Rate limited - try again later")]
    RateLimited,

    /// Credentials rejected (HTTP 401/403); never retried.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// The platform is not published by this source.
    ///
    /// Only surfaced from prefetch, where "validate the platform exists"
    /// is the whole point; ordinary lookups report this as a miss.
    #[error("Platform not available: {0}")]
    PlatformUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArtworkError::AuthRejected("bad devid".to_string());
        assert!(err.to_string().contains("bad devid"));

        let err = ArtworkError::Configuration("missing credentials".to_string());
        assert!(err.to_string().contains("missing credentials"));
    }
}
