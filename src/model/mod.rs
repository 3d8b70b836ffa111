//! Core data models for artwork resolution.
//!
//! Defines the request/response types that flow between the orchestrator
//! and the lookup sources: [`LocalFile`], [`LookupRequest`], [`LookupResult`],
//! and the per-source configuration record [`SourceConfig`].

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A local file that is a candidate for identification.
///
/// Created by the scanner, consumed read-only by the resolution engine.
#[derive(Debug, Clone)]
pub struct LocalFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Full filename, including extension
    pub file_name: String,
    /// Filename without extension
    pub stem: String,
    /// Extension without the dot, lowercased (empty if none)
    pub extension: String,
    /// File size in bytes
    pub size: u64,
}

impl LocalFile {
    /// Build a `LocalFile` from a path and its known size.
    ///
    /// The stem is everything before the final dot, so `Game (USA).zip`
    /// yields `Game (USA)`.
    pub fn new(path: PathBuf, size: u64) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        Self {
            path,
            file_name,
            stem,
            extension,
            size,
        }
    }
}

/// The kind of artwork requested for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    /// 2D box art (default)
    #[default]
    Boxart,
    /// In-game screenshot
    Snap,
    /// Title screen
    Title,
}

impl MediaType {
    /// All media types, in catalog folder order.
    pub const ALL: [MediaType; 3] = [MediaType::Boxart, MediaType::Snap, MediaType::Title];

    /// Parse a user-facing name ("boxart", "snap", "title").
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "boxart" | "box" => Some(Self::Boxart),
            "snap" | "snapshot" | "screenshot" => Some(Self::Snap),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    /// User-facing name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boxart => "boxart",
            Self::Snap => "snap",
            Self::Title => "title",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single artwork lookup request, handed to each source in the
/// fallback chain.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    /// The file being identified
    pub file: LocalFile,
    /// CRC-32 digest of the file contents, if a hash-capable source is
    /// enabled. Skipped otherwise to avoid wasted I/O.
    pub content_hash: Option<String>,
    /// Numeric platform id (see [`crate::platforms`])
    pub platform_id: u32,
    /// Which artwork kind the caller wants
    pub media_type: MediaType,
    /// Region labels in preference order, e.g. `["USA", "World", "Europe"]`
    pub region_priority: Vec<String>,
}

/// Outcome of a lookup against one source (or the whole chain).
///
/// `found == false` and `media_url.is_none()` are distinct states: the
/// former means no candidate was identified at all, the latter can also
/// mean "identified, but no asset of the requested media type exists".
#[derive(Debug, Clone, Default)]
pub struct LookupResult {
    /// Whether any candidate was identified
    pub found: bool,
    /// Source-specific identifier for the match (catalog filename or
    /// database id)
    pub matched_id: Option<String>,
    /// Human-readable name of the identified title
    pub display_name: Option<String>,
    /// Direct URL for the requested artwork, when available
    pub media_url: Option<String>,
    /// True when the identification came from fuzzy (non-exact) matching
    pub best_effort: bool,
    /// Source-specific extras (region, match phase, ...)
    pub extra: HashMap<String, String>,
}

impl LookupResult {
    /// The canonical miss.
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Configuration for one lookup source, as it appears in the config file.
///
/// `options` stays opaque at this level; each source deserializes it into
/// its own typed options struct during `initialize` and fails fast there
/// on invalid shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source id, matching a registered factory (e.g. "thumbs", "hashdb")
    pub id: String,
    /// Disabled sources are never constructed
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower priority is tried earlier; ties keep registration order
    #[serde(default)]
    pub priority: i32,
    /// Source-specific options (credentials, delays, ...)
    #[serde(default = "default_options")]
    pub options: toml::Value,
}

fn default_enabled() -> bool {
    true
}

fn default_options() -> toml::Value {
    toml::Value::Table(Default::default())
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            enabled: true,
            priority: 0,
            options: toml::Value::Table(Default::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_file_splits_name() {
        let file = LocalFile::new(PathBuf::from("/roms/nes/Metroid (USA).zip"), 131072);
        assert_eq!(file.file_name, "Metroid (USA).zip");
        assert_eq!(file.stem, "Metroid (USA)");
        assert_eq!(file.extension, "zip");
        assert_eq!(file.size, 131072);
    }

    #[test]
    fn test_local_file_without_extension() {
        let file = LocalFile::new(PathBuf::from("/roms/Metroid"), 10);
        assert_eq!(file.stem, "Metroid");
        assert!(file.extension.is_empty());
    }

    #[test]
    fn test_media_type_parse() {
        assert_eq!(MediaType::parse("boxart"), Some(MediaType::Boxart));
        assert_eq!(MediaType::parse("Screenshot"), Some(MediaType::Snap));
        assert_eq!(MediaType::parse("title"), Some(MediaType::Title));
        assert_eq!(MediaType::parse("cartridge"), None);
    }

    #[test]
    fn test_source_config_defaults() {
        let config: SourceConfig = toml::from_str(r#"id = "thumbs""#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.priority, 0);
    }

    #[test]
    fn test_not_found_is_distinct_from_missing_asset() {
        let miss = LookupResult::not_found();
        assert!(!miss.found);
        assert!(miss.media_url.is_none());

        let hit_without_asset = LookupResult {
            found: true,
            matched_id: Some("1234".to_string()),
            ..Default::default()
        };
        assert!(hit_without_asset.found);
        assert!(hit_without_asset.media_url.is_none());
    }
}
