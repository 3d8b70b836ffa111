//! Thumbnail catalog source: manifest-cached, fuzzy-matched artwork
//! lookups against a community catalog of canonically-named PNGs.
//!
//! Layout mirrors the other sources:
//! - `dto` - exact tree-listing API shapes
//! - `client` - HTTP fetch paths (tree API primary, CDN scrape fallback)
//! - `manifest` - per-platform in-memory cache with negative caching
//! - `matcher` - the three-phase fuzzy matcher
//! - `adapter` - the [`crate::artwork::source::ArtworkSource`] impl

pub mod adapter;
pub mod client;
pub mod dto;
pub mod manifest;
pub mod matcher;

pub use adapter::{ThumbSource, SOURCE_ID};
pub use manifest::{FolderManifest, ManifestCache, SystemManifest};
