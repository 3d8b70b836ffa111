//! Artwork resolution engine.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - internal types representing our
//!   business logic; external API shapes never leak past an adapter
//! - **Source contract** (`source.rs`) - the capability/lifecycle/lookup
//!   trait every source implements
//! - **Registry** (`registry.rs`) - named factories and the
//!   priority-ordered fallback chain
//! - **Sources** - `thumbs` (catalog manifest + fuzzy matching) and
//!   `hashdb` (CRC identification)
//!
//! The engine runs lookups one file at a time, one source at a time:
//! the rate-limited hashdb client owns its request-timing state, and
//! interleaving requests across it would break the minimum-interval
//! guarantee. Network calls and file hashing are the only suspension
//! points.

pub mod domain;
pub mod hashdb;
pub mod registry;
pub mod source;
pub mod thumbs;

pub use domain::{ArtworkError, GameInfo, ManifestMatch, MediaAsset};
pub use registry::{ChainOutcome, SourceChain, SourceRegistry};
pub use source::{ArtworkSource, SourceCapabilities};

/// A registry with this build's sources pre-registered.
pub fn default_registry() -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    registry.register(thumbs::SOURCE_ID, |_options| {
        Box::new(thumbs::ThumbSource::new())
    });
    registry.register(hashdb::SOURCE_ID, |options| {
        Box::new(hashdb::HashDbSource::new(options))
    });
    registry
}
