//! The lookup-source contract.
//!
//! Every artwork source (catalog-based, hash-based, future additions)
//! implements [`ArtworkSource`]. The trait enables dependency injection
//! and mocking: production code goes through the registry, tests
//! substitute the mock implementations at the bottom of this file.

use async_trait::async_trait;

use super::domain::ArtworkError;
use crate::model::{LookupRequest, LookupResult, MediaType};

/// What a source can do, declared up front so the orchestrator can skip
/// work the enabled sources will never use (hashing, most notably).
#[derive(Debug, Clone)]
pub struct SourceCapabilities {
    /// Requires `LookupRequest::content_hash` to be populated
    pub needs_hash: bool,
    /// Matches on the local filename
    pub uses_filename: bool,
    /// Media types this source can serve
    pub media_types: Vec<MediaType>,
}

/// A pluggable artwork lookup source.
///
/// Lifecycle: construct via a registered factory, `initialize` once
/// (validate and deserialize typed options; failures drop the source from
/// the chain), then any number of `lookup`/`prefetch` calls, then
/// `dispose`.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    /// Declared capabilities; stable for the life of the instance.
    fn capabilities(&self) -> SourceCapabilities;

    /// Whether this source can serve the given platform at all.
    fn supports_platform(&self, platform_id: u32) -> bool;

    /// Validate configuration. Called once before the source joins the
    /// fallback chain; an error here removes it from the chain.
    async fn initialize(&mut self) -> Result<(), ArtworkError>;

    /// Optionally warm caches for a platform, failing fast on problems
    /// that `lookup` would swallow into a cached negative.
    async fn prefetch(&self, _platform_id: u32) -> Result<(), ArtworkError> {
        Ok(())
    }

    /// Attempt to resolve artwork for one file.
    ///
    /// A miss is `Ok` with `found == false`; `Err` means this attempt
    /// failed internally and the chain should move on.
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult, ArtworkError>;

    /// Release any resources. Default: nothing to do.
    async fn dispose(&mut self) {}
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Mock source with a canned response, for registry tests.
    pub struct MockSource {
        pub needs_hash: bool,
        pub supported_platforms: Vec<u32>,
        pub result: Result<LookupResult, ArtworkError>,
        pub init_error: Option<ArtworkError>,
        /// Set by `dispose`, shared so tests can observe the lifecycle
        pub disposed: Arc<AtomicBool>,
    }

    impl MockSource {
        /// A source that always misses.
        pub fn missing() -> Self {
            Self {
                needs_hash: false,
                supported_platforms: vec![],
                result: Ok(LookupResult::not_found()),
                init_error: None,
                disposed: Arc::new(AtomicBool::new(false)),
            }
        }

        /// A source that always finds the given id.
        pub fn finding(matched_id: &str) -> Self {
            Self {
                result: Ok(LookupResult {
                    found: true,
                    matched_id: Some(matched_id.to_string()),
                    display_name: Some(matched_id.to_string()),
                    media_url: Some(format!("https://art.example.com/{matched_id}.png")),
                    best_effort: false,
                    extra: Default::default(),
                }),
                ..Self::missing()
            }
        }

        /// A source whose lookups fail internally.
        pub fn erroring() -> Self {
            Self {
                result: Err(ArtworkError::Network("connection reset".to_string())),
                ..Self::missing()
            }
        }

        /// A source that fails initialization.
        pub fn bad_config() -> Self {
            Self {
                init_error: Some(ArtworkError::Configuration("missing key".to_string())),
                ..Self::missing()
            }
        }
    }

    #[async_trait]
    impl ArtworkSource for MockSource {
        fn capabilities(&self) -> SourceCapabilities {
            SourceCapabilities {
                needs_hash: self.needs_hash,
                uses_filename: true,
                media_types: MediaType::ALL.to_vec(),
            }
        }

        fn supports_platform(&self, platform_id: u32) -> bool {
            self.supported_platforms.is_empty()
                || self.supported_platforms.contains(&platform_id)
        }

        async fn initialize(&mut self) -> Result<(), ArtworkError> {
            match &self.init_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        async fn lookup(&self, _request: &LookupRequest) -> Result<LookupResult, ArtworkError> {
            self.result.clone()
        }

        async fn dispose(&mut self) {
            self.disposed.store(true, Ordering::SeqCst);
        }
    }
}
