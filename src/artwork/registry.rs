//! Source registry and priority-ordered fallback.
//!
//! The registry maps string ids to factory functions so new sources can
//! be added without touching the fallback logic. `build` turns the
//! configured sources into an initialized [`SourceChain`]; lookups walk
//! the chain in ascending priority order until one source reports a find.

use tracing::{debug, warn};

use super::domain::ArtworkError;
use super::source::ArtworkSource;
use crate::model::{LookupRequest, LookupResult, SourceConfig};

/// Factory for one source kind. Receives the opaque options bag from the
/// config; validation happens later, in the source's `initialize`.
pub type SourceFactory = Box<dyn Fn(toml::Value) -> Box<dyn ArtworkSource> + Send + Sync>;

/// Named source constructors, in registration order.
#[derive(Default)]
pub struct SourceRegistry {
    factories: Vec<(String, SourceFactory)>,
}

/// An initialized source with its chain position.
pub struct ActiveSource {
    /// Config/registry id ("thumbs", "hashdb", ...)
    pub id: String,
    /// Lower is tried earlier
    pub priority: i32,
    source: Box<dyn ArtworkSource>,
}

/// The priority-ordered fallback chain produced by [`SourceRegistry::build`].
pub struct SourceChain {
    sources: Vec<ActiveSource>,
}

/// Result of walking the chain for one request.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    /// The winning result, or a not-found when every source missed
    pub result: LookupResult,
    /// Id of the source that produced the find, when there was one
    pub source_id: Option<String>,
}

impl SourceRegistry {
    /// An empty registry. Callers register factories before `build`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under an id. Later configs referring to this id
    /// get an instance from this factory.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        factory: impl Fn(toml::Value) -> Box<dyn ArtworkSource> + Send + Sync + 'static,
    ) {
        self.factories.push((id.into(), Box::new(factory)));
    }

    /// Construct and initialize one source per enabled config.
    ///
    /// Sources whose `initialize` fails are dropped from the chain with a
    /// warning; configs naming an unregistered id are skipped likewise.
    /// The surviving sources are stable-sorted by ascending priority, so
    /// equal priorities keep registration order.
    pub async fn build(&self, configs: &[SourceConfig]) -> SourceChain {
        let mut sources = Vec::new();

        for config in configs {
            if !self.factories.iter().any(|(id, _)| id == &config.id) {
                warn!("Source '{}' has no registered factory, skipping", config.id);
            }
        }

        for (id, factory) in &self.factories {
            let Some(config) = configs.iter().find(|c| &c.id == id) else {
                continue;
            };
            if !config.enabled {
                debug!("Source '{}' disabled by configuration", id);
                continue;
            }

            let mut source = factory(config.options.clone());
            match source.initialize().await {
                Ok(()) => {
                    sources.push(ActiveSource {
                        id: id.clone(),
                        priority: config.priority,
                        source,
                    });
                }
                Err(e) => {
                    warn!("Source '{}' failed to initialize, skipping: {}", id, e);
                }
            }
        }

        sources.sort_by_key(|s| s.priority);
        SourceChain { sources }
    }
}

impl SourceChain {
    /// Number of usable sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the chain is empty (nothing configured or all failed init).
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether any source in the chain wants a content hash. When false
    /// the orchestrator skips hashing entirely.
    pub fn needs_hash(&self) -> bool {
        self.sources
            .iter()
            .any(|s| s.source.capabilities().needs_hash)
    }

    /// Fail-fast cache warm-up across the chain for one platform.
    pub async fn prefetch(&self, platform_id: u32) -> Result<(), ArtworkError> {
        for active in &self.sources {
            if !active.source.supports_platform(platform_id) {
                debug!("Source '{}' does not support platform {}", active.id, platform_id);
                continue;
            }
            active.source.prefetch(platform_id).await?;
        }
        Ok(())
    }

    /// Try each source in priority order; the first find wins.
    ///
    /// A source error is logged and treated exactly like a miss - the
    /// chain moves on. When every source misses or fails, the outcome is
    /// a plain not-found with no source id.
    pub async fn lookup_with_fallback(&self, request: &LookupRequest) -> ChainOutcome {
        for active in &self.sources {
            if !active.source.supports_platform(request.platform_id) {
                debug!(
                    "Source '{}' skipped: platform {} unsupported",
                    active.id, request.platform_id
                );
                continue;
            }

            match active.source.lookup(request).await {
                Ok(result) if result.found => {
                    debug!("Source '{}' matched {:?}", active.id, request.file.file_name);
                    return ChainOutcome {
                        result,
                        source_id: Some(active.id.clone()),
                    };
                }
                Ok(_) => {
                    debug!("Source '{}' missed {:?}", active.id, request.file.file_name);
                }
                Err(e) => {
                    warn!(
                        "Source '{}' failed on {:?}: {}",
                        active.id, request.file.file_name, e
                    );
                }
            }
        }

        ChainOutcome {
            result: LookupResult::not_found(),
            source_id: None,
        }
    }

    /// Dispose every source in the chain.
    pub async fn dispose(&mut self) {
        for active in &mut self.sources {
            active.source.dispose().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::source::mocks::MockSource;
    use crate::model::{LocalFile, MediaType};
    use std::path::PathBuf;

    fn request() -> LookupRequest {
        LookupRequest {
            file: LocalFile::new(PathBuf::from("/roms/Metroid (USA).zip"), 128),
            content_hash: None,
            platform_id: 3,
            media_type: MediaType::Boxart,
            region_priority: vec!["USA".to_string()],
        }
    }

    fn configs(ids: &[&str]) -> Vec<SourceConfig> {
        ids.iter()
            .map(|id| SourceConfig {
                id: id.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fallback_to_second_source() {
        let mut registry = SourceRegistry::new();
        registry.register("first", |_| Box::new(MockSource::missing()));
        registry.register("second", |_| Box::new(MockSource::finding("Metroid (USA)")));

        let chain = registry.build(&configs(&["first", "second"])).await;
        let outcome = chain.lookup_with_fallback(&request()).await;

        assert!(outcome.result.found);
        assert_eq!(outcome.source_id.as_deref(), Some("second"));
        assert_eq!(outcome.result.matched_id.as_deref(), Some("Metroid (USA)"));
    }

    #[tokio::test]
    async fn test_error_treated_as_miss() {
        let mut registry = SourceRegistry::new();
        registry.register("flaky", |_| Box::new(MockSource::erroring()));
        registry.register("stable", |_| Box::new(MockSource::finding("Metroid (USA)")));

        let chain = registry.build(&configs(&["flaky", "stable"])).await;
        let outcome = chain.lookup_with_fallback(&request()).await;

        assert!(outcome.result.found);
        assert_eq!(outcome.source_id.as_deref(), Some("stable"));
    }

    #[tokio::test]
    async fn test_all_miss_is_not_found() {
        let mut registry = SourceRegistry::new();
        registry.register("a", |_| Box::new(MockSource::missing()));
        registry.register("b", |_| Box::new(MockSource::erroring()));

        let chain = registry.build(&configs(&["a", "b"])).await;
        let outcome = chain.lookup_with_fallback(&request()).await;

        assert!(!outcome.result.found);
        assert!(outcome.source_id.is_none());
    }

    #[tokio::test]
    async fn test_priority_order_overrides_registration() {
        let mut registry = SourceRegistry::new();
        registry.register("late", |_| Box::new(MockSource::finding("from-late")));
        registry.register("early", |_| Box::new(MockSource::finding("from-early")));

        let mut cfgs = configs(&["late", "early"]);
        cfgs[0].priority = 10;
        cfgs[1].priority = 1;

        let chain = registry.build(&cfgs).await;
        let outcome = chain.lookup_with_fallback(&request()).await;

        assert_eq!(outcome.result.matched_id.as_deref(), Some("from-early"));
    }

    #[tokio::test]
    async fn test_failed_initialize_dropped() {
        let mut registry = SourceRegistry::new();
        registry.register("broken", |_| Box::new(MockSource::bad_config()));
        registry.register("ok", |_| Box::new(MockSource::finding("hit")));

        let chain = registry.build(&configs(&["broken", "ok"])).await;
        assert_eq!(chain.len(), 1);

        let outcome = chain.lookup_with_fallback(&request()).await;
        assert_eq!(outcome.source_id.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_unregistered_id_skipped() {
        let mut registry = SourceRegistry::new();
        registry.register("known", |_| Box::new(MockSource::finding("hit")));

        // A config naming an id with no factory must not break the rest
        let chain = registry.build(&configs(&["typo", "known"])).await;
        assert_eq!(chain.len(), 1);

        let outcome = chain.lookup_with_fallback(&request()).await;
        assert_eq!(outcome.source_id.as_deref(), Some("known"));
    }

    #[tokio::test]
    async fn test_disabled_source_not_built() {
        let mut registry = SourceRegistry::new();
        registry.register("off", |_| Box::new(MockSource::finding("hit")));

        let mut cfgs = configs(&["off"]);
        cfgs[0].enabled = false;

        let chain = registry.build(&cfgs).await;
        assert!(chain.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_platform_skipped() {
        let mut registry = SourceRegistry::new();
        registry.register("narrow", |_| {
            let mut source = MockSource::finding("hit");
            source.supported_platforms = vec![12]; // not platform 3
            Box::new(source)
        });

        let chain = registry.build(&configs(&["narrow"])).await;
        let outcome = chain.lookup_with_fallback(&request()).await;
        assert!(!outcome.result.found);
    }

    #[tokio::test]
    async fn test_dispose_reaches_every_source() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let disposed_a = Arc::new(AtomicBool::new(false));
        let disposed_b = Arc::new(AtomicBool::new(false));

        let mut registry = SourceRegistry::new();
        let flag = disposed_a.clone();
        registry.register("a", move |_| {
            let mut source = MockSource::missing();
            source.disposed = flag.clone();
            Box::new(source)
        });
        let flag = disposed_b.clone();
        registry.register("b", move |_| {
            let mut source = MockSource::finding("hit");
            source.disposed = flag.clone();
            Box::new(source)
        });

        let mut chain = registry.build(&configs(&["a", "b"])).await;
        chain.dispose().await;

        assert!(disposed_a.load(Ordering::SeqCst));
        assert!(disposed_b.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_needs_hash_aggregation() {
        let mut registry = SourceRegistry::new();
        registry.register("name-only", |_| Box::new(MockSource::missing()));
        registry.register("hashy", |_| {
            let mut source = MockSource::missing();
            source.needs_hash = true;
            Box::new(source)
        });

        let chain = registry.build(&configs(&["name-only"])).await;
        assert!(!chain.needs_hash());

        let chain = registry.build(&configs(&["name-only", "hashy"])).await;
        assert!(chain.needs_hash());
    }
}
