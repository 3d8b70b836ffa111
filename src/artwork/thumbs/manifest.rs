//! Per-platform manifest cache for the thumbnail catalog.
//!
//! A platform's full listing is fetched at most once per process
//! lifetime, successfully or not: failures are cached as terminal
//! negatives so a platform that is known unreachable costs zero network
//! calls on later lookups. Only [`ManifestCache::reset`] clears that
//! state.
//!
//! The cache object is constructed explicitly and owned by whichever
//! adapter needs it; there is no module-level singleton.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::client::CatalogFetch;
use crate::artwork::domain::ArtworkError;
use crate::model::MediaType;
use crate::platforms::{self, Platform};

/// Catalog folders scraped on the CDN fallback path.
pub const TARGET_FOLDERS: [&str; 3] = ["Named_Boxarts", "Named_Snaps", "Named_Titles"];

/// Catalog folder holding the given media type.
pub fn folder_for(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Boxart => "Named_Boxarts",
        MediaType::Snap => "Named_Snaps",
        MediaType::Title => "Named_Titles",
    }
}

/// The filenames one catalog folder is known to contain.
///
/// Stored as a lowercase -> canonical map, so the canonical name set and
/// the case-insensitive index cannot drift apart: there is exactly one
/// insertion point.
#[derive(Debug, Default, Clone)]
pub struct FolderManifest {
    index: HashMap<String, String>,
}

impl FolderManifest {
    /// Build a manifest from canonical names.
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        let mut manifest = Self::default();
        for name in names {
            manifest.insert(name);
        }
        manifest
    }

    /// Add one canonical name.
    pub fn insert(&mut self, name: String) {
        self.index.insert(name.to_lowercase(), name);
    }

    /// Case-insensitive lookup, returning the canonical spelling.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Iterate (lowercase, canonical) pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.index.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// All folder manifests for one platform, plus fetch outcome.
#[derive(Debug, Clone)]
pub struct SystemManifest {
    folders: HashMap<String, Arc<FolderManifest>>,
    /// When the fetch completed (success or failure)
    pub fetched_at: DateTime<Utc>,
    /// Terminal negative: the fetch failed and will not be retried
    pub failed: bool,
}

impl SystemManifest {
    fn success(folders: HashMap<String, Arc<FolderManifest>>) -> Self {
        Self {
            folders,
            fetched_at: Utc::now(),
            failed: false,
        }
    }

    fn failure() -> Self {
        Self {
            folders: HashMap::new(),
            fetched_at: Utc::now(),
            failed: true,
        }
    }

    fn folder(&self, name: &str) -> Option<Arc<FolderManifest>> {
        self.folders.get(name).cloned()
    }

    fn total_entries(&self) -> usize {
        self.folders.values().map(|f| f.len()).sum()
    }
}

/// Per-process manifest cache over a catalog fetcher.
pub struct ManifestCache {
    fetcher: Box<dyn CatalogFetch>,
    cache: Mutex<HashMap<u32, SystemManifest>>,
}

impl ManifestCache {
    pub fn new(fetcher: impl CatalogFetch + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get the folder manifest for one platform and media type.
    ///
    /// Unknown platform, cached failure, and absent folder all answer
    /// `None` without touching the network. The mutex is held across the
    /// fetch, so concurrent callers for an uncached platform coalesce
    /// into a single upstream request.
    pub async fn get_manifest(
        &self,
        platform_id: u32,
        media_type: MediaType,
    ) -> Option<Arc<FolderManifest>> {
        let platform = platforms::by_id(platform_id)?;
        let folder = folder_for(media_type);

        let mut cache = self.cache.lock().await;

        if let Some(system) = cache.get(&platform_id) {
            if system.failed {
                debug!(
                    "Manifest for {} previously failed; not retrying",
                    platform.catalog_name
                );
                return None;
            }
            return system.folder(folder);
        }

        let system = self.fetch_system(platform).await;
        let result = if system.failed {
            None
        } else {
            system.folder(folder)
        };
        cache.insert(platform_id, system);
        result
    }

    /// Fetch a platform's manifest, raising on any problem.
    ///
    /// Shares the fetch logic with `get_manifest` but surfaces errors
    /// immediately so callers can fail fast before processing begins.
    /// A successful-but-empty fetch (platform not published) also raises,
    /// since prefetch exists to validate the platform.
    pub async fn prefetch(&self, platform_id: u32) -> Result<(), ArtworkError> {
        let platform = platforms::by_id(platform_id).ok_or_else(|| {
            ArtworkError::Configuration(format!("Unknown platform id {platform_id}"))
        })?;

        let mut cache = self.cache.lock().await;

        let system = match cache.get(&platform_id) {
            Some(system) => system.clone(),
            None => {
                let system = self.fetch_system(platform).await;
                cache.insert(platform_id, system.clone());
                system
            }
        };

        if system.failed {
            return Err(ArtworkError::Network(format!(
                "Manifest fetch for {} failed",
                platform.catalog_name
            )));
        }
        if system.total_entries() == 0 {
            return Err(ArtworkError::PlatformUnavailable(
                platform.catalog_name.to_string(),
            ));
        }
        Ok(())
    }

    /// Drop all cached manifests, including cached failures.
    pub async fn reset(&self) {
        self.cache.lock().await.clear();
    }

    /// Run the primary fetch, falling back to the CDN scrape when rate
    /// limited. Never errors; failure is encoded in the returned
    /// manifest's `failed` flag.
    async fn fetch_system(&self, platform: &Platform) -> SystemManifest {
        match self.fetcher.fetch_tree(platform).await {
            Ok(files) => {
                let mut folders: HashMap<String, FolderManifest> = HashMap::new();
                for file in files {
                    folders.entry(file.folder).or_default().insert(file.stem);
                }
                let folders = folders
                    .into_iter()
                    .map(|(name, manifest)| (name, Arc::new(manifest)))
                    .collect();
                let system = SystemManifest::success(folders);
                info!(
                    "Fetched manifest for {}: {} entries",
                    platform.catalog_name,
                    system.total_entries()
                );
                system
            }
            Err(ArtworkError::PlatformUnavailable(name)) => {
                // Legitimate negative: the platform is not published.
                // Cached as an empty success so we don't retry, and the
                // CDN fallback is not attempted.
                info!("Platform {} not published in catalog", name);
                SystemManifest::success(HashMap::new())
            }
            Err(ArtworkError::RateLimited) => {
                warn!(
                    "Tree API rate limited for {}; falling back to CDN scrape",
                    platform.catalog_name
                );
                self.fetch_via_cdn(platform).await
            }
            Err(e) => {
                warn!(
                    "Manifest fetch for {} failed: {}; caching failure",
                    platform.catalog_name, e
                );
                SystemManifest::failure()
            }
        }
    }

    /// Degraded-mode fetch: scrape each target folder's directory
    /// listing. Succeeds if at least one folder yields entries.
    async fn fetch_via_cdn(&self, platform: &Platform) -> SystemManifest {
        let mut folders = HashMap::new();
        let mut any_entries = false;

        for folder in TARGET_FOLDERS {
            match self.fetcher.scrape_folder(platform, folder).await {
                Ok(stems) => {
                    if !stems.is_empty() {
                        any_entries = true;
                    }
                    folders.insert(
                        folder.to_string(),
                        Arc::new(FolderManifest::from_names(stems)),
                    );
                }
                Err(e) => {
                    debug!(
                        "CDN scrape of {}/{} failed: {}",
                        platform.catalog_name, folder, e
                    );
                }
            }
        }

        if any_entries {
            let system = SystemManifest::success(folders);
            info!(
                "CDN fallback for {} yielded {} entries",
                platform.catalog_name,
                system.total_entries()
            );
            system
        } else {
            SystemManifest::failure()
        }
    }
}
