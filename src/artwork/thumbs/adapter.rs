//! Thumbnail catalog lookup source.
//!
//! Glues the manifest cache and the fuzzy matcher into the
//! [`ArtworkSource`] contract. Purely filename-based: no hash, no
//! credentials, so `initialize` has nothing to validate.

use async_trait::async_trait;

use super::client::{self, CatalogClient};
#[cfg(test)]
use super::client::CatalogFetch;
use super::manifest::{folder_for, ManifestCache};
use super::matcher;
use crate::artwork::domain::ArtworkError;
use crate::artwork::source::{ArtworkSource, SourceCapabilities};
use crate::model::{LookupRequest, LookupResult, MediaType};
use crate::platforms;

/// Registry id for this source.
pub const SOURCE_ID: &str = "thumbs";

/// Catalog-backed artwork source.
pub struct ThumbSource {
    cache: ManifestCache,
    cdn_base_url: String,
}

impl ThumbSource {
    /// Production constructor over the real catalog client.
    pub fn new() -> Self {
        Self {
            cache: ManifestCache::new(CatalogClient::new()),
            cdn_base_url: client::CDN_BASE_URL.to_string(),
        }
    }

    /// Test constructor over a scripted fetcher.
    #[cfg(test)]
    pub fn with_fetcher(fetcher: impl CatalogFetch + 'static) -> Self {
        Self {
            cache: ManifestCache::new(fetcher),
            cdn_base_url: client::CDN_BASE_URL.to_string(),
        }
    }

    /// Drop all cached manifests (including cached failures).
    pub async fn reset_cache(&self) {
        self.cache.reset().await;
    }
}

impl Default for ThumbSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtworkSource for ThumbSource {
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            needs_hash: false,
            uses_filename: true,
            media_types: MediaType::ALL.to_vec(),
        }
    }

    fn supports_platform(&self, platform_id: u32) -> bool {
        platforms::by_id(platform_id).is_some()
    }

    async fn initialize(&mut self) -> Result<(), ArtworkError> {
        // No credentials or options to validate
        Ok(())
    }

    async fn prefetch(&self, platform_id: u32) -> Result<(), ArtworkError> {
        self.cache.prefetch(platform_id).await
    }

    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult, ArtworkError> {
        let Some(platform) = platforms::by_id(request.platform_id) else {
            return Ok(LookupResult::not_found());
        };

        let Some(manifest) = self
            .cache
            .get_manifest(request.platform_id, request.media_type)
            .await
        else {
            return Ok(LookupResult::not_found());
        };

        let Some(hit) = matcher::find_match(&manifest, &request.file.stem) else {
            return Ok(LookupResult::not_found());
        };

        let folder = folder_for(request.media_type);
        let url = client::asset_url(&self.cdn_base_url, platform, folder, &hit.name);

        let mut result = LookupResult {
            found: true,
            matched_id: Some(hit.name.clone()),
            display_name: Some(hit.name.clone()),
            media_url: Some(url),
            best_effort: hit.best_effort,
            extra: Default::default(),
        };
        if let Some(region) = matcher::extract_region(&hit.name) {
            result.extra.insert("region".to_string(), region.to_string());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::thumbs::client::CatalogFile;
    use crate::model::LocalFile;
    use std::path::PathBuf;

    struct FixedFetch {
        files: Vec<CatalogFile>,
    }

    #[async_trait]
    impl CatalogFetch for FixedFetch {
        async fn fetch_tree(
            &self,
            _platform: &platforms::Platform,
        ) -> Result<Vec<CatalogFile>, ArtworkError> {
            Ok(self.files.clone())
        }

        async fn scrape_folder(
            &self,
            _platform: &platforms::Platform,
            _folder: &str,
        ) -> Result<Vec<String>, ArtworkError> {
            Ok(vec![])
        }
    }

    fn source_with(names: &[&str]) -> ThumbSource {
        let files = names
            .iter()
            .map(|stem| CatalogFile {
                folder: "Named_Boxarts".to_string(),
                stem: stem.to_string(),
            })
            .collect();
        ThumbSource::with_fetcher(FixedFetch { files })
    }

    fn request(file_name: &str) -> LookupRequest {
        LookupRequest {
            file: LocalFile::new(PathBuf::from(format!("/roms/{file_name}")), 64),
            content_hash: None,
            platform_id: 3,
            media_type: MediaType::Boxart,
            region_priority: vec!["USA".to_string()],
        }
    }

    #[tokio::test]
    async fn test_lookup_exact_builds_cdn_url() {
        let source = source_with(&["Metroid (USA)"]);
        let result = source.lookup(&request("Metroid (USA).zip")).await.unwrap();

        assert!(result.found);
        assert!(!result.best_effort);
        assert_eq!(result.matched_id.as_deref(), Some("Metroid (USA)"));
        assert_eq!(
            result.media_url.as_deref(),
            Some("https://thumbnails.libretro.com/Nintendo - Nintendo Entertainment System/Named_Boxarts/Metroid%20%28USA%29.png")
        );
        assert_eq!(result.extra.get("region").map(String::as_str), Some("USA"));
    }

    #[tokio::test]
    async fn test_lookup_stripped_is_best_effort() {
        let source = source_with(&["Aladdin (USA)"]);
        let result = source
            .lookup(&request("Aladdin (USA) (Proto).zip"))
            .await
            .unwrap();

        assert!(result.found);
        assert!(result.best_effort);
        assert_eq!(result.matched_id.as_deref(), Some("Aladdin (USA)"));
    }

    #[tokio::test]
    async fn test_lookup_miss() {
        let source = source_with(&["Zelda (USA)"]);
        let result = source.lookup(&request("Metroid (USA).zip")).await.unwrap();
        assert!(!result.found);
        assert!(result.media_url.is_none());
    }

    #[tokio::test]
    async fn test_unknown_platform_misses() {
        let source = source_with(&["Metroid (USA)"]);
        let mut req = request("Metroid (USA).zip");
        req.platform_id = 9999;
        let result = source.lookup(&req).await.unwrap();
        assert!(!result.found);
    }

    #[test]
    fn test_capabilities() {
        let source = ThumbSource::new();
        let caps = source.capabilities();
        assert!(!caps.needs_hash);
        assert!(caps.uses_filename);
        assert!(source.supports_platform(3));
        assert!(!source.supports_platform(9999));
    }
}
