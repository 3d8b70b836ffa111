//! Thumbnail catalog HTTP client
//!
//! Two fetch paths for the same data:
//!
//! - **Primary**: the catalog host's git tree API lists every file in a
//!   platform repository in a single request (`?recursive=1`, not
//!   paginated). Cheap and complete, but rate-limited for anonymous
//!   callers (60 req/h), and the limiter answers 403 rather than 429.
//! - **Fallback**: the CDN mirror serves generated HTML directory
//!   listings per folder. Scraping those is slower and per-folder, so we
//!   only do it when the primary path reports rate limiting.
//!
//! A 404 from the primary path means the platform repository simply is
//! not published - a legitimate negative, not a failure.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::dto;
use crate::artwork::domain::ArtworkError;
use crate::platforms::Platform;

/// One artwork file as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    /// Top-level folder ("Named_Boxarts", ...)
    pub folder: String,
    /// Filename without the `.png` extension
    pub stem: String,
}

/// Fetch operations the manifest cache depends on.
///
/// Split out as a trait so cache behavior (negative caching, fallback
/// sequencing) can be tested against a scripted fetcher.
#[async_trait]
pub trait CatalogFetch: Send + Sync {
    /// List every artwork file in the platform repository.
    ///
    /// Errors: [`ArtworkError::PlatformUnavailable`] for a 404,
    /// [`ArtworkError::RateLimited`] when the API limiter answers.
    async fn fetch_tree(&self, platform: &Platform) -> Result<Vec<CatalogFile>, ArtworkError>;

    /// Scrape one folder's directory listing from the CDN mirror,
    /// returning the stems found there.
    async fn scrape_folder(
        &self,
        platform: &Platform,
        folder: &str,
    ) -> Result<Vec<String>, ArtworkError>;
}

/// HTTP client for the thumbnail catalog.
pub struct CatalogClient {
    http_client: reqwest::Client,
    api_base_url: String,
    cdn_base_url: String,
}

/// Anchor hrefs in the generated directory listing HTML.
static HREF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([^"]+)">"#).unwrap());

const API_BASE_URL: &str = "https://api.github.com";
pub const CDN_BASE_URL: &str = "https://thumbnails.libretro.com";
const CATALOG_ORG: &str = "libretro-thumbnails";

/// Direct download URL for one asset on the CDN mirror.
///
/// The filename segment is percent-encoded; the platform and folder
/// segments are served literally.
pub fn asset_url(cdn_base_url: &str, platform: &Platform, folder: &str, stem: &str) -> String {
    format!(
        "{}/{}/{}/{}.png",
        cdn_base_url,
        platform.catalog_name,
        folder,
        urlencoding::encode(stem)
    )
}

impl CatalogClient {
    /// Create a new client.
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            api_base_url: API_BASE_URL.to_string(),
            cdn_base_url: CDN_BASE_URL.to_string(),
        }
    }

    /// Create a client for testing with custom base URLs.
    #[cfg(test)]
    pub fn with_base_urls(api_base_url: impl Into<String>, cdn_base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base_url: api_base_url.into(),
            cdn_base_url: cdn_base_url.into(),
        }
    }

    /// Pull stems out of a directory-listing HTML page.
    ///
    /// Every anchor href is percent-decoded; parent-directory links and
    /// anything not ending in `.png` are discarded.
    fn parse_directory_listing(html: &str) -> Vec<String> {
        HREF_PATTERN
            .captures_iter(html)
            .filter_map(|caps| {
                let href = caps.get(1)?.as_str();
                if href.starts_with("..") || href.starts_with('/') || href.starts_with('?') {
                    return None;
                }
                let decoded = urlencoding::decode(href).ok()?;
                let decoded = decoded.as_ref();
                decoded
                    .strip_suffix(".png")
                    .map(|stem| stem.to_string())
            })
            .collect()
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogFetch for CatalogClient {
    async fn fetch_tree(&self, platform: &Platform) -> Result<Vec<CatalogFile>, ArtworkError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/master?recursive=1",
            self.api_base_url,
            CATALOG_ORG,
            platform.repo_name()
        );

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|e| ArtworkError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ArtworkError::PlatformUnavailable(
                platform.catalog_name.to_string(),
            ));
        }

        // The anonymous API limiter answers 403; treat 429 the same way.
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(ArtworkError::RateLimited);
        }

        if !status.is_success() {
            return Err(ArtworkError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let tree = response
            .json::<dto::TreeResponse>()
            .await
            .map_err(|e| ArtworkError::Parse(e.to_string()))?;

        if tree.truncated {
            tracing::warn!(
                "Tree listing for {} was truncated; manifest may be incomplete",
                platform.catalog_name
            );
        }

        Ok(tree
            .tree
            .into_iter()
            .filter(|node| node.kind == "blob")
            .filter_map(|node| {
                let (folder, name) = node.path.split_once('/')?;
                let stem = name.strip_suffix(".png")?;
                Some(CatalogFile {
                    folder: folder.to_string(),
                    stem: stem.to_string(),
                })
            })
            .collect())
    }

    async fn scrape_folder(
        &self,
        platform: &Platform,
        folder: &str,
    ) -> Result<Vec<String>, ArtworkError> {
        let url = format!("{}/{}/{}/", self.cdn_base_url, platform.catalog_name, folder);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ArtworkError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ArtworkError::PlatformUnavailable(format!(
                "{}/{}",
                platform.catalog_name, folder
            )));
        }

        if !status.is_success() {
            return Err(ArtworkError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ArtworkError::Network(e.to_string()))?;

        Ok(Self::parse_directory_listing(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms;

    #[test]
    fn test_client_creation() {
        let client = CatalogClient::new();
        assert_eq!(client.api_base_url, "https://api.github.com");
        assert_eq!(client.cdn_base_url, "https://thumbnails.libretro.com");
    }

    #[test]
    fn test_asset_url_encodes_filename() {
        let nes = platforms::by_id(3).unwrap();
        let url = asset_url(CDN_BASE_URL, nes, "Named_Boxarts", "Metroid (USA)");
        assert_eq!(
            url,
            "https://thumbnails.libretro.com/Nintendo - Nintendo Entertainment System/Named_Boxarts/Metroid%20%28USA%29.png"
        );
    }

    #[test]
    fn test_parse_directory_listing() {
        let html = r#"<html><body><h1>Index of /Named_Boxarts/</h1><hr><pre>
<a href="../">../</a>
<a href="Metroid%20%28USA%29.png">Metroid (USA).png</a>
<a href="Contra%20%28USA%29.png">Contra (USA).png</a>
<a href="README.txt">README.txt</a>
</pre><hr></body></html>"#;

        let stems = CatalogClient::parse_directory_listing(html);
        assert_eq!(stems, vec!["Metroid (USA)", "Contra (USA)"]);
    }

    #[test]
    fn test_parse_directory_listing_empty() {
        let html = r#"<html><body><pre><a href="../">../</a></pre></body></html>"#;
        assert!(CatalogClient::parse_directory_listing(html).is_empty());
    }
}
