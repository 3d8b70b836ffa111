//! Adapter layer: hash-lookup DTOs to domain models, plus the
//! [`ArtworkSource`] impl.
//!
//! This is the ONLY place where jeuInfos DTO types become domain types.
//! It also owns the two selection policies this source needs:
//! display-name preference across localised names, and media-URL
//! selection against the caller's region priority.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Duration;
use tracing::warn;

use super::client::{HashDbClient, HashDbCredentials};
use super::dto;
use crate::artwork::domain::{ArtworkError, GameInfo, MediaAsset};
use crate::artwork::source::{ArtworkSource, SourceCapabilities};
use crate::model::{LookupRequest, LookupResult, MediaType};
use crate::platforms;

/// Registry id for this source.
pub const SOURCE_ID: &str = "hashdb";

/// Convert a jeuInfos response body into a [`GameInfo`].
pub fn to_game_info(response: dto::JeuInfosResponse) -> Result<GameInfo, ArtworkError> {
    let jeu = response.response.jeu;
    if jeu.id.is_empty() {
        return Err(ArtworkError::Parse("game entry without id".to_string()));
    }

    let name = pick_display_name(&jeu.noms).unwrap_or_else(|| jeu.id.clone());
    let media = jeu
        .medias
        .into_iter()
        .map(|m| MediaAsset {
            media_type: media_type_from_tag(&m.media_type),
            region: m.region,
            url: m.url,
        })
        .collect();

    Ok(GameInfo {
        id: jeu.id,
        name,
        media,
    })
}

/// Best-available display name: the "us" localisation, then "wor"
/// (world), then whatever comes first.
fn pick_display_name(names: &[dto::LocalizedName]) -> Option<String> {
    names
        .iter()
        .find(|n| n.region == "us")
        .or_else(|| names.iter().find(|n| n.region == "wor"))
        .or_else(|| names.first())
        .map(|n| n.text.clone())
}

/// Map the source's media tags onto our media types. Unrecognised tags
/// stay around as `None` so region selection can still skip them.
fn media_type_from_tag(tag: &str) -> Option<MediaType> {
    match tag {
        "box-2D" => Some(MediaType::Boxart),
        "ss" => Some(MediaType::Snap),
        "sstitle" => Some(MediaType::Title),
        _ => None,
    }
}

/// Map a caller-facing region label onto this source's region codes.
fn region_code(label: &str) -> &str {
    match label {
        "USA" => "us",
        "Europe" => "eu",
        "Japan" => "jp",
        "World" => "wor",
        "Asia" => "asi",
        "Australia" => "au",
        "Brazil" => "br",
        other => other,
    }
}

/// Select the artwork URL for a request's media type.
///
/// Walks the caller's region priority first; falls back to the first
/// asset of the type with a non-empty URL; `None` when the type has no
/// assets at all (identification succeeded, asset unavailable).
pub fn select_media_url(
    game: &GameInfo,
    media_type: MediaType,
    region_priority: &[String],
) -> Option<String> {
    let assets: Vec<&MediaAsset> = game
        .media
        .iter()
        .filter(|a| a.media_type == Some(media_type))
        .collect();

    for label in region_priority {
        let code = region_code(label);
        if let Some(asset) = assets
            .iter()
            .find(|a| a.region == code && !a.url.is_empty())
        {
            return Some(asset.url.clone());
        }
    }

    assets
        .iter()
        .find(|a| !a.url.is_empty())
        .map(|a| a.url.clone())
}

/// Typed options for this source, deserialised from the opaque config
/// bag at `initialize` time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct HashDbOptions {
    dev_id: String,
    dev_password: String,
    software_name: String,
    user_id: String,
    user_password: String,
    /// Minimum delay between requests, in milliseconds
    request_delay_ms: u64,
}

impl Default for HashDbOptions {
    fn default() -> Self {
        Self {
            dev_id: String::new(),
            dev_password: String::new(),
            software_name: env!("CARGO_PKG_NAME").to_string(),
            user_id: String::new(),
            user_password: String::new(),
            request_delay_ms: 1200,
        }
    }
}

/// Hash-database lookup source.
pub struct HashDbSource {
    options: toml::Value,
    client: Option<HashDbClient>,
}

impl HashDbSource {
    pub fn new(options: toml::Value) -> Self {
        Self {
            options,
            client: None,
        }
    }
}

#[async_trait]
impl ArtworkSource for HashDbSource {
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            needs_hash: true,
            uses_filename: true,
            media_types: MediaType::ALL.to_vec(),
        }
    }

    fn supports_platform(&self, platform_id: u32) -> bool {
        platforms::by_id(platform_id).is_some()
    }

    /// Deserialise and validate options. Bad shape or missing developer
    /// credentials fail here, not on the first lookup.
    async fn initialize(&mut self) -> Result<(), ArtworkError> {
        let options: HashDbOptions = self
            .options
            .clone()
            .try_into()
            .map_err(|e| ArtworkError::Configuration(format!("invalid hashdb options: {e}")))?;

        if options.dev_id.is_empty() || options.dev_password.is_empty() {
            return Err(ArtworkError::Configuration(
                "hashdb requires dev_id and dev_password".to_string(),
            ));
        }

        let credentials = HashDbCredentials {
            dev_id: options.dev_id,
            dev_password: options.dev_password,
            software_name: options.software_name,
            user_id: options.user_id,
            user_password: options.user_password,
        };
        self.client = Some(HashDbClient::new(
            credentials,
            Duration::from_millis(options.request_delay_ms),
        ));
        Ok(())
    }

    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult, ArtworkError> {
        let Some(client) = &self.client else {
            return Err(ArtworkError::Configuration(
                "hashdb source used before initialize".to_string(),
            ));
        };
        let Some(platform) = platforms::by_id(request.platform_id) else {
            return Ok(LookupResult::not_found());
        };
        let Some(crc) = request.content_hash.as_deref() else {
            warn!(
                "No content hash for {:?}; hashdb cannot identify it",
                request.file.file_name
            );
            return Ok(LookupResult::not_found());
        };

        let Some(game) = client
            .lookup(crc, platform, &request.file.file_name, request.file.size)
            .await?
        else {
            return Ok(LookupResult::not_found());
        };

        let media_url = select_media_url(&game, request.media_type, &request.region_priority);
        Ok(LookupResult {
            found: true,
            matched_id: Some(game.id.clone()),
            display_name: Some(game.name.clone()),
            media_url,
            best_effort: false,
            extra: Default::default(),
        })
    }
}
