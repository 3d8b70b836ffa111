//! Hash-lookup API Data Transfer Objects
//!
//! These types match EXACTLY what the `jeuInfos.php` endpoint returns
//! with `output=json`. DO NOT use these types outside the hashdb module -
//! convert to domain types in the adapter.
//!
//! Example response (heavily trimmed - the real body carries dozens of
//! fields we never read):
//! ```json
//! {
//!   "response": {
//!     "jeu": {
//!       "id": "1234",
//!       "noms": [{"region": "us", "text": "Metroid"}],
//!       "medias": [{"type": "box-2D", "region": "us", "url": "https://..."}]
//!     }
//!   }
//! }
//! ```

use serde::Deserialize;

/// Top-level envelope
#[derive(Debug, Clone, Deserialize)]
pub struct JeuInfosResponse {
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBody {
    pub jeu: Jeu,
}

/// The identified game
#[derive(Debug, Clone, Deserialize)]
pub struct Jeu {
    /// Database id (the API serialises it as a string)
    pub id: String,
    /// Localised names
    #[serde(default)]
    pub noms: Vec<LocalizedName>,
    /// Artwork assets
    #[serde(default)]
    pub medias: Vec<Media>,
}

/// One localised name entry
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedName {
    /// Region code ("us", "eu", "jp", "wor", "ss", ...)
    pub region: String,
    /// The name itself
    pub text: String,
}

/// One artwork asset entry
#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    /// Asset kind ("box-2D", "ss", "sstitle", ...)
    #[serde(rename = "type")]
    pub media_type: String,
    /// Region code (may be absent for region-free assets)
    #[serde(default)]
    pub region: String,
    /// Direct download URL
    #[serde(default)]
    pub url: String,
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let json = r#"{
            "response": {
                "jeu": {
                    "id": "1234",
                    "noms": [
                        {"region": "wor", "text": "Metroid"},
                        {"region": "us", "text": "Metroid (US)"},
                        {"region": "jp", "text": "Metoroido"}
                    ],
                    "medias": [
                        {"type": "box-2D", "region": "us", "url": "https://cdn.example/box-us.png"},
                        {"type": "ss", "region": "wor", "url": "https://cdn.example/ss.png"}
                    ]
                }
            }
        }"#;

        let response: JeuInfosResponse = serde_json::from_str(json).expect("Should parse");
        let jeu = response.response.jeu;
        assert_eq!(jeu.id, "1234");
        assert_eq!(jeu.noms.len(), 3);
        assert_eq!(jeu.noms[1].region, "us");
        assert_eq!(jeu.medias[0].media_type, "box-2D");
        assert_eq!(jeu.medias[0].url, "https://cdn.example/box-us.png");
    }

    #[test]
    fn test_parse_sparse_game() {
        let json = r#"{"response": {"jeu": {"id": "99"}}}"#;
        let response: JeuInfosResponse = serde_json::from_str(json).expect("Should parse sparse");
        let jeu = response.response.jeu;
        assert_eq!(jeu.id, "99");
        assert!(jeu.noms.is_empty());
        assert!(jeu.medias.is_empty());
    }

    #[test]
    fn test_parse_media_without_region() {
        let json = r#"{
            "response": {"jeu": {"id": "7", "medias": [
                {"type": "wheel", "url": "https://cdn.example/wheel.png"}
            ]}}
        }"#;
        let response: JeuInfosResponse = serde_json::from_str(json).expect("Should parse");
        assert!(response.response.jeu.medias[0].region.is_empty());
    }
}
