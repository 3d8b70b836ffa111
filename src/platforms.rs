//! Platform table: numeric ids mapped to catalog-specific identifiers.
//!
//! Each lookup source speaks its own dialect: the thumbnail catalog names
//! repositories after the full platform name ("Nintendo - Game Boy
//! Advance", spaces become underscores in the git API), while the hash
//! database keys on its own numeric system id. Sources resolve a platform
//! through this table and report "unsupported" for ids it doesn't carry.

/// A supported platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Our stable numeric id
    pub id: u32,
    /// Short name used on the command line (e.g. "nes")
    pub short_name: &'static str,
    /// Full thumbnail-catalog name; also the CDN path segment
    pub catalog_name: &'static str,
    /// System id in the hash-lookup database
    pub hashdb_id: u32,
}

/// All platforms known to this build.
///
/// The hashdb ids follow the ScreenScraper systemeid numbering.
pub const PLATFORMS: &[Platform] = &[
    Platform { id: 1, short_name: "megadrive", catalog_name: "Sega - Mega Drive - Genesis", hashdb_id: 1 },
    Platform { id: 2, short_name: "mastersystem", catalog_name: "Sega - Master System - Mark III", hashdb_id: 2 },
    Platform { id: 3, short_name: "nes", catalog_name: "Nintendo - Nintendo Entertainment System", hashdb_id: 3 },
    Platform { id: 4, short_name: "snes", catalog_name: "Nintendo - Super Nintendo Entertainment System", hashdb_id: 4 },
    Platform { id: 9, short_name: "gb", catalog_name: "Nintendo - Game Boy", hashdb_id: 9 },
    Platform { id: 10, short_name: "gbc", catalog_name: "Nintendo - Game Boy Color", hashdb_id: 10 },
    Platform { id: 12, short_name: "gba", catalog_name: "Nintendo - Game Boy Advance", hashdb_id: 12 },
    Platform { id: 14, short_name: "n64", catalog_name: "Nintendo - Nintendo 64", hashdb_id: 14 },
    Platform { id: 18, short_name: "fds", catalog_name: "Nintendo - Famicom Disk System", hashdb_id: 106 },
    Platform { id: 21, short_name: "gamegear", catalog_name: "Sega - Game Gear", hashdb_id: 21 },
    Platform { id: 23, short_name: "sega32x", catalog_name: "Sega - 32X", hashdb_id: 19 },
    Platform { id: 25, short_name: "atari2600", catalog_name: "Atari - 2600", hashdb_id: 26 },
    Platform { id: 27, short_name: "lynx", catalog_name: "Atari - Lynx", hashdb_id: 28 },
    Platform { id: 31, short_name: "pcengine", catalog_name: "NEC - PC Engine - TurboGrafx 16", hashdb_id: 31 },
    Platform { id: 41, short_name: "wonderswan", catalog_name: "Bandai - WonderSwan", hashdb_id: 45 },
    Platform { id: 44, short_name: "ngpc", catalog_name: "SNK - Neo Geo Pocket Color", hashdb_id: 82 },
];

/// Look up a platform by our numeric id.
pub fn by_id(id: u32) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|p| p.id == id)
}

/// Look up a platform by its command-line short name.
pub fn by_short_name(name: &str) -> Option<&'static Platform> {
    let lower = name.to_lowercase();
    PLATFORMS.iter().find(|p| p.short_name == lower)
}

impl Platform {
    /// Repository name for the git tree API: spaces become underscores.
    pub fn repo_name(&self) -> String {
        self.catalog_name.replace(' ', "_")
    }
}
