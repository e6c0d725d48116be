//! Configuration management for glimpse
//!
//! Config is stored at ~/.config/glimpse/config.toml. Every field has a
//! default, so a missing or partial file is fine.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::player::PlayerType;

/// Public web client id; the private API rejects requests without one
pub const DEFAULT_CLIENT_ID: &str = "kimne78kx3ncx6brgo4mv6wki5h1ko";
pub const DEFAULT_GQL_URL: &str = "https://gql.twitch.tv/gql";
pub const DEFAULT_USHER_URL: &str = "https://usher.ttvnw.net/api/channel/hls";
pub const DEFAULT_RENDITION: &str = "RESOLUTION=852x480";

/// Persisted-query fingerprints, versioned together with the upstream API
pub const DEFAULT_TOP_STREAMS_SHA256: &str =
    "75a4899f0a765cc08576125512f710e157b147897c06f96325de72d4c5a64890";
pub const DEFAULT_SEARCH_SHA256: &str =
    "845698a3efbde3c2d1cc31e77ca1160cde6a21c556ad808106910ff63e727b98";

/// Private API endpoints and request constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitchConfig {
    pub client_id: String,
    pub gql_url: String,
    /// Base of the signed manifest URL: `{usher_url}/{login}.m3u8`
    pub usher_url: String,
    /// Substring selecting one variant of the manifest
    pub rendition: String,
    pub top_streams_limit: u32,
    pub top_streams_sha256: String,
    pub search_sha256: String,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            gql_url: DEFAULT_GQL_URL.to_string(),
            usher_url: DEFAULT_USHER_URL.to_string(),
            rendition: DEFAULT_RENDITION.to_string(),
            top_streams_limit: 10,
            top_streams_sha256: DEFAULT_TOP_STREAMS_SHA256.to_string(),
            search_sha256: DEFAULT_SEARCH_SHA256.to_string(),
        }
    }
}

/// External media player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub player: PlayerType,
    pub width: u32,
    pub height: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            player: PlayerType::default(),
            width: 640,
            height: 480,
        }
    }
}

/// Favorites storage and live-status lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoritesConfig {
    /// Favorites file; defaults to the data dir
    pub path: Option<PathBuf>,
    /// Live-status endpoint (`GET {api_url}/streams?user_login=...`)
    pub api_url: Option<String>,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            path: None,
            api_url: None,
            thumbnail_width: 200,
            thumbnail_height: 112,
        }
    }
}

impl FavoritesConfig {
    /// Favorites file path (~/.local/share/glimpse/favorites.json)
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_dir().join("favorites.json"))
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub twitch: TwitchConfig,
    pub player: PlayerConfig,
    pub favorites: FavoritesConfig,
}

impl Config {
    /// Get config file path (~/.config/glimpse/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glimpse").join("config.toml"))
    }

    /// Load config from the default path, or return defaults if not found
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default().with_env_overrides(),
        }
    }

    /// Load config from a specific file.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is
    /// logged and also yields defaults.
    pub fn load_from(path: &Path) -> Self {
        let config = match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config, using defaults");
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    /// Parse config from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Apply environment overrides:
    /// - GLIMPSE_CLIENT_ID replaces the client id
    /// - GLIMPSE_RENDITION replaces the rendition marker
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(id) = std::env::var("GLIMPSE_CLIENT_ID") {
            if !id.is_empty() {
                self.twitch.client_id = id;
            }
        }
        if let Ok(marker) = std::env::var("GLIMPSE_RENDITION") {
            if !marker.is_empty() {
                self.twitch.rendition = marker;
            }
        }
        self
    }
}

/// Data directory for logs and favorites (~/.local/share/glimpse)
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("glimpse")
}
