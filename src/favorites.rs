//! Favorite broadcasters, persisted as JSON in the data dir
//!
//! Keyed by login. Image payloads are never written to disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::Broadcaster;

#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesFile {
    #[serde(default)]
    favorite_broadcasters: BTreeMap<String, Broadcaster>,
}

/// Login-keyed favorites with optional backing file
#[derive(Debug, Default)]
pub struct FavoritesStore {
    path: Option<PathBuf>,
    favorites: BTreeMap<String, Broadcaster>,
}

impl FavoritesStore {
    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load favorites from `path`.
    ///
    /// A missing, empty or unreadable file yields an empty store bound to
    /// the same path, so the next save recreates it.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let favorites = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => match serde_json::from_str::<FavoritesFile>(&text) {
                Ok(file) => file.favorite_broadcasters,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not parse favorites");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read favorites");
                BTreeMap::new()
            }
        };
        debug!(count = favorites.len(), "loaded favorites");

        Self {
            path: Some(path),
            favorites,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Add the broadcaster if absent, remove it otherwise.
    /// Returns whether it is a favorite afterwards.
    pub fn toggle(&mut self, broadcaster: &Broadcaster) -> bool {
        if self.favorites.remove(&broadcaster.login).is_some() {
            return false;
        }
        let stored = Broadcaster {
            profile_image: None,
            ..broadcaster.clone()
        };
        self.favorites.insert(broadcaster.login.clone(), stored);
        true
    }

    pub fn contains(&self, login: &str) -> bool {
        self.favorites.contains_key(login)
    }

    pub fn get(&self, login: &str) -> Option<&Broadcaster> {
        self.favorites.get(login)
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    /// Favorites ordered by login
    pub fn favorites(&self) -> Vec<Broadcaster> {
        self.favorites.values().cloned().collect()
    }

    pub fn logins(&self) -> Vec<String> {
        self.favorites.keys().cloned().collect()
    }

    /// Write favorites to the backing file (via a temp file + rename).
    /// No-op for in-memory stores.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = FavoritesFile {
            favorite_broadcasters: self.favorites.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    fn broadcaster(login: &str) -> Broadcaster {
        Broadcaster {
            id: format!("id-{}", login),
            login: login.into(),
            display_name: login.to_uppercase(),
            profile_image_url: format!("https://img/{}.png", login),
            profile_image: Some(Arc::from(vec![1u8, 2, 3])),
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("glimpse-favorites-{}", Uuid::new_v4().simple()))
            .join("favorites.json")
    }

    #[test]
    fn test_toggle() {
        let mut store = FavoritesStore::in_memory();
        assert!(store.toggle(&broadcaster("alpha")));
        assert!(store.contains("alpha"));
        assert!(store.get("alpha").unwrap().profile_image.is_none());

        assert!(!store.toggle(&broadcaster("alpha")));
        assert!(!store.contains("alpha"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_logins_sorted() {
        let mut store = FavoritesStore::in_memory();
        store.toggle(&broadcaster("zeta"));
        store.toggle(&broadcaster("alpha"));
        assert_eq!(store.logins(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path();
        let mut store = FavoritesStore::load(&path);
        assert!(store.is_empty());

        store.toggle(&broadcaster("alpha"));
        store.toggle(&broadcaster("beta"));
        store.save().unwrap();

        let reloaded = FavoritesStore::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("beta").unwrap().display_name, "BETA");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_corrupt_file() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let store = FavoritesStore::load(&path);
        assert!(store.is_empty());
        assert_eq!(store.path(), Some(path.as_path()));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut store = FavoritesStore::in_memory();
        store.toggle(&broadcaster("alpha"));
        assert!(store.save().is_ok());
    }
}
