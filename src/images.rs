//! Process-wide image cache with concurrent fetch for misses
//!
//! Thumbnails and avatars are fetched best-effort: a failed or empty
//! download is never cached and never surfaces as an error from
//! [`ImageCache::get_images`].
//!
//! Entries are never evicted. The cache grows for the life of the process,
//! which suits one interactive session but not a long-running service.

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::models::ImageBytes;

/// Transport failure while downloading an image
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// URL-keyed image cache
pub struct ImageCache {
    client: reqwest::Client,
    entries: RwLock<HashMap<String, ImageBytes>>,
}

impl ImageCache {
    /// Create an empty cache with its own HTTP client
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create an empty cache sharing an existing HTTP client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached payload for a URL, if it was ever fetched successfully
    pub fn get(&self, url: &str) -> Option<ImageBytes> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Last writer wins; payloads for one URL are assumed stable.
    fn insert(&self, url: &str, bytes: ImageBytes) {
        if bytes.is_empty() {
            return;
        }
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.to_string(), bytes);
    }

    /// Fetch a single image, consulting the cache first.
    ///
    /// `Ok(None)` for an empty URL, a non-success status, or an empty body.
    /// `Err` only for transport failures.
    pub async fn fetch(&self, url: &str) -> Result<Option<ImageBytes>, ImageError> {
        if url.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.get(url) {
            return Ok(Some(hit));
        }

        let bytes = self.download(url).await?;
        if let Some(ref b) = bytes {
            self.insert(url, b.clone());
        }
        Ok(bytes)
    }

    /// Return the payload of every fetchable URL in `urls`.
    ///
    /// Cached URLs are served without network access. Each distinct miss is
    /// downloaded concurrently and the call returns once all of them have
    /// finished. URLs that fail or come back empty are left out.
    pub async fn get_images<I, S>(&self, urls: I) -> HashMap<String, ImageBytes>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: HashSet<String> = urls
            .into_iter()
            .map(|u| u.as_ref().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        let mut result = HashMap::with_capacity(requested.len());
        let mut misses = Vec::new();
        for url in requested {
            match self.get(&url) {
                Some(bytes) => {
                    result.insert(url, bytes);
                }
                None => misses.push(url),
            }
        }

        if misses.is_empty() {
            return result;
        }

        debug!(misses = misses.len(), hits = result.len(), "fetching images");

        let downloads = misses.into_iter().map(|url| async move {
            let outcome = self.download(&url).await;
            (url, outcome)
        });

        for (url, outcome) in join_all(downloads).await {
            match outcome {
                Ok(Some(bytes)) => {
                    self.insert(&url, bytes.clone());
                    result.insert(url, bytes);
                }
                Ok(None) => {}
                Err(e) => debug!(%url, error = %e, "image fetch failed"),
            }
        }

        result
    }

    async fn download(&self, url: &str) -> Result<Option<ImageBytes>, ImageError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "image request returned non-success status");
            return Ok(None);
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(ImageBytes::from(&body[..])))
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_urls_never_fetched() {
        let cache = ImageCache::new();
        let images = cache.get_images(["", ""]).await;
        assert!(images.is_empty());
        assert!(cache.is_empty());
        assert!(cache.fetch("").await.unwrap().is_none());
    }

    #[test]
    fn test_insert_ignores_empty_payload() {
        let cache = ImageCache::new();
        cache.insert("https://img/a.png", ImageBytes::from(Vec::<u8>::new()));
        assert!(!cache.contains("https://img/a.png"));

        cache.insert("https://img/a.png", ImageBytes::from(vec![1u8]));
        assert!(cache.contains("https://img/a.png"));
        assert_eq!(cache.len(), 1);
    }
}
