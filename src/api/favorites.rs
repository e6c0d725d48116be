//! Live status of favorite broadcasters
//!
//! Asks a companion REST endpoint which of the given logins are live. The
//! endpoint only knows stream data, so display names and avatars come from
//! the stored favorites.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::FavoritesConfig;
use crate::models::{Broadcaster, Stream};

#[derive(Error, Debug)]
pub enum LiveStatusError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned HTTP {0}")]
    Http(u16),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the favorites live-status endpoint
pub struct LiveStatusClient {
    api_url: Option<String>,
    thumbnail_width: u32,
    thumbnail_height: u32,
    client: reqwest::Client,
}

impl LiveStatusClient {
    pub fn new(config: &FavoritesConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            thumbnail_width: config.thumbnail_width,
            thumbnail_height: config.thumbnail_height,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Whether a live-status endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.api_url.is_some()
    }

    /// Streams for the favorites that are currently live.
    ///
    /// Without a configured endpoint every favorite is returned as an
    /// offline placeholder (empty id, zero viewers).
    pub async fn live_streams(&self, favorites: &[Broadcaster]) -> Result<Vec<Stream>, LiveStatusError> {
        if favorites.is_empty() {
            return Ok(Vec::new());
        }
        let Some(api_url) = &self.api_url else {
            return Ok(favorites.iter().map(offline_placeholder).collect());
        };

        let mut url = reqwest::Url::parse(&format!("{}/streams", api_url.trim_end_matches('/')))
            .map_err(|e| LiveStatusError::InvalidUrl(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            for favorite in favorites {
                query.append_pair("user_login", &favorite.login);
            }
            query.append_pair("thumbnail_width", &self.thumbnail_width.to_string());
            query.append_pair("thumbnail_height", &self.thumbnail_height.to_string());
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "live status request failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LiveStatusError::Http(status.as_u16()));
        }

        let text = response.text().await?;
        let parsed: LiveStreamsResponse = serde_json::from_str(&text)?;

        let known: HashMap<&str, &Broadcaster> =
            favorites.iter().map(|b| (b.login.as_str(), b)).collect();

        let streams: Vec<Stream> = parsed
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|raw| raw.into_stream(&known))
            .collect();
        debug!(favorites = favorites.len(), live = streams.len(), "favorites live status");
        Ok(streams)
    }
}

fn offline_placeholder(favorite: &Broadcaster) -> Stream {
    Stream {
        id: String::new(),
        title: String::new(),
        viewers_count: 0,
        preview_image_url: String::new(),
        preview_image: None,
        broadcaster: Broadcaster {
            profile_image: None,
            ..favorite.clone()
        },
    }
}

#[derive(Debug, Deserialize)]
struct LiveStreamsResponse {
    data: Option<Vec<LiveStreamRaw>>,
}

#[derive(Debug, Deserialize)]
struct LiveStreamRaw {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    viewer_count: u64,
    #[serde(default)]
    preview_image_url: String,
    broadcaster: LiveBroadcasterRaw,
}

#[derive(Debug, Deserialize)]
struct LiveBroadcasterRaw {
    id: String,
    login: String,
}

impl LiveStreamRaw {
    fn into_stream(self, known: &HashMap<&str, &Broadcaster>) -> Stream {
        let stored = known.get(self.broadcaster.login.as_str());
        Stream {
            id: self.id,
            title: self.title,
            viewers_count: self.viewer_count,
            preview_image_url: self.preview_image_url,
            preview_image: None,
            broadcaster: Broadcaster {
                id: self.broadcaster.id,
                display_name: stored.map(|b| b.display_name.clone()).unwrap_or_default(),
                profile_image_url: stored
                    .map(|b| b.profile_image_url.clone())
                    .unwrap_or_default(),
                login: self.broadcaster.login,
                profile_image: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_returns_placeholders() {
        let client = LiveStatusClient::new(&FavoritesConfig::default());
        assert!(!client.is_configured());

        let favorites = vec![Broadcaster {
            id: "1".into(),
            login: "alpha".into(),
            display_name: "Alpha".into(),
            profile_image_url: "https://img/alpha.png".into(),
            profile_image: None,
        }];
        let streams = client.live_streams(&favorites).await.unwrap();

        assert_eq!(streams.len(), 1);
        assert!(streams[0].is_offline());
        assert_eq!(streams[0].broadcaster.profile_image_url, "https://img/alpha.png");
    }

    #[tokio::test]
    async fn test_no_favorites_no_request() {
        let client = LiveStatusClient::new(&FavoritesConfig {
            api_url: Some("http://127.0.0.1:1".into()),
            ..FavoritesConfig::default()
        });
        assert!(client.live_streams(&[]).await.unwrap().is_empty());
    }
}
