//! Twitch private GraphQL client
//!
//! Lists top streams, searches live channels and exchanges a channel login
//! for a playable media URL. None of this is a documented API: request
//! shapes and persisted-query hashes are a fixed, versioned contract.

use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::gql::{self, GqlRequest};
use super::manifest;
use crate::config::TwitchConfig;
use crate::images::{ImageCache, ImageError};
use crate::models::{Broadcaster, PlaybackToken, Stream};

/// Twitch API error types
#[derive(Error, Debug)]
pub enum TwitchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned HTTP {0}")]
    Http(u16),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Missing data in response: {0}")]
    MissingData(String),

    #[error("No '{marker}' rendition available for {login}")]
    RenditionNotFound { login: String, marker: String },
}

/// Twitch private API client
pub struct TwitchClient {
    config: TwitchConfig,
    client: reqwest::Client,
    images: Arc<ImageCache>,
}

impl TwitchClient {
    /// Create a client with its own image cache
    pub fn new(config: TwitchConfig) -> Self {
        Self::with_images(config, Arc::new(ImageCache::new()))
    }

    /// Create a client sharing an image cache with the rest of the app
    pub fn with_images(config: TwitchConfig, images: Arc<ImageCache>) -> Self {
        Self {
            config,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            images,
        }
    }

    pub fn config(&self) -> &TwitchConfig {
        &self.config
    }

    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    /// POST a GraphQL operation and unwrap its `data` envelope
    async fn post<T: DeserializeOwned>(&self, request: &GqlRequest) -> Result<T, TwitchError> {
        let body = serde_json::to_vec(request)?;

        let response = self
            .client
            .post(&self.config.gql_url)
            .header(CONTENT_TYPE, "application/json")
            .header("Client-Id", &self.config.client_id)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TwitchError::Http(status.as_u16()));
        }

        let text = response.text().await?;
        let parsed: GqlResponse<T> = serde_json::from_str(&text)?;
        parsed.into_data(request.operation_name)
    }

    /// Most-watched live streams, with thumbnails and avatars attached.
    ///
    /// Streams whose images fail to download are dropped; the rest are
    /// returned in listing order.
    pub async fn top_streams(&self, limit: u32) -> Result<Vec<Stream>, TwitchError> {
        let request = gql::top_streams(limit, &self.config.top_streams_sha256);
        let data: TopStreamsData = self
            .post(&request)
            .await
            .inspect_err(|e| warn!(error = %e, "top streams request failed"))?;

        let streams: Vec<Stream> = data
            .streams
            .ok_or_else(|| TwitchError::MissingData("streams".into()))?
            .edges
            .into_iter()
            .filter_map(TopStreamEdge::into_stream)
            .collect();

        let listed = streams.len();
        let streams = self.attach_images(streams).await;
        info!(listed, returned = streams.len(), "loaded top streams");
        Ok(streams)
    }

    /// Live channels matching `query`, with thumbnails and avatars attached.
    ///
    /// Matching channels that are offline, or whose stream is not of type
    /// `live`, are left out.
    pub async fn search_streams(&self, query: &str) -> Result<Vec<Stream>, TwitchError> {
        let request = gql::search(query, &self.config.search_sha256);
        let data: SearchData = self
            .post(&request)
            .await
            .inspect_err(|e| warn!(query, error = %e, "search request failed"))?;

        let edges = data
            .search_for
            .ok_or_else(|| TwitchError::MissingData("searchFor".into()))?
            .channels
            .map(|c| c.edges)
            .unwrap_or_default();

        let matched = edges.len();
        let streams: Vec<Stream> = edges
            .into_iter()
            .filter_map(SearchEdge::into_live_stream)
            .collect();
        debug!(query, matched, live = streams.len(), "search results");

        Ok(self.attach_images(streams).await)
    }

    /// Signed playback token for a live channel
    pub async fn playback_token(&self, login: &str) -> Result<PlaybackToken, TwitchError> {
        let data: PlaybackTokenData = self.post(&gql::playback_token(login)).await?;
        data.stream_playback_access_token.ok_or_else(|| {
            TwitchError::MissingData(format!("no playback token for {}", login))
        })
    }

    /// Signed manifest URL for a channel
    pub fn manifest_url(&self, login: &str, token: &PlaybackToken) -> String {
        format!(
            "{}/{}.m3u8?sig={}&token={}",
            self.config.usher_url,
            login.to_lowercase(),
            token.signature,
            urlencoding::encode(&token.value)
        )
    }

    async fn fetch_manifest(&self, url: &str) -> Result<String, TwitchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TwitchError::Http(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Exchange a channel login for the media URL of the configured rendition.
    ///
    /// Fails with [`TwitchError::RenditionNotFound`] when the manifest has no
    /// such variant.
    pub async fn resolve_playback(&self, login: &str) -> Result<String, TwitchError> {
        let result: Result<String, TwitchError> = async {
            let token = self.playback_token(login).await?;
            let manifest = self.fetch_manifest(&self.manifest_url(login, &token)).await?;

            manifest::resolve(&manifest, &self.config.rendition)
                .filter(|url| !url.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| TwitchError::RenditionNotFound {
                    login: login.to_string(),
                    marker: self.config.rendition.clone(),
                })
        }
        .await;

        if let Err(ref e) = result {
            warn!(login, error = %e, "could not resolve playback url");
        }
        result
    }

    /// Like [`resolve_playback`](Self::resolve_playback), but a missing
    /// rendition yields an empty URL instead of an error. Callers must treat
    /// an empty URL as "stream unavailable".
    pub async fn resolve_playback_url(&self, login: &str) -> Result<String, TwitchError> {
        match self.resolve_playback(login).await {
            Err(TwitchError::RenditionNotFound { .. }) => Ok(String::new()),
            other => other,
        }
    }

    /// Fetch avatar and preview for every stream concurrently, dropping the
    /// streams whose downloads hit a transport error.
    async fn attach_images(&self, streams: Vec<Stream>) -> Vec<Stream> {
        let fetches = streams.into_iter().map(|stream| async move {
            let outcome = self.fetch_stream_images(&stream).await;
            (stream, outcome)
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(stream, outcome)| match outcome {
                Ok(enriched) => Some(enriched),
                Err(e) => {
                    warn!(login = stream.login(), error = %e, "dropping stream, image fetch failed");
                    None
                }
            })
            .collect()
    }

    async fn fetch_stream_images(&self, stream: &Stream) -> Result<Stream, ImageError> {
        let (avatar, preview) = futures::join!(
            self.images.fetch(&stream.broadcaster.profile_image_url),
            self.images.fetch(&stream.preview_image_url),
        );
        Ok(stream.with_images(preview?, avatar?))
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct GqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GqlErrorRaw>,
}

#[derive(Debug, Deserialize)]
struct GqlErrorRaw {
    #[serde(default)]
    message: String,
}

impl<T> GqlResponse<T> {
    fn into_data(self, operation: &str) -> Result<T, TwitchError> {
        match self.data {
            Some(data) => Ok(data),
            None if self.errors.is_empty() => {
                Err(TwitchError::MissingData(format!("{}: no data envelope", operation)))
            }
            None => {
                let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
                Err(TwitchError::MissingData(format!(
                    "{}: {}",
                    operation,
                    messages.join("; ")
                )))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Connection<E> {
    #[serde(default = "Vec::new")]
    edges: Vec<E>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcasterRaw {
    id: String,
    login: String,
    display_name: Option<String>,
    #[serde(rename = "profileImageURL")]
    profile_image_url: Option<String>,
}

impl BroadcasterRaw {
    fn into_broadcaster(self) -> Broadcaster {
        Broadcaster {
            id: self.id,
            login: self.login,
            display_name: self.display_name.unwrap_or_default(),
            profile_image_url: self.profile_image_url.unwrap_or_default(),
            profile_image: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TopStreamsData {
    streams: Option<Connection<TopStreamEdge>>,
}

#[derive(Debug, Deserialize)]
struct TopStreamEdge {
    node: Option<TopStreamNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopStreamNode {
    id: String,
    title: Option<String>,
    viewers_count: Option<u64>,
    #[serde(rename = "previewImageURL", alias = "previewImageUrl")]
    preview_image_url: Option<String>,
    broadcaster: Option<BroadcasterRaw>,
}

impl TopStreamEdge {
    fn into_stream(self) -> Option<Stream> {
        let node = self.node?;
        // Without a broadcaster there is no login to play or favorite.
        let broadcaster = node.broadcaster?.into_broadcaster();
        Some(Stream {
            id: node.id,
            title: node.title.unwrap_or_default(),
            viewers_count: node.viewers_count.unwrap_or(0),
            preview_image_url: node.preview_image_url.unwrap_or_default(),
            preview_image: None,
            broadcaster,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    search_for: Option<SearchFor>,
}

#[derive(Debug, Deserialize)]
struct SearchFor {
    channels: Option<Connection<SearchEdge>>,
}

#[derive(Debug, Deserialize)]
struct SearchEdge {
    item: Option<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    #[serde(flatten)]
    broadcaster: BroadcasterRaw,
    stream: Option<SearchStreamRaw>,
    broadcast_settings: Option<BroadcastSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchStreamRaw {
    id: String,
    title: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    viewers_count: Option<u64>,
    #[serde(rename = "previewImageURL", alias = "previewImageUrl")]
    preview_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BroadcastSettings {
    title: Option<String>,
}

impl SearchEdge {
    /// The channel's stream, if it is currently live
    fn into_live_stream(self) -> Option<Stream> {
        let item = self.item?;
        let stream = item.stream?;
        if stream.kind.as_deref() != Some("live") {
            return None;
        }

        let title = item
            .broadcast_settings
            .and_then(|s| s.title)
            .or(stream.title)
            .unwrap_or_default();

        Some(Stream {
            id: stream.id,
            title,
            viewers_count: stream.viewers_count.unwrap_or(0),
            preview_image_url: stream.preview_image_url.unwrap_or_default(),
            preview_image: None,
            broadcaster: item.broadcaster.into_broadcaster(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaybackTokenData {
    stream_playback_access_token: Option<PlaybackToken>,
}
