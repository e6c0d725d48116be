//! Data structures shared across glimpse
//!
//! - **Streams**: live streams and the broadcasters that own them
//! - **Playback**: the signed token exchanged for a media manifest
//!
//! Streams and broadcasters are immutable value records created per API
//! response. Enrichment produces new records carrying image payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Raw image payload, shared between the image cache and every stream using it
pub type ImageBytes = Arc<[u8]>;

// =============================================================================
// Stream Models
// =============================================================================

/// A channel owner. `login` is the join key for favorites, playback lookup
/// and caching; `id` is informational only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Broadcaster {
    pub id: String,
    pub login: String,
    pub display_name: String,
    pub profile_image_url: String,
    #[serde(skip)]
    pub profile_image: Option<ImageBytes>,
}

impl Broadcaster {
    /// Display name, falling back to the login when the API sent none
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.login
        } else {
            &self.display_name
        }
    }
}

/// A live stream as listed by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub title: String,
    pub viewers_count: u64,
    pub preview_image_url: String,
    #[serde(skip)]
    pub preview_image: Option<ImageBytes>,
    pub broadcaster: Broadcaster,
}

impl Stream {
    /// Copy of this stream carrying the given image payloads.
    ///
    /// Empty payloads are stored as `None`.
    pub fn with_images(&self, preview: Option<ImageBytes>, avatar: Option<ImageBytes>) -> Stream {
        let mut stream = self.clone();
        stream.preview_image = preview.filter(|b| !b.is_empty());
        stream.broadcaster.profile_image = avatar.filter(|b| !b.is_empty());
        stream
    }

    /// Login of the owning broadcaster
    pub fn login(&self) -> &str {
        &self.broadcaster.login
    }

    /// Whether this stream is a placeholder for an offline favorite
    pub fn is_offline(&self) -> bool {
        self.id.is_empty()
    }

    /// Compact viewer count: 999, 1.2K, 3.4M
    pub fn viewers_label(&self) -> String {
        format_viewers(self.viewers_count)
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} viewers] {}",
            self.broadcaster.name(),
            self.viewers_label(),
            self.title
        )
    }
}

/// Format a viewer count for compact display
pub fn format_viewers(count: u64) -> String {
    // tenths of a thousand, rounded half up; 999.95K and above reads as millions
    let tenths_k = (count + 50) / 100;
    match count {
        0..=999 => count.to_string(),
        _ if tenths_k < 10_000 => trim_decimal(tenths_k as f64 / 10.0, "K"),
        _ => trim_decimal(count as f64 / 1_000_000.0, "M"),
    }
}

fn trim_decimal(value: f64, suffix: &str) -> String {
    let s = format!("{:.1}", value);
    let s = s.strip_suffix(".0").unwrap_or(&s);
    format!("{}{}", s, suffix)
}

// =============================================================================
// Playback Models
// =============================================================================

/// Signed access token for one playback request. Never persisted or reused.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackToken {
    pub value: String,
    pub signature: String,
}
