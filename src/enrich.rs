//! Attach thumbnails and avatars to freshly listed streams

use std::collections::{HashMap, HashSet};

use crate::images::ImageCache;
use crate::models::{ImageBytes, Stream};

/// Distinct preview and avatar URLs referenced by `streams`
pub fn image_urls(streams: &[Stream]) -> HashSet<String> {
    streams
        .iter()
        .flat_map(|s| {
            [
                s.preview_image_url.as_str(),
                s.broadcaster.profile_image_url.as_str(),
            ]
        })
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// New stream records carrying whatever images `images` holds for them.
///
/// Pure: no I/O, the input slice is not modified. Streams whose images are
/// missing keep empty image fields.
pub fn combine(streams: &[Stream], images: &HashMap<String, ImageBytes>) -> Vec<Stream> {
    streams
        .iter()
        .map(|s| {
            s.with_images(
                images.get(&s.preview_image_url).cloned(),
                images.get(&s.broadcaster.profile_image_url).cloned(),
            )
        })
        .collect()
}

/// Fetch every image the streams reference in one cache call, then combine
pub async fn enrich(cache: &ImageCache, streams: &[Stream]) -> Vec<Stream> {
    if streams.is_empty() {
        return Vec::new();
    }
    let images = cache.get_images(image_urls(streams)).await;
    combine(streams, &images)
}
