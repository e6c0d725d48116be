//! Image cache tests
//!
//! Deduplication, cache idempotence, and best-effort failure handling.

use mockito::Server;
use std::sync::Arc;

use glimpse::enrich;
use glimpse::images::ImageCache;
use glimpse::models::{Broadcaster, Stream};

#[tokio::test]
async fn test_each_url_fetched_once() {
    let mut server = Server::new_async().await;
    let avatar = server
        .mock("GET", "/avatar.png")
        .with_status(200)
        .with_body("avatar")
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/avatar.png", server.url());
    let cache = ImageCache::new();

    // duplicates within one call and across calls hit the network once
    let first = cache.get_images([url.as_str(), url.as_str(), url.as_str()]).await;
    let second = cache.get_images([url.as_str()]).await;

    avatar.assert_async().await;
    assert_eq!(first.len(), 1);
    assert_eq!(first[&url].as_ref(), b"avatar");
    assert_eq!(second[&url], first[&url]);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_result_keys_are_subset_of_request() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("GET", "/ok.png")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/missing.png")
        .with_status(404)
        .create_async()
        .await;
    let _empty = server
        .mock("GET", "/empty.png")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let base = server.url();
    let requested = vec![
        format!("{}/ok.png", base),
        format!("{}/missing.png", base),
        format!("{}/empty.png", base),
        "http://127.0.0.1:1/refused.png".to_string(),
        String::new(),
    ];

    let cache = ImageCache::new();
    let images = cache.get_images(&requested).await;

    assert!(images.keys().all(|k| requested.contains(k)));
    assert_eq!(images.len(), 1);
    assert!(images.contains_key(&format!("{}/ok.png", base)));
    assert!(images.values().all(|bytes| !bytes.is_empty()));
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let mut server = Server::new_async().await;
    let missing = server
        .mock("GET", "/flaky.png")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let url = format!("{}/flaky.png", server.url());
    let cache = ImageCache::new();

    assert!(cache.get_images([&url]).await.is_empty());
    assert!(cache.get_images([&url]).await.is_empty());

    missing.assert_async().await;
    assert!(!cache.contains(&url));
}

#[tokio::test]
async fn test_fetch_distinguishes_transport_errors() {
    let mut server = Server::new_async().await;
    let _gone = server
        .mock("GET", "/gone.png")
        .with_status(404)
        .create_async()
        .await;

    let cache = ImageCache::new();
    assert!(cache.fetch("").await.unwrap().is_none());
    assert!(cache
        .fetch(&format!("{}/gone.png", server.url()))
        .await
        .unwrap()
        .is_none());
    assert!(cache.fetch("http://127.0.0.1:1/refused.png").await.is_err());
}

#[tokio::test]
async fn test_empty_request_no_network() {
    let cache = ImageCache::new();
    let urls: Vec<String> = Vec::new();
    assert!(cache.get_images(&urls).await.is_empty());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_enrich_attaches_cached_images() {
    let mut server = Server::new_async().await;
    let _preview = server
        .mock("GET", "/preview.jpg")
        .with_status(200)
        .with_body("preview")
        .create_async()
        .await;
    let _avatar = server
        .mock("GET", "/avatar.png")
        .with_status(404)
        .create_async()
        .await;

    let stream = Stream {
        id: "1".into(),
        title: "live".into(),
        preview_image_url: format!("{}/preview.jpg", server.url()),
        broadcaster: Broadcaster {
            login: "alpha".into(),
            profile_image_url: format!("{}/avatar.png", server.url()),
            ..Broadcaster::default()
        },
        ..Stream::default()
    };

    let cache = Arc::new(ImageCache::new());
    let enriched = enrich::enrich(&cache, std::slice::from_ref(&stream)).await;

    assert_eq!(enriched.len(), 1);
    assert_eq!(enriched[0].preview_image.as_deref(), Some(&b"preview"[..]));
    assert!(enriched[0].broadcaster.profile_image.is_none());
    // input untouched
    assert!(stream.preview_image.is_none());
}
