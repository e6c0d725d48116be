//! Favorites tests
//!
//! Live-status lookup against a mock endpoint, and persistence round trips
//! through the favorites file.

use mockito::{Matcher, Server};
use serde_json::json;
use uuid::Uuid;

use glimpse::api::{LiveStatusClient, LiveStatusError};
use glimpse::config::FavoritesConfig;
use glimpse::favorites::FavoritesStore;
use glimpse::models::Broadcaster;

fn favorite(login: &str) -> Broadcaster {
    Broadcaster {
        id: format!("{}-id", login),
        login: login.into(),
        display_name: login.to_uppercase(),
        profile_image_url: format!("https://img/{}.png", login),
        profile_image: None,
    }
}

fn live_client(api_url: String) -> LiveStatusClient {
    LiveStatusClient::new(&FavoritesConfig {
        api_url: Some(api_url),
        ..FavoritesConfig::default()
    })
}

#[tokio::test]
async fn test_live_streams_joins_stored_names() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/streams")
        // repeated keys: one user_login pair per favorite, in store order
        .match_query(Matcher::Regex(
            "^user_login=alpha&user_login=bravo&thumbnail_width=200&thumbnail_height=112$".into(),
        ))
        .with_status(200)
        .with_body(
            json!({
                "data": [{
                    "id": "s1",
                    "title": "alpha is live",
                    "viewer_count": 2500,
                    "preview_image_url": "https://img/alpha-preview.jpg",
                    "broadcaster": { "id": "alpha-id", "login": "alpha" }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = live_client(server.url());
    let streams = client
        .live_streams(&[favorite("alpha"), favorite("bravo")])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].title, "alpha is live");
    assert_eq!(streams[0].viewers_label(), "2.5K");
    assert_eq!(streams[0].broadcaster.display_name, "ALPHA");
    assert_eq!(streams[0].broadcaster.profile_image_url, "https://img/alpha.png");
}

#[tokio::test]
async fn test_live_streams_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/streams")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let result = live_client(server.url()).live_streams(&[favorite("alpha")]).await;
    assert!(matches!(result, Err(LiveStatusError::Http(502))));
}

#[tokio::test]
async fn test_live_streams_null_data_is_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/streams")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"data": null}"#)
        .create_async()
        .await;

    let streams = live_client(server.url())
        .live_streams(&[favorite("alpha")])
        .await
        .unwrap();
    assert!(streams.is_empty());
}

#[test]
fn test_favorites_file_format() {
    let dir = std::env::temp_dir().join(format!("glimpse-test-{}", Uuid::new_v4().simple()));
    let path = dir.join("favorites.json");

    let mut store = FavoritesStore::load(&path);
    store.toggle(&favorite("alpha"));
    store.save().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        value["favorite_broadcasters"]["alpha"]["display_name"],
        "ALPHA"
    );
    assert!(value["favorite_broadcasters"]["alpha"]
        .get("profile_image")
        .is_none());

    let _ = std::fs::remove_dir_all(dir);
}
