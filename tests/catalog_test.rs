mod common;

use std::sync::Arc;

use common::{FakeMusicClient, TIMEOUT, artist, catalog_client};
use namethatsong::{
    error::{ExternalServiceError, GameError},
    management::CatalogCache,
    types::top_tracks_album_id,
};

fn cache(client: &Arc<FakeMusicClient>) -> CatalogCache {
    CatalogCache::new(client.clone(), TIMEOUT)
}

#[tokio::test]
async fn test_artist_albums_are_fetched_once() {
    let client = Arc::new(catalog_client());
    let cache = cache(&client);

    let first = cache.get_artist_albums("token", "ar1").await.unwrap();
    let ids: Vec<&str> = first.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["top-tracks:ar1", "al1", "al2"]);
    assert!(first[0].is_synthetic());
    assert_eq!(first[0].name, "The Testers - Top Tracks");

    let calls = client.total_calls();
    assert_eq!(client.calls("fetch_artist"), 1);
    assert_eq!(client.calls("fetch_artist_top_tracks"), 1);
    assert_eq!(client.calls("fetch_albums_by_artist"), 1);

    let second = cache.get_artist_albums("token", "ar1").await.unwrap();
    assert_eq!(second, first);
    assert_eq!(client.total_calls(), calls);
}

#[tokio::test]
async fn test_known_artist_is_not_fetched() {
    let client = Arc::new(catalog_client());
    let cache = cache(&client);

    cache.remember_artists(&[artist("ar1", "The Testers")]).await;
    cache.get_artist_albums("token", "ar1").await.unwrap();

    assert_eq!(client.calls("fetch_artist"), 0);
}

#[tokio::test]
async fn test_artist_population_indexes_albums_and_top_tracks() {
    let client = Arc::new(catalog_client());
    let cache = cache(&client);

    cache.get_artist_albums("token", "ar1").await.unwrap();

    assert!(cache.knows_artist("ar1").await);
    assert_eq!(cache.artist_for_album("al1").await.as_deref(), Some("ar1"));
    assert_eq!(cache.artist_for_album("al2").await.as_deref(), Some("ar1"));
    assert!(cache.album("top-tracks:ar1").await.is_some());

    let top_id = top_tracks_album_id("ar1");
    assert!(cache.knows_album_tracks(&top_id).await);
    let top = cache.get_album_tracks("token", &top_id).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].album_id, top_id);
    assert_eq!(client.calls("fetch_tracks_by_album"), 0);
}

#[tokio::test]
async fn test_failed_artist_population_installs_nothing() {
    let client = Arc::new(catalog_client());
    let cache = cache(&client);

    client.fail("fetch_albums_by_artist");
    let err = cache.get_artist_albums("token", "ar1").await.unwrap_err();
    assert!(matches!(
        err,
        GameError::External(ExternalServiceError::Transport(_))
    ));
    assert!(err.is_retryable());

    assert!(!cache.knows_artist("ar1").await);
    assert!(cache.album("top-tracks:ar1").await.is_none());
    assert!(cache.track("t1").await.is_none());

    client.recover("fetch_albums_by_artist");
    let albums = cache.get_artist_albums("token", "ar1").await.unwrap();
    assert_eq!(albums.len(), 3);
    assert_eq!(client.calls("fetch_artist_top_tracks"), 2);
    assert_eq!(client.calls("fetch_albums_by_artist"), 2);
}

#[tokio::test]
async fn test_album_tracks_are_fetched_once() {
    let client = Arc::new(catalog_client());
    let cache = cache(&client);

    let first = cache.get_album_tracks("token", "al1").await.unwrap();
    let names: Vec<&str> = first.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Hello World!", "Go Programming Is Fun", "Café del Mar"]);
    assert_eq!(cache.album_for_track("t2").await.as_deref(), Some("al1"));

    let second = cache.get_album_tracks("token", "al1").await.unwrap();
    assert_eq!(second, first);
    assert_eq!(client.calls("fetch_tracks_by_album"), 1);
}

#[tokio::test]
async fn test_failed_album_population_retries_from_scratch() {
    let client = Arc::new(catalog_client());
    let cache = cache(&client);

    client.fail("fetch_tracks_by_album");
    assert!(cache.get_album_tracks("token", "al2").await.is_err());
    assert!(!cache.knows_album_tracks("al2").await);

    client.recover("fetch_tracks_by_album");
    let tracks = cache.get_album_tracks("token", "al2").await.unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(client.calls("fetch_tracks_by_album"), 2);
}

#[tokio::test]
async fn test_concurrent_population_fetches_once() {
    let client = Arc::new(catalog_client());
    let cache = Arc::new(cache(&client));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_album_tracks("token", "al1").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().len(), 3);
    }
    assert_eq!(client.calls("fetch_tracks_by_album"), 1);
}

#[tokio::test]
async fn test_unknown_album_is_not_found() {
    let client = Arc::new(FakeMusicClient::new());
    let cache = cache(&client);

    let err = cache.get_album_tracks("token", "nope").await.unwrap_err();
    assert!(matches!(err, GameError::NotFound(_)));
    assert!(!err.is_retryable());
}
