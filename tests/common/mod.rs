#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use namethatsong::{
    error::{ClientError, StoreError},
    game::GameSession,
    management::{CatalogCache, PersistentTokenStore},
    spotify::{MusicServiceClient, TopTracks},
    types::{
        AccessToken, AlbumKind, AlbumRecord, ArtistRecord, TokenResponse, TrackRecord, UserId,
        top_tracks_album_id,
    },
};

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn artist(id: &str, name: &str) -> ArtistRecord {
    ArtistRecord {
        id: id.to_string(),
        name: name.to_string(),
        image_url: None,
        popularity: 50,
    }
}

pub fn album(id: &str, name: &str, artist_id: &str, total_tracks: u32) -> AlbumRecord {
    AlbumRecord {
        id: id.to_string(),
        name: name.to_string(),
        album_type: "album".to_string(),
        total_tracks,
        image_url: None,
        release_date: "2001-03-12".to_string(),
        artist_ids: vec![artist_id.to_string()],
        kind: AlbumKind::Album,
    }
}

pub fn track(id: &str, name: &str, album_id: &str) -> TrackRecord {
    TrackRecord {
        id: id.to_string(),
        name: name.to_string(),
        duration_ms: 180_000,
        disc_number: 1,
        track_number: 1,
        album_id: album_id.to_string(),
    }
}

pub fn valid_token() -> AccessToken {
    AccessToken {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        token_type: "Bearer".to_string(),
        scope: "streaming".to_string(),
        expires_at: Utc::now() + chrono::Duration::hours(1),
    }
}

pub fn expired_token() -> AccessToken {
    AccessToken {
        expires_at: Utc::now() - chrono::Duration::minutes(5),
        ..valid_token()
    }
}

/// Music service serving a fixed catalog and counting every call.
#[derive(Default)]
pub struct FakeMusicClient {
    artists: HashMap<String, ArtistRecord>,
    albums: HashMap<String, Vec<AlbumRecord>>,
    tracks: HashMap<String, Vec<TrackRecord>>,
    top_tracks: HashMap<String, Vec<TrackRecord>>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    plays: Mutex<Vec<String>>,
    refresh_response: Mutex<Option<TokenResponse>>,
    slow: Mutex<HashMap<&'static str, Duration>>,
}

impl FakeMusicClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artist(mut self, record: ArtistRecord) -> Self {
        self.artists.insert(record.id.clone(), record);
        self
    }

    pub fn with_album(mut self, record: AlbumRecord, tracks: Vec<TrackRecord>) -> Self {
        for artist_id in &record.artist_ids {
            self.albums
                .entry(artist_id.clone())
                .or_default()
                .push(record.clone());
        }
        self.tracks.insert(record.id.clone(), tracks);
        self
    }

    pub fn with_top_tracks(mut self, artist_id: &str, tracks: Vec<TrackRecord>) -> Self {
        self.top_tracks.insert(artist_id.to_string(), tracks);
        self
    }

    pub fn with_refresh_response(self, response: TokenResponse) -> Self {
        *self.refresh_response.lock().unwrap() = Some(response);
        self
    }

    /// Makes every call of `operation` fail until [`recover`](Self::recover).
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    /// Makes every call of `operation` take `delay` before answering.
    pub fn slow_down(&self, operation: &'static str, delay: Duration) {
        self.slow.lock().unwrap().insert(operation, delay);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn plays(&self) -> Vec<String> {
        self.plays.lock().unwrap().clone()
    }

    async fn record(&self, operation: &'static str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(operation.to_string());
        let delay = self.slow.lock().unwrap().get(operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(operation) {
            return Err(ClientError::Transport(format!("{operation} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl MusicServiceClient for FakeMusicClient {
    async fn search_artists_by_name(
        &self,
        _access_token: &str,
        name: &str,
    ) -> Result<Vec<ArtistRecord>, ClientError> {
        self.record("search_artists_by_name").await?;
        let name = name.to_lowercase();
        Ok(self
            .artists
            .values()
            .filter(|a| a.name.to_lowercase().contains(&name))
            .cloned()
            .collect())
    }

    async fn fetch_artist(
        &self,
        _access_token: &str,
        artist_id: &str,
    ) -> Result<ArtistRecord, ClientError> {
        self.record("fetch_artist").await?;
        self.artists
            .get(artist_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("artist {artist_id}")))
    }

    async fn fetch_albums_by_artist(
        &self,
        _access_token: &str,
        artist_id: &str,
    ) -> Result<Vec<AlbumRecord>, ClientError> {
        self.record("fetch_albums_by_artist").await?;
        Ok(self.albums.get(artist_id).cloned().unwrap_or_default())
    }

    async fn fetch_tracks_by_album(
        &self,
        _access_token: &str,
        album_id: &str,
    ) -> Result<Vec<TrackRecord>, ClientError> {
        self.record("fetch_tracks_by_album").await?;
        self.tracks
            .get(album_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("album {album_id}")))
    }

    async fn fetch_artist_top_tracks(
        &self,
        _access_token: &str,
        artist: &ArtistRecord,
    ) -> Result<TopTracks, ClientError> {
        self.record("fetch_artist_top_tracks").await?;
        let album_id = top_tracks_album_id(&artist.id);
        let tracks: Vec<TrackRecord> = self
            .top_tracks
            .get(&artist.id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|t| TrackRecord {
                album_id: album_id.clone(),
                ..t
            })
            .collect();
        Ok(TopTracks {
            album: AlbumRecord::top_tracks(artist, tracks.len() as u32),
            tracks,
        })
    }

    async fn play_track(&self, _access_token: &str, track_id: &str) -> Result<(), ClientError> {
        self.record("play_track").await?;
        self.plays.lock().unwrap().push(track_id.to_string());
        Ok(())
    }

    async fn pause_playback(&self, _access_token: &str) -> Result<(), ClientError> {
        self.record("pause_playback").await
    }

    async fn resume_playback(&self, _access_token: &str) -> Result<(), ClientError> {
        self.record("resume_playback").await
    }

    async fn exchange_authorization_code(
        &self,
        code: &str,
        _code_verifier: &str,
    ) -> Result<TokenResponse, ClientError> {
        self.record("exchange_authorization_code").await?;
        Ok(TokenResponse {
            access_token: format!("access-for-{code}"),
            refresh_token: Some("refresh-from-code".to_string()),
            token_type: "Bearer".to_string(),
            scope: "streaming".to_string(),
            expires_in: 3600,
        })
    }

    async fn refresh_access_token(
        &self,
        _refresh_token: &str,
    ) -> Result<TokenResponse, ClientError> {
        self.record("refresh_access_token").await?;
        Ok(self
            .refresh_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| TokenResponse {
                access_token: "refreshed".to_string(),
                refresh_token: None,
                token_type: "Bearer".to_string(),
                scope: "streaming".to_string(),
                expires_in: 3600,
            }))
    }
}

/// Token store keeping tokens in memory and counting writes.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<UserId, AccessToken>>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    failing_updates: AtomicBool,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(user_id: &UserId, token: AccessToken) -> Self {
        let store = Self::new();
        store.tokens.lock().unwrap().insert(user_id.clone(), token);
        store
    }

    pub fn stored(&self, user_id: &UserId) -> Option<AccessToken> {
        self.tokens.lock().unwrap().get(user_id).cloned()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Makes `update` fail while `failing` is set.
    pub fn fail_updates(&self, failing: bool) {
        self.failing_updates.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersistentTokenStore for MemoryTokenStore {
    async fn create(&self, user_id: &UserId, token: &AccessToken) -> Result<(), StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .unwrap()
            .insert(user_id.clone(), token.clone());
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.stored(user_id))
    }

    async fn update(
        &self,
        user_id: &UserId,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.failing_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        let mut tokens = self.tokens.lock().unwrap();
        let token = tokens
            .get_mut(user_id)
            .ok_or_else(|| StoreError::Missing(user_id.to_string()))?;
        token.access_token = access_token.to_string();
        token.expires_at = expires_at;
        Ok(())
    }
}

/// Catalog of one artist with two albums sharing a track, and top tracks.
pub fn catalog_client() -> FakeMusicClient {
    FakeMusicClient::new()
        .with_artist(artist("ar1", "The Testers"))
        .with_album(
            album("al1", "First Light", "ar1", 3),
            vec![
                track("t1", "Hello World!", "al1"),
                track("t2", "Go Programming Is Fun", "al1"),
                track("t3", "Café del Mar", "al1"),
            ],
        )
        .with_album(
            album("al2", "Second Wind", "ar1", 2),
            vec![
                track("t3", "Café del Mar", "al2"),
                track("t4", "Run (Radio Edit)", "al2"),
            ],
        )
        .with_top_tracks("ar1", vec![track("t1", "Hello World!", "")])
}

pub struct Fixture {
    pub session: Arc<GameSession>,
    pub client: Arc<FakeMusicClient>,
    pub store: Arc<MemoryTokenStore>,
    pub catalog: Arc<CatalogCache>,
}

/// Session of user `tester` holding a valid stored token.
pub fn session_fixture(client: FakeMusicClient) -> Fixture {
    let user_id = UserId::new("tester");
    let client = Arc::new(client);
    let store = Arc::new(MemoryTokenStore::with_token(&user_id, valid_token()));
    let catalog = Arc::new(CatalogCache::new(client.clone(), TIMEOUT));
    let session = Arc::new(GameSession::new(
        user_id,
        catalog.clone(),
        client.clone(),
        store.clone(),
        TIMEOUT,
    ));

    Fixture {
        session,
        client,
        store,
        catalog,
    }
}
