use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use crate::{
    error::{Result, bounded},
    spotify::{MusicServiceClient, TopTracks},
    types::{AlbumRecord, ArtistRecord, TOP_TRACKS_PREFIX, TrackRecord},
};

#[derive(Debug, Default)]
struct CatalogIndex {
    artists: HashMap<String, ArtistRecord>,
    albums: HashMap<String, AlbumRecord>,
    tracks: HashMap<String, TrackRecord>,
    artist_albums: HashMap<String, Vec<String>>,
    album_tracks: HashMap<String, Vec<String>>,
    album_artist: HashMap<String, String>,
    track_album: HashMap<String, String>,
}

impl CatalogIndex {
    fn albums_of(&self, artist_id: &str) -> Option<Vec<AlbumRecord>> {
        self.artist_albums.get(artist_id).map(|ids| {
            ids.iter()
                .filter_map(|id| self.albums.get(id).cloned())
                .collect()
        })
    }

    fn tracks_of(&self, album_id: &str) -> Option<Vec<TrackRecord>> {
        self.album_tracks.get(album_id).map(|ids| {
            ids.iter()
                .filter_map(|id| self.tracks.get(id).cloned())
                .collect()
        })
    }

    fn install_artist(
        &mut self,
        artist: ArtistRecord,
        top: TopTracks,
        albums: Vec<AlbumRecord>,
    ) -> Vec<AlbumRecord> {
        let artist_id = artist.id.clone();
        let mut album_ids = Vec::with_capacity(albums.len() + 1);

        let top_id = top.album.id.clone();
        album_ids.push(top_id.clone());
        self.albums.insert(top_id.clone(), top.album);
        let top_track_ids = top
            .tracks
            .into_iter()
            .map(|track| {
                let id = track.id.clone();
                self.tracks.insert(id.clone(), track);
                id
            })
            .collect();
        self.album_tracks.insert(top_id, top_track_ids);

        for album in albums {
            album_ids.push(album.id.clone());
            self.album_artist.insert(album.id.clone(), artist_id.clone());
            self.albums.insert(album.id.clone(), album);
        }

        self.artists.entry(artist_id.clone()).or_insert(artist);
        self.artist_albums.insert(artist_id.clone(), album_ids);
        self.albums_of(&artist_id).unwrap_or_default()
    }

    fn install_tracks(&mut self, album_id: &str, tracks: Vec<TrackRecord>) -> Vec<TrackRecord> {
        let ids = tracks
            .iter()
            .map(|track| track.id.clone())
            .collect::<Vec<_>>();
        for track in tracks {
            self.track_album
                .insert(track.id.clone(), album_id.to_string());
            self.tracks.insert(track.id.clone(), track);
        }
        self.album_tracks.insert(album_id.to_string(), ids);
        self.tracks_of(album_id).unwrap_or_default()
    }
}

/// Memoizing view of the streaming catalog shared by every session.
///
/// Artists, albums and tracks are fetched on first request and kept for the
/// lifetime of the process. Populating an artist or an album is
/// all-or-nothing: when any fetch fails nothing is installed, so a later
/// request starts over. Only one task populates a given id at a time; reads
/// never wait on the network.
pub struct CatalogCache {
    client: Arc<dyn MusicServiceClient>,
    call_timeout: Duration,
    index: RwLock<CatalogIndex>,
    artist_guards: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    album_guards: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CatalogCache {
    pub fn new(client: Arc<dyn MusicServiceClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
            index: RwLock::new(CatalogIndex::default()),
            artist_guards: Mutex::new(HashMap::new()),
            album_guards: Mutex::new(HashMap::new()),
        }
    }

    /// Keeps artist records returned by a search.
    pub async fn remember_artists(&self, artists: &[ArtistRecord]) {
        let mut index = self.index.write().await;
        for artist in artists {
            index.artists.insert(artist.id.clone(), artist.clone());
        }
    }

    /// Albums of an artist, the synthetic top tracks album first.
    #[instrument(skip(self, access_token))]
    pub async fn get_artist_albums(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<Vec<AlbumRecord>> {
        if let Some(albums) = self.index.read().await.albums_of(artist_id) {
            return Ok(albums);
        }

        let guard = population_guard(&self.artist_guards, artist_id).await;
        let _populating = guard.lock().await;
        if let Some(albums) = self.index.read().await.albums_of(artist_id) {
            return Ok(albums);
        }

        let known = self.index.read().await.artists.get(artist_id).cloned();
        let artist = match known {
            Some(artist) => artist,
            None => {
                bounded(
                    self.call_timeout,
                    self.client.fetch_artist(access_token, artist_id),
                )
                .await?
            }
        };
        let top = bounded(
            self.call_timeout,
            self.client.fetch_artist_top_tracks(access_token, &artist),
        )
        .await?;
        let albums = bounded(
            self.call_timeout,
            self.client.fetch_albums_by_artist(access_token, artist_id),
        )
        .await?;

        debug!(
            top_tracks = top.tracks.len(),
            albums = albums.len(),
            "populating artist"
        );
        let mut index = self.index.write().await;
        Ok(index.install_artist(artist, top, albums))
    }

    /// Tracks of an album in catalog order.
    #[instrument(skip(self, access_token))]
    pub async fn get_album_tracks(
        &self,
        access_token: &str,
        album_id: &str,
    ) -> Result<Vec<TrackRecord>> {
        if let Some(tracks) = self.index.read().await.tracks_of(album_id) {
            return Ok(tracks);
        }

        // top tracks are installed together with their artist
        if let Some(artist_id) = album_id.strip_prefix(TOP_TRACKS_PREFIX) {
            self.get_artist_albums(access_token, artist_id).await?;
            return Ok(self
                .index
                .read()
                .await
                .tracks_of(album_id)
                .unwrap_or_default());
        }

        let guard = population_guard(&self.album_guards, album_id).await;
        let _populating = guard.lock().await;
        if let Some(tracks) = self.index.read().await.tracks_of(album_id) {
            return Ok(tracks);
        }

        let tracks = bounded(
            self.call_timeout,
            self.client.fetch_tracks_by_album(access_token, album_id),
        )
        .await?;

        debug!(tracks = tracks.len(), "populating album");
        let mut index = self.index.write().await;
        Ok(index.install_tracks(album_id, tracks))
    }

    pub async fn artist(&self, artist_id: &str) -> Option<ArtistRecord> {
        self.index.read().await.artists.get(artist_id).cloned()
    }

    pub async fn album(&self, album_id: &str) -> Option<AlbumRecord> {
        self.index.read().await.albums.get(album_id).cloned()
    }

    pub async fn track(&self, track_id: &str) -> Option<TrackRecord> {
        self.index.read().await.tracks.get(track_id).cloned()
    }

    pub async fn artist_for_album(&self, album_id: &str) -> Option<String> {
        self.index.read().await.album_artist.get(album_id).cloned()
    }

    pub async fn album_for_track(&self, track_id: &str) -> Option<String> {
        self.index.read().await.track_album.get(track_id).cloned()
    }

    /// Whether the albums of the artist have been fetched.
    pub async fn knows_artist(&self, artist_id: &str) -> bool {
        self.index.read().await.artist_albums.contains_key(artist_id)
    }

    pub async fn knows_album_tracks(&self, album_id: &str) -> bool {
        self.index.read().await.album_tracks.contains_key(album_id)
    }
}

async fn population_guard(
    guards: &Mutex<HashMap<String, Arc<Mutex<()>>>>,
    id: &str,
) -> Arc<Mutex<()>> {
    let mut guards = guards.lock().await;
    Arc::clone(guards.entry(id.to_string()).or_default())
}
