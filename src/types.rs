use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::ExternalServiceError;

/// Prefix of the generated id of an artist's "top tracks" album.
pub const TOP_TRACKS_PREFIX: &str = "top-tracks:";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// The "nothing loaded yet" token: empty values, expired since the epoch.
    pub fn empty() -> Self {
        AccessToken {
            access_token: String::new(),
            refresh_token: String::new(),
            token_type: String::new(),
            scope: String::new(),
            expires_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Builds the in-memory token from a service response obtained at `now`.
    ///
    /// A response without a refresh value keeps `previous_refresh`. A
    /// lifetime that does not fit a timestamp is rejected as undecodable.
    pub fn from_response(
        response: TokenResponse,
        previous_refresh: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, ExternalServiceError> {
        let expires_at = i64::try_from(response.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ExternalServiceError::Decode(format!(
                    "token lifetime of {}s is out of range",
                    response.expires_in
                ))
            })?;

        Ok(AccessToken {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| previous_refresh.to_string()),
            token_type: response.token_type,
            scope: response.scope,
            expires_at,
        })
    }
}

impl Default for AccessToken {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub popularity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlbumKind {
    Album,
    TopTracks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub id: String,
    pub name: String,
    pub album_type: String,
    pub total_tracks: u32,
    pub image_url: Option<String>,
    pub release_date: String,
    pub artist_ids: Vec<String>,
    pub kind: AlbumKind,
}

impl AlbumRecord {
    /// Synthetic album holding an artist's top tracks.
    pub fn top_tracks(artist: &ArtistRecord, total_tracks: u32) -> Self {
        AlbumRecord {
            id: top_tracks_album_id(&artist.id),
            name: format!("{} - Top Tracks", artist.name),
            album_type: "top_tracks".to_string(),
            total_tracks,
            image_url: artist.image_url.clone(),
            release_date: String::new(),
            artist_ids: vec![artist.id.clone()],
            kind: AlbumKind::TopTracks,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.kind == AlbumKind::TopTracks
    }
}

pub fn top_tracks_album_id(artist_id: &str) -> String {
    format!("{TOP_TRACKS_PREFIX}{artist_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    pub duration_ms: u64,
    pub disc_number: u32,
    pub track_number: u32,
    pub album_id: String,
}

impl TrackRecord {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueEntry {
    pub track_id: String,
    pub album_id: String,
    pub artist_id: String,
}

impl QueueEntry {
    pub fn new(
        track_id: impl Into<String>,
        album_id: impl Into<String>,
        artist_id: impl Into<String>,
    ) -> Self {
        QueueEntry {
            track_id: track_id.into(),
            album_id: album_id.into(),
            artist_id: artist_id.into(),
        }
    }
}

/// Albums picked for the next game, with per-artist counts.
///
/// An artist is present in `artists` only while at least one of its albums
/// is selected; a count is never stored as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub albums: BTreeSet<String>,
    pub artists: BTreeMap<String, u32>,
}

impl Selection {
    /// Flips the membership of `album_id` and returns whether it is now selected.
    pub fn toggle(&mut self, album_id: &str, artist_id: &str) -> bool {
        if self.albums.remove(album_id) {
            if let Some(count) = self.artists.get_mut(artist_id) {
                *count -= 1;
                if *count == 0 {
                    self.artists.remove(artist_id);
                }
            }
            false
        } else {
            self.albums.insert(album_id.to_string());
            *self.artists.entry(artist_id.to_string()).or_insert(0) += 1;
            true
        }
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn contains(&self, album_id: &str) -> bool {
        self.albums.contains(album_id)
    }

    pub fn clear(&mut self) {
        self.albums.clear();
        self.artists.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub track: TrackRecord,
    pub album: AlbumRecord,
    pub artist: ArtistRecord,
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub masked_title: String,
    pub revealed: bool,
    pub now_playing: Option<NowPlaying>,
    pub selected_albums: Vec<String>,
    pub artist_counts: BTreeMap<String, u32>,
    pub queue_len: usize,
    pub cursor: usize,
    pub remaining: usize,
    pub elapsed: Duration,
    pub duration: Duration,
    pub song_over: bool,
    pub score: u32,
    pub tracks_played: u32,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub id: String,
    pub name: String,
    pub popularity: u32,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub id: String,
    pub name: String,
    pub released: String,
    pub tracks: u32,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub no: String,
    pub name: String,
    pub duration: String,
}
