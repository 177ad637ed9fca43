use serde::{Deserialize, Serialize};

use crate::types::{AlbumKind, AlbumRecord, ArtistRecord, TrackRecord};

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchArtistsResponse {
    pub artists: Paging<ArtistObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl From<ArtistObject> for ArtistRecord {
    fn from(a: ArtistObject) -> Self {
        ArtistRecord {
            id: a.id,
            name: a.name,
            image_url: a.images.into_iter().next().map(|i| i.url),
            popularity: a.popularity.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleArtist {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumObject {
    pub id: String,
    pub name: String,
    pub album_type: String,
    #[serde(default)]
    pub total_tracks: u32,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

impl From<AlbumObject> for AlbumRecord {
    fn from(a: AlbumObject) -> Self {
        AlbumRecord {
            id: a.id,
            name: a.name,
            album_type: a.album_type,
            total_tracks: a.total_tracks,
            image_url: a.images.into_iter().next().map(|i| i.url),
            release_date: a.release_date,
            artist_ids: a.artists.into_iter().map(|a| a.id).collect(),
            kind: AlbumKind::Album,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    // local files have no id
    pub id: Option<String>,
    pub name: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub disc_number: u32,
    #[serde(default)]
    pub track_number: u32,
}

impl TrackObject {
    pub fn into_record(self, album_id: &str) -> Option<TrackRecord> {
        Some(TrackRecord {
            id: self.id?,
            name: self.name,
            duration_ms: self.duration_ms,
            disc_number: self.disc_number,
            track_number: self.track_number,
            album_id: album_id.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    pub tracks: Vec<TrackObject>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayRequest {
    pub uris: Vec<String>,
    pub position_ms: u64,
}
