//! # Spotify Integration Module
//!
//! This module defines the capability the game engine needs from a music
//! streaming service, [`MusicServiceClient`], and its production
//! implementation over the Spotify Web API, [`SpotifyClient`].
//!
//! ## Architecture
//!
//! ```text
//! Game engine (GameSession, CatalogCache, TokenLifecycleManager)
//!          ↓  Arc<dyn MusicServiceClient>
//! SpotifyClient
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! The engine never builds a client itself; one is injected at construction
//! time, which lets tests substitute a fake that counts calls.
//!
//! ## Covered endpoints
//!
//! - `GET /search?type=artist` - artist search
//! - `GET /artists/{id}` - artist details
//! - `GET /artists/{id}/albums` - albums of an artist (paged, albums only)
//! - `GET /artists/{id}/top-tracks` - top tracks, exposed as a synthetic album
//! - `GET /albums/{id}/tracks` - tracks of an album (paged)
//! - `PUT /me/player/play`, `PUT /me/player/pause` - playback control
//! - `POST /api/token` - authorization code exchange and token refresh
//!
//! ## Errors
//!
//! Every operation fails with a [`ClientError`]: `401` maps to
//! `Unauthorized`, `429` to `RateLimited` (with the `Retry-After` delay when
//! present), `404` to `NotFound`, client timeouts to `Timeout`, and anything
//! else to `Transport`. No operation retries on its own.
//!
//! ## Authentication flow
//!
//! [`auth`] drives the interactive OAuth 2.0 authorization code flow with
//! PKCE used by the command line: it starts the local callback server, opens
//! the authorization URL in the browser and waits for the callback to store
//! a token in the user's session.

pub mod auth;
mod client;
mod wire;

use async_trait::async_trait;

pub use client::SpotifyClient;

use crate::{
    error::ClientError,
    types::{AlbumRecord, ArtistRecord, TokenResponse, TrackRecord},
};

/// An artist's top tracks presented as one synthetic album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopTracks {
    pub album: AlbumRecord,
    pub tracks: Vec<TrackRecord>,
}

/// Operations the game engine performs against the streaming service.
///
/// Catalog and playback operations act on behalf of the user owning
/// `access_token`.
#[async_trait]
pub trait MusicServiceClient: Send + Sync {
    async fn search_artists_by_name(
        &self,
        access_token: &str,
        name: &str,
    ) -> Result<Vec<ArtistRecord>, ClientError>;

    async fn fetch_artist(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<ArtistRecord, ClientError>;

    async fn fetch_albums_by_artist(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<Vec<AlbumRecord>, ClientError>;

    async fn fetch_tracks_by_album(
        &self,
        access_token: &str,
        album_id: &str,
    ) -> Result<Vec<TrackRecord>, ClientError>;

    /// Top tracks of `artist`; the tracks reference the synthetic album.
    async fn fetch_artist_top_tracks(
        &self,
        access_token: &str,
        artist: &ArtistRecord,
    ) -> Result<TopTracks, ClientError>;

    async fn play_track(&self, access_token: &str, track_id: &str) -> Result<(), ClientError>;

    async fn pause_playback(&self, access_token: &str) -> Result<(), ClientError>;

    async fn resume_playback(&self, access_token: &str) -> Result<(), ClientError>;

    async fn exchange_authorization_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, ClientError>;

    async fn refresh_access_token(&self, refresh_token: &str)
    -> Result<TokenResponse, ClientError>;
}
