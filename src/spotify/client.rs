use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    MusicServiceClient, TopTracks,
    wire::{
        AlbumObject, ArtistObject, Paging, PlayRequest, SearchArtistsResponse, TopTracksResponse,
        TrackObject,
    },
};
use crate::{
    config::Config,
    error::ClientError,
    types::{AlbumRecord, ArtistRecord, TokenResponse, TrackRecord, top_tracks_album_id},
};

const PAGE_LIMIT: u32 = 50;

/// [`MusicServiceClient`] talking to the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    client_id: String,
    redirect_uri: String,
    api_url: String,
    token_url: String,
    market: String,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.call_timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            redirect_uri: config.redirect_uri.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            market: config.market.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ClientError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let response = check_status(response, what)?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }

    /// Collects every item of a paged endpoint by following `next` links.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        access_token: &str,
        first_url: String,
        what: &str,
    ) -> Result<Vec<T>, ClientError> {
        let mut items = Vec::new();
        let mut next = Some(first_url);

        while let Some(url) = next {
            let page: Paging<T> = self
                .get_json(self.http.get(&url).bearer_auth(access_token), what)
                .await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }

    async fn send_command(&self, request: RequestBuilder, what: &str) -> Result<(), ClientError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        check_status(response, what).map(|_| ())
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, ClientError> {
        self.get_json(self.http.post(&self.token_url).form(form), "token")
            .await
    }
}

#[async_trait]
impl MusicServiceClient for SpotifyClient {
    async fn search_artists_by_name(
        &self,
        access_token: &str,
        name: &str,
    ) -> Result<Vec<ArtistRecord>, ClientError> {
        let query = format!("artist:{}", name.to_lowercase());
        let limit = PAGE_LIMIT.to_string();
        let request = self
            .http
            .get(format!("{}/search", self.api_url))
            .query(&[("type", "artist"), ("q", query.as_str()), ("limit", limit.as_str())])
            .bearer_auth(access_token);

        let response: SearchArtistsResponse = self.get_json(request, "artist search").await?;
        let mut artists: Vec<ArtistRecord> = response
            .artists
            .items
            .into_iter()
            .map(ArtistRecord::from)
            .collect();
        artists.sort_by(|a, b| b.popularity.cmp(&a.popularity));

        debug!(name, found = artists.len(), "searched artists");
        Ok(artists)
    }

    async fn fetch_artist(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<ArtistRecord, ClientError> {
        let request = self
            .http
            .get(format!("{}/artists/{}", self.api_url, artist_id))
            .bearer_auth(access_token);
        let artist: ArtistObject = self
            .get_json(request, &format!("artist {artist_id}"))
            .await?;
        Ok(artist.into())
    }

    async fn fetch_albums_by_artist(
        &self,
        access_token: &str,
        artist_id: &str,
    ) -> Result<Vec<AlbumRecord>, ClientError> {
        let url = format!(
            "{uri}/artists/{id}/albums?include_groups=album&limit={limit}",
            uri = self.api_url,
            id = artist_id,
            limit = PAGE_LIMIT
        );
        let albums: Vec<AlbumObject> = self
            .get_all_pages(access_token, url, &format!("albums of artist {artist_id}"))
            .await?;

        Ok(albums
            .into_iter()
            .filter(|a| a.album_type == "album")
            .map(AlbumRecord::from)
            .collect())
    }

    async fn fetch_tracks_by_album(
        &self,
        access_token: &str,
        album_id: &str,
    ) -> Result<Vec<TrackRecord>, ClientError> {
        let url = format!(
            "{uri}/albums/{id}/tracks?limit={limit}",
            uri = self.api_url,
            id = album_id,
            limit = PAGE_LIMIT
        );
        let tracks: Vec<TrackObject> = self
            .get_all_pages(access_token, url, &format!("tracks of album {album_id}"))
            .await?;

        Ok(tracks
            .into_iter()
            .filter_map(|t| t.into_record(album_id))
            .collect())
    }

    async fn fetch_artist_top_tracks(
        &self,
        access_token: &str,
        artist: &ArtistRecord,
    ) -> Result<TopTracks, ClientError> {
        let request = self
            .http
            .get(format!("{}/artists/{}/top-tracks", self.api_url, artist.id))
            .query(&[("market", self.market.as_str())])
            .bearer_auth(access_token);
        let response: TopTracksResponse = self
            .get_json(request, &format!("top tracks of artist {}", artist.id))
            .await?;

        let album_id = top_tracks_album_id(&artist.id);
        let tracks: Vec<TrackRecord> = response
            .tracks
            .into_iter()
            .filter_map(|t| t.into_record(&album_id))
            .collect();
        let album = AlbumRecord::top_tracks(artist, tracks.len() as u32);

        Ok(TopTracks { album, tracks })
    }

    async fn play_track(&self, access_token: &str, track_id: &str) -> Result<(), ClientError> {
        let body = PlayRequest {
            uris: vec![format!("spotify:track:{track_id}")],
            position_ms: 0,
        };
        let request = self
            .http
            .put(format!("{}/me/player/play", self.api_url))
            .bearer_auth(access_token)
            .json(&body);
        self.send_command(request, "active device").await
    }

    async fn pause_playback(&self, access_token: &str) -> Result<(), ClientError> {
        let request = self
            .http
            .put(format!("{}/me/player/pause", self.api_url))
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.send_command(request, "active device").await
    }

    async fn resume_playback(&self, access_token: &str) -> Result<(), ClientError> {
        let request = self
            .http
            .put(format!("{}/me/player/play", self.api_url))
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.send_command(request, "active device").await
    }

    async fn exchange_authorization_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, ClientError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("client_id", &self.client_id),
            ("code", code),
            ("code_verifier", code_verifier),
            ("redirect_uri", &self.redirect_uri),
        ])
        .await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, ClientError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.client_id),
        ])
        .await
    }
}

fn check_status(response: Response, what: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            warn!(?retry_after, "rate limited by Spotify");
            Err(ClientError::RateLimited { retry_after })
        }
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(what.to_string())),
        other => Err(ClientError::Transport(format!(
            "unexpected status {other} for {what}"
        ))),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else if err.is_decode() {
        ClientError::Decode(err.to_string())
    } else {
        ClientError::Transport(err.to_string())
    }
}
