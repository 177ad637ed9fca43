use std::{collections::HashSet, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::{
    config::Config,
    error::{GameError, NotFoundError, Result, ValidationError, bounded},
    game::{GuessState, PlaybackQueue},
    management::{CatalogCache, PersistentTokenStore, TokenLifecycleManager},
    spotify::MusicServiceClient,
    types::{
        AlbumRecord, ArtistRecord, NowPlaying, QueueEntry, Selection, SessionSnapshot,
        TrackRecord, UserId,
    },
};

struct SessionState {
    selection: Selection,
    queue: PlaybackQueue,
    guess: GuessState,
    tokens: TokenLifecycleManager,
    now_playing: Option<NowPlaying>,
    score: u32,
    tracks_played: u32,
    scored_current: bool,
}

/// One user's game: album selection, playback queue, the title being
/// guessed and the user's streaming token.
///
/// Every operation takes the session lock for its whole duration, so two
/// requests of the same user never interleave. Operations that fail leave
/// the game as it was before the call; only a refreshed token survives.
pub struct GameSession {
    user_id: UserId,
    state: Mutex<SessionState>,
    catalog: Arc<CatalogCache>,
    client: Arc<dyn MusicServiceClient>,
    call_timeout: Duration,
}

impl GameSession {
    pub fn new(
        user_id: UserId,
        catalog: Arc<CatalogCache>,
        client: Arc<dyn MusicServiceClient>,
        store: Arc<dyn PersistentTokenStore>,
        call_timeout: Duration,
    ) -> Self {
        let tokens =
            TokenLifecycleManager::new(user_id.clone(), Arc::clone(&client), store, call_timeout);

        Self {
            user_id,
            state: Mutex::new(SessionState {
                selection: Selection::default(),
                queue: PlaybackQueue::new(),
                guess: GuessState::empty(),
                tokens,
                now_playing: None,
                score: 0,
                tracks_played: 0,
                scored_current: false,
            }),
            catalog,
            client,
            call_timeout,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Selects the album when it is not selected and deselects it otherwise.
    /// Returns whether the album is selected afterwards.
    pub async fn toggle_album_selection(&self, album_id: &str, artist_id: &str) -> bool {
        let selected = self
            .state
            .lock()
            .await
            .selection
            .toggle(album_id, artist_id);
        debug!(user = %self.user_id, album_id, artist_id, selected, "toggled album");
        selected
    }

    /// Builds a shuffled queue from the selected albums and plays its first
    /// track.
    ///
    /// A running game is replaced. Nothing changes when any step fails.
    #[instrument(skip(self), fields(user = %self.user_id))]
    pub async fn start_game(&self) -> Result<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.selection.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }

        let access_token = state.tokens.ensure_access_token().await?;
        let entries = self.stage_entries(&access_token, &state.selection).await?;

        let mut queue = PlaybackQueue::new();
        queue.add_to_queue(entries);
        queue.shuffle();
        let first = queue
            .current()
            .cloned()
            .ok_or(ValidationError::NoPlayableTracks)?;
        let now_playing = self.resolve(&first).await?;

        bounded(
            self.call_timeout,
            self.client.play_track(&access_token, &first.track_id),
        )
        .await?;

        queue.start_track(now_playing.track.duration());
        info!(tracks = queue.len(), "game started");
        state.queue = queue;
        state.guess = GuessState::new(&now_playing.track.name);
        state.now_playing = Some(now_playing);
        state.score = 0;
        state.tracks_played = 1;
        state.scored_current = false;
        Ok(())
    }

    /// Applies a guess to the current title. Returns whether the title is
    /// now fully revealed.
    #[instrument(skip(self, text), fields(user = %self.user_id))]
    pub async fn guess(&self, text: &str) -> Result<bool> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.now_playing.is_none() {
            return Err(NotFoundError::NoActiveTrack.into());
        }

        let outcome = state.guess.guess(text);
        if outcome.revealed && !state.scored_current {
            state.score += 1;
            state.scored_current = true;
            info!(score = state.score, "title revealed");
        }
        Ok(outcome.revealed)
    }

    /// Plays the next track of the queue.
    ///
    /// The queue only advances once the streaming service accepted the play
    /// instruction.
    #[instrument(skip(self), fields(user = %self.user_id))]
    pub async fn skip_song(&self) -> Result<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let next = state
            .queue
            .peek_next()
            .cloned()
            .ok_or(GameError::QueueExhausted)?;
        let now_playing = self.resolve(&next).await?;

        let access_token = state.tokens.ensure_access_token().await?;
        bounded(
            self.call_timeout,
            self.client.play_track(&access_token, &next.track_id),
        )
        .await?;

        state.queue.next_in_queue()?;
        state.queue.start_track(now_playing.track.duration());
        state.guess = GuessState::new(&now_playing.track.name);
        state.now_playing = Some(now_playing);
        state.tracks_played += 1;
        state.scored_current = false;
        debug!(cursor = state.queue.cursor(), "skipped song");
        Ok(())
    }

    /// Forgets the selection and the game, then pauses playback.
    ///
    /// The local reset happens even when pausing fails.
    #[instrument(skip(self), fields(user = %self.user_id))]
    pub async fn clear_queue(&self) -> Result<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        state.selection.clear();
        state.guess = GuessState::empty();
        state.queue.clear_queue();
        state.now_playing = None;
        state.score = 0;
        state.tracks_played = 0;
        state.scored_current = false;

        let access_token = state.tokens.ensure_access_token().await?;
        bounded(self.call_timeout, self.client.pause_playback(&access_token)).await
    }

    /// Artists matching `name`, most popular first.
    #[instrument(skip(self), fields(user = %self.user_id))]
    pub async fn search_artists(&self, name: &str) -> Result<Vec<ArtistRecord>> {
        let access_token = self.access_token().await?;
        let mut artists = bounded(
            self.call_timeout,
            self.client.search_artists_by_name(&access_token, name),
        )
        .await?;
        artists.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        self.catalog.remember_artists(&artists).await;
        Ok(artists)
    }

    pub async fn artist_albums(&self, artist_id: &str) -> Result<Vec<AlbumRecord>> {
        let access_token = self.access_token().await?;
        self.catalog
            .get_artist_albums(&access_token, artist_id)
            .await
    }

    pub async fn album_tracks(&self, album_id: &str) -> Result<Vec<TrackRecord>> {
        let access_token = self.access_token().await?;
        self.catalog.get_album_tracks(&access_token, album_id).await
    }

    pub async fn pause(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let access_token = state.tokens.ensure_access_token().await?;
        bounded(self.call_timeout, self.client.pause_playback(&access_token)).await?;
        state.queue.set_playing(false);
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let access_token = state.tokens.ensure_access_token().await?;
        bounded(self.call_timeout, self.client.resume_playback(&access_token)).await?;
        state.queue.set_playing(true);
        Ok(())
    }

    /// URL the user has to open to authorize this session.
    pub async fn authorize_url(&self, config: &Config) -> Result<String> {
        self.state.lock().await.tokens.authorize_url(config)
    }

    pub async fn exchange_token(&self, oauth_state: &str, code: &str) -> Result<()> {
        self.state
            .lock()
            .await
            .tokens
            .exchange_token(oauth_state, code)
            .await
    }

    /// Writes the session token to the token store.
    pub async fn persist_token(&self) -> Result<()> {
        self.state.lock().await.tokens.persist().await
    }

    pub async fn has_token(&self) -> bool {
        self.state.lock().await.tokens.has_token()
    }

    pub async fn masked_title(&self) -> String {
        self.state.lock().await.guess.render()
    }

    pub async fn song_over(&self) -> bool {
        self.state.lock().await.queue.song_over()
    }

    pub async fn selected_albums(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .selection
            .albums
            .iter()
            .cloned()
            .collect()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            masked_title: state.guess.render(),
            revealed: state.now_playing.is_some() && state.guess.is_revealed(),
            now_playing: state.now_playing.clone(),
            selected_albums: state.selection.albums.iter().cloned().collect(),
            artist_counts: state.selection.artists.clone(),
            queue_len: state.queue.len(),
            cursor: state.queue.cursor(),
            remaining: state.queue.remaining(),
            elapsed: state.queue.elapsed(),
            duration: state.queue.duration(),
            song_over: state.queue.song_over(),
            score: state.score,
            tracks_played: state.tracks_played,
        }
    }

    async fn access_token(&self) -> Result<String> {
        self.state.lock().await.tokens.ensure_access_token().await
    }

    async fn stage_entries(
        &self,
        access_token: &str,
        selection: &Selection,
    ) -> Result<Vec<QueueEntry>> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for artist_id in selection.artists.keys() {
            let albums = self
                .catalog
                .get_artist_albums(access_token, artist_id)
                .await?;
            for album in albums.iter().filter(|a| selection.contains(&a.id)) {
                let tracks = self
                    .catalog
                    .get_album_tracks(access_token, &album.id)
                    .await?;
                for track in tracks {
                    if seen.insert(track.id.clone()) {
                        entries.push(QueueEntry::new(track.id, &album.id, artist_id));
                    }
                }
            }
        }

        debug!(staged = entries.len(), "staged queue entries");
        Ok(entries)
    }

    async fn resolve(&self, entry: &QueueEntry) -> Result<NowPlaying> {
        let missing = |kind: &'static str, id: &str| NotFoundError::CacheInconsistency {
            kind,
            id: id.to_string(),
        };

        let track = self
            .catalog
            .track(&entry.track_id)
            .await
            .ok_or_else(|| missing("track", &entry.track_id))?;
        let album = self
            .catalog
            .album(&entry.album_id)
            .await
            .ok_or_else(|| missing("album", &entry.album_id))?;
        let artist = self
            .catalog
            .artist(&entry.artist_id)
            .await
            .ok_or_else(|| missing("artist", &entry.artist_id))?;

        Ok(NowPlaying {
            track,
            album,
            artist,
        })
    }
}
