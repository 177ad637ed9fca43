use std::time::{Duration, Instant};

use rand::{Rng, seq::SliceRandom};

use crate::{error::GameError, types::QueueEntry};

/// Ordered list of tracks to play, with the position of the current one and
/// the timer of the track that is playing.
#[derive(Debug, Clone)]
pub struct PlaybackQueue {
    entries: Vec<QueueEntry>,
    cursor: usize,
    playing: bool,
    started_at: Option<Instant>,
    duration: Duration,
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            playing: false,
            started_at: None,
            duration: Duration::ZERO,
        }
    }

    pub fn add_to_queue(&mut self, entries: impl IntoIterator<Item = QueueEntry>) {
        self.entries.extend(entries);
    }

    /// Shuffles all entries and moves the cursor back to the first one.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.entries.shuffle(rng);
        self.cursor = 0;
    }

    pub fn clear_queue(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.playing = false;
        self.started_at = None;
        self.duration = Duration::ZERO;
    }

    /// Moves to the next entry. The cursor is left untouched when there is none.
    pub fn next_in_queue(&mut self) -> Result<QueueEntry, GameError> {
        let entry = self.peek_next().cloned().ok_or(GameError::QueueExhausted)?;
        self.cursor += 1;
        Ok(entry)
    }

    pub fn peek_next(&self) -> Option<&QueueEntry> {
        self.entries.get(self.cursor + 1)
    }

    pub fn current(&self) -> Option<&QueueEntry> {
        self.entries.get(self.cursor)
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Entries after the current one.
    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.cursor + 1)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Restarts the timer for a track lasting `duration`.
    pub fn start_track(&mut self, duration: Duration) {
        self.started_at = Some(Instant::now());
        self.duration = duration;
        self.playing = true;
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|s| s.elapsed()).unwrap_or_default()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the current track has played for its whole duration.
    pub fn song_over(&self) -> bool {
        match self.started_at {
            Some(started) => started.elapsed() >= self.duration,
            None => false,
        }
    }
}
