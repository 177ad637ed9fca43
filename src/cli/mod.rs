//! # CLI Module
//!
//! Command line front end of the game. Every command works on the session of
//! the configured local user (`NTS_USER_ID`), whose token lives in the token
//! store of the local data directory.
//!
//! ## Commands
//!
//! - [`auth`] - authorize with Spotify through the OAuth 2.0 PKCE flow
//! - [`search`] - find artists by name
//! - [`list_albums`] - albums of an artist, the top tracks album first
//! - [`list_tracks`] - tracks of an album
//! - [`play`] - pick albums, then guess the titles of the songs playing
//!
//! ## Usage Patterns
//!
//! ```bash
//! namethatsong auth
//! namethatsong search "daft punk"
//! namethatsong albums 4tZwfgrHOc3mvqYlEYSvVi
//! namethatsong play --pick 4tZwfgrHOc3mvqYlEYSvVi:top-tracks:4tZwfgrHOc3mvqYlEYSvVi
//! ```
//!
//! Failures are printed with the status macros of the crate root; errors
//! that require a new authorization point the user to `namethatsong auth`.

mod albums;
mod auth;
mod play;
mod search;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Res,
    config::Config,
    error,
    error::GameError,
    game::{GameSession, GameSessionRegistry},
    management::{FileTokenStore, PersistentTokenStore},
    spotify::{MusicServiceClient, SpotifyClient},
    types::UserId,
};

pub use albums::{list_albums, list_tracks};
pub use auth::auth;
pub use play::play;
pub use search::search;

/// Everything a command needs: the configuration, the registry and the
/// session of the local user.
pub struct AppContext {
    pub config: Config,
    pub registry: Arc<GameSessionRegistry>,
    pub session: Arc<GameSession>,
}

impl AppContext {
    pub async fn new(config: Config) -> Res<Self> {
        let client: Arc<dyn MusicServiceClient> = Arc::new(SpotifyClient::new(&config)?);
        let registry = Arc::new(GameSessionRegistry::new(client, config.call_timeout));
        let store: Arc<dyn PersistentTokenStore> = Arc::new(FileTokenStore::in_data_dir());
        let session = registry
            .create_game(UserId::new(&config.user_id), store)
            .await;

        Ok(Self {
            config,
            registry,
            session,
        })
    }
}

fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

/// Prints the failure of `action` and exits.
fn fail(action: &str, e: GameError) -> ! {
    if matches!(e, GameError::Auth(_)) {
        error!("{} failed: {}\nPlease run namethatsong auth.", action, e);
    }
    error!("{} failed: {}", action, e);
}
