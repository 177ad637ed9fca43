//! Error taxonomy of the game engine.
//!
//! Every fallible engine operation returns [`Result`], whose error side is a
//! [`GameError`]. The variants group failures by who has to act on them:
//!
//! - [`ValidationError`] - the caller asked for something that cannot be done
//!   with the current input (nothing selected, no authorization code, ...)
//! - [`AuthError`] - the user has to (re-)authorize with the music service
//! - [`NotFoundError`] - an identity, a session or a cached record is missing
//! - [`ExternalServiceError`] - the music service or the token store failed;
//!   these are the only retryable errors
//! - [`GameError::QueueExhausted`] - the playback queue has no next entry
//!
//! Errors reported by a [`MusicServiceClient`](crate::spotify::MusicServiceClient)
//! and a [`PersistentTokenStore`](crate::management::PersistentTokenStore) are
//! converted through the `From` impls below and are otherwise surfaced
//! unchanged. Translating errors into user facing messages is left to the
//! presentation layer.

use std::{future::Future, time::Duration};

use thiserror::Error;

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("music service error: {0}")]
    External(#[from] ExternalServiceError),

    #[error("no more songs in the queue")]
    QueueExhausted,
}

impl GameError {
    /// Whether repeating the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GameError::External(
                ExternalServiceError::Transport(_)
                    | ExternalServiceError::RateLimited { .. }
                    | ExternalServiceError::Timeout
            )
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no album selected")]
    EmptySelection,

    #[error("authorization code is missing")]
    MissingCode,

    #[error("the selected albums have no playable tracks")]
    NoPlayableTracks,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("OAuth state does not match this session")]
    StateMismatch,

    #[error("access token expired and no refresh token is available")]
    NoRefreshToken,

    #[error("the music service rejected the access token")]
    Unauthorized,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("no user in request")]
    NoUser,

    #[error("no game registered for user {0}")]
    NoGameForUser(String),

    #[error("{kind} {id} is missing from the catalog cache")]
    CacheInconsistency { kind: &'static str, id: String },

    #[error("no song is playing")]
    NoActiveTrack,

    #[error("{0}")]
    Resource(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalServiceError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("request timed out")]
    Timeout,

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("token store failure: {0}")]
    Storage(String),
}

/// Failure reported by a music service client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Transport(String),

    #[error("timed out")]
    Timeout,

    #[error("cannot decode response: {0}")]
    Decode(String),
}

impl From<ClientError> for GameError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => AuthError::Unauthorized.into(),
            ClientError::RateLimited { retry_after } => {
                ExternalServiceError::RateLimited { retry_after }.into()
            }
            ClientError::NotFound(what) => NotFoundError::Resource(what).into(),
            ClientError::Transport(msg) => ExternalServiceError::Transport(msg).into(),
            ClientError::Timeout => ExternalServiceError::Timeout.into(),
            ClientError::Decode(msg) => ExternalServiceError::Decode(msg).into(),
        }
    }
}

/// Failure reported by a persistent token store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no token stored for user {0}")]
    Missing(String),

    #[error("user id {0:?} cannot name a token file")]
    InvalidUserId(String),
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        ExternalServiceError::Storage(err.to_string()).into()
    }
}

/// Runs an external call with an upper bound on its duration.
///
/// The elapsed limit is reported as [`ExternalServiceError::Timeout`]; the
/// call's own error is converted into a [`GameError`].
pub async fn bounded<T, E, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<GameError>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(ExternalServiceError::Timeout.into()),
    }
}
