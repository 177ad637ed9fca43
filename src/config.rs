//! Configuration management for Name That Song.
//!
//! Values come from environment variables, optionally preloaded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Defaults below (where applicable)
//!
//! Only the Spotify client id and the OAuth redirect URI have no default.

use std::{env, path::PathBuf, time::Duration};

use thiserror::Error;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-read-private user-read-email streaming user-modify-playback-state user-read-playback-state";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_USER_ID: &str = "local";
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("cannot prepare config directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub market: String,
    pub server_address: String,
    pub user_id: String,
    pub call_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let call_timeout = match env::var("NTS_CALL_TIMEOUT_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    name: "NTS_CALL_TIMEOUT_SECS",
                    value,
                })?,
            Err(_) => Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        };

        Ok(Config {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scope: optional("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: optional("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: optional("SPOTIFY_API_URL", DEFAULT_API_URL),
            market: optional("SPOTIFY_MARKET", DEFAULT_MARKET),
            server_address: optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            user_id: optional("NTS_USER_ID", DEFAULT_USER_ID),
            call_timeout,
        })
    }

    /// Configuration with the public Spotify endpoints and the given client.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Config {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            market: DEFAULT_MARKET.to_string(),
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

/// Loads environment variables from `namethatsong/.env` in the local data
/// directory, creating the directory if needed.
///
/// A missing `.env` file is not an error; the environment alone may be
/// enough.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if dotenv::from_path(&path).is_err() {
        tracing::debug!(path = %path.display(), "no .env file loaded");
    }
    Ok(())
}

/// Platform specific data directory of the application.
///
/// - Linux: `~/.local/share/namethatsong`
/// - macOS: `~/Library/Application Support/namethatsong`
/// - Windows: `%LOCALAPPDATA%/namethatsong`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("namethatsong");
    path
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
