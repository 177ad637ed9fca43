use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    config,
    error::StoreError,
    types::{AccessToken, UserId},
};

/// Durable per-user storage of the streaming service token.
#[async_trait]
pub trait PersistentTokenStore: Send + Sync {
    async fn create(&self, user_id: &UserId, token: &AccessToken) -> Result<(), StoreError>;

    /// Stored token of the user, `None` when nothing was stored yet.
    async fn get(&self, user_id: &UserId) -> Result<Option<AccessToken>, StoreError>;

    /// Replaces the access value and its expiry, keeping the refresh value.
    async fn update(
        &self,
        user_id: &UserId,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn is_valid(&self, user_id: &UserId) -> Result<bool, StoreError> {
        Ok(self
            .get(user_id)
            .await?
            .is_some_and(|token| !token.is_expired()))
    }
}

/// Token store keeping one JSON file per user.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store located in the application data directory.
    pub fn in_data_dir() -> Self {
        Self::new(config::data_dir().join("tokens"))
    }

    /// File of the user inside the store directory. Ids that could name a
    /// path outside of it are rejected.
    fn token_path(&self, user_id: &UserId) -> Result<PathBuf, StoreError> {
        let id = user_id.as_str();
        let safe = !id.is_empty()
            && !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
        if !safe {
            return Err(StoreError::InvalidUserId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    async fn write(&self, user_id: &UserId, token: &AccessToken) -> Result<(), StoreError> {
        let path = self.token_path(user_id)?;
        async_fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(token)?;
        async_fs::write(path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistentTokenStore for FileTokenStore {
    async fn create(&self, user_id: &UserId, token: &AccessToken) -> Result<(), StoreError> {
        self.write(user_id, token).await
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<AccessToken>, StoreError> {
        let content = match async_fs::read_to_string(self.token_path(user_id)?).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn update(
        &self,
        user_id: &UserId,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut token = self
            .get(user_id)
            .await?
            .ok_or_else(|| StoreError::Missing(user_id.to_string()))?;
        token.access_token = access_token.to_string();
        token.expires_at = expires_at;
        self.write(user_id, &token).await
    }
}
