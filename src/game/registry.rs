use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::RwLock;
use tracing::info;

use crate::{
    error::{NotFoundError, Result},
    game::GameSession,
    management::{CatalogCache, PersistentTokenStore},
    spotify::MusicServiceClient,
    types::UserId,
};

/// Request scoped identity of the caller.
pub trait Identity {
    fn user_id(&self) -> Option<UserId>;
}

impl Identity for UserId {
    fn user_id(&self) -> Option<UserId> {
        Some(self.clone())
    }
}

impl Identity for Option<UserId> {
    fn user_id(&self) -> Option<UserId> {
        self.clone()
    }
}

/// Process wide mapping of users to their game sessions.
///
/// Sessions share one [`CatalogCache`] and one streaming service client.
pub struct GameSessionRegistry {
    sessions: RwLock<HashMap<UserId, Arc<GameSession>>>,
    catalog: Arc<CatalogCache>,
    client: Arc<dyn MusicServiceClient>,
    call_timeout: Duration,
}

impl GameSessionRegistry {
    pub fn new(client: Arc<dyn MusicServiceClient>, call_timeout: Duration) -> Self {
        let catalog = Arc::new(CatalogCache::new(Arc::clone(&client), call_timeout));
        Self {
            sessions: RwLock::new(HashMap::new()),
            catalog,
            client,
            call_timeout,
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogCache> {
        &self.catalog
    }

    /// Registers a session for `user_id`. An existing session is returned
    /// unchanged and `store` is dropped.
    pub async fn create_game(
        &self,
        user_id: UserId,
        store: Arc<dyn PersistentTokenStore>,
    ) -> Arc<GameSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user_id.clone()).or_insert_with(|| {
            info!(user = %user_id, "registered game session");
            Arc::new(GameSession::new(
                user_id,
                Arc::clone(&self.catalog),
                Arc::clone(&self.client),
                store,
                self.call_timeout,
            ))
        });
        Arc::clone(session)
    }

    pub async fn get_game(&self, identity: &impl Identity) -> Result<Arc<GameSession>> {
        let user_id = identity.user_id().ok_or(NotFoundError::NoUser)?;
        self.sessions
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| NotFoundError::NoGameForUser(user_id.to_string()).into())
    }

    pub async fn remove_game(&self, user_id: &UserId) -> Option<Arc<GameSession>> {
        self.sessions.write().await.remove(user_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
