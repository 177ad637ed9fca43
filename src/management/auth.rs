use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::{AuthError, Result, ValidationError, bounded},
    management::PersistentTokenStore,
    spotify::{self, MusicServiceClient},
    types::{AccessToken, UserId},
    utils,
};

/// Owns a user's streaming service token and keeps it usable.
///
/// The OAuth `state` and the PKCE verifier of the authorization request are
/// generated once per manager; [`exchange_token`](Self::exchange_token) only
/// accepts callbacks carrying that state.
pub struct TokenLifecycleManager {
    user_id: UserId,
    token: AccessToken,
    state: String,
    code_verifier: String,
    client: Arc<dyn MusicServiceClient>,
    store: Arc<dyn PersistentTokenStore>,
    call_timeout: Duration,
}

impl TokenLifecycleManager {
    pub fn new(
        user_id: UserId,
        client: Arc<dyn MusicServiceClient>,
        store: Arc<dyn PersistentTokenStore>,
        call_timeout: Duration,
    ) -> Self {
        TokenLifecycleManager {
            user_id,
            token: AccessToken::empty(),
            state: utils::generate_state(),
            code_verifier: utils::generate_code_verifier(),
            client,
            store,
            call_timeout,
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn code_challenge(&self) -> String {
        utils::generate_code_challenge(&self.code_verifier)
    }

    /// Authorization URL carrying this manager's state and PKCE challenge.
    pub fn authorize_url(&self, config: &Config) -> Result<String> {
        Ok(spotify::auth::authorize_url(
            config,
            &self.state,
            &self.code_challenge(),
        )?)
    }

    pub fn current(&self) -> &AccessToken {
        &self.token
    }

    pub fn has_token(&self) -> bool {
        !self.token.access_token.is_empty()
    }

    /// Returns an access value that has not expired.
    ///
    /// The stored token is loaded first when nothing usable is in memory; an
    /// expired token is refreshed once and the new access value is written
    /// back to the store.
    pub async fn ensure_access_token(&mut self) -> Result<String> {
        if self.token.refresh_token.is_empty() {
            if let Some(stored) = bounded(self.call_timeout, self.store.get(&self.user_id)).await? {
                debug!(user = %self.user_id, "loaded stored token");
                self.token = stored;
            }
        }

        if self.token.is_expired() {
            if self.token.refresh_token.is_empty() {
                return Err(AuthError::NoRefreshToken.into());
            }

            let response = bounded(
                self.call_timeout,
                self.client.refresh_access_token(&self.token.refresh_token),
            )
            .await?;
            let refreshed =
                AccessToken::from_response(response, &self.token.refresh_token, Utc::now())?;

            // the store is written before the new token replaces the old one
            bounded(
                self.call_timeout,
                self.store
                    .update(&self.user_id, &refreshed.access_token, refreshed.expires_at),
            )
            .await?;
            self.token = refreshed;
            info!(user = %self.user_id, expires_at = %self.token.expires_at, "refreshed access token");
        }

        Ok(self.token.access_token.clone())
    }

    /// Trades the authorization code of an OAuth callback for a token.
    ///
    /// The token is only kept in memory; see [`persist`](Self::persist).
    pub async fn exchange_token(&mut self, state: &str, code: &str) -> Result<()> {
        if state != self.state {
            return Err(AuthError::StateMismatch.into());
        }
        if code.is_empty() {
            return Err(ValidationError::MissingCode.into());
        }

        let response = bounded(
            self.call_timeout,
            self.client
                .exchange_authorization_code(code, &self.code_verifier),
        )
        .await?;
        self.token = AccessToken::from_response(response, "", Utc::now())?;
        info!(user = %self.user_id, "exchanged authorization code");
        Ok(())
    }

    /// Writes the in-memory token to the store.
    pub async fn persist(&self) -> Result<()> {
        bounded(self.call_timeout, self.store.create(&self.user_id, &self.token)).await
    }
}
