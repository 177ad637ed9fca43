use std::{sync::Arc, time::Duration};

use reqwest::Url;

use crate::{
    Res,
    config::Config,
    error::ClientError,
    game::{GameSession, GameSessionRegistry},
    server::start_api_server,
    success, warning,
};

const CALLBACK_WAIT: Duration = Duration::from_secs(60);

/// Builds the Spotify authorization URL for the PKCE flow.
///
/// `state` is echoed back by Spotify on the callback and `code_challenge` is
/// the S256 challenge of the verifier later sent with the code exchange.
pub fn authorize_url(
    config: &Config,
    state: &str,
    code_challenge: &str,
) -> Result<String, ClientError> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("state", state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", config.scope.as_str()),
        ],
    )
    .map_err(|e| ClientError::Transport(format!("invalid authorization url: {e}")))?;

    Ok(url.into())
}

/// Runs the interactive OAuth 2.0 PKCE flow for `session`.
///
/// 1. Starts the local callback server
/// 2. Opens the authorization URL in the default browser
/// 3. Waits for the callback to exchange the code and store the token
///
/// Fails when the server cannot be started or no token arrives within a
/// minute.
pub async fn auth(
    config: &Config,
    registry: Arc<GameSessionRegistry>,
    session: Arc<GameSession>,
) -> Res<()> {
    let mut server = tokio::spawn(start_api_server(
        config.server_address.clone(),
        registry,
        session.user_id().clone(),
    ));

    let auth_url = session.authorize_url(config).await?;
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    tokio::select! {
        served = &mut server => match served {
            Ok(Ok(())) => Err("callback server stopped before authentication finished".into()),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(e.into()),
        },
        received = wait_for_token(&session) => {
            server.abort();
            if received {
                success!("Authentication successful!");
                Ok(())
            } else {
                Err("Authentication failed or timed out.".into())
            }
        }
    }
}

/// Polls the session once per second until it holds a token.
async fn wait_for_token(session: &GameSession) -> bool {
    let start = tokio::time::Instant::now();

    while start.elapsed() < CALLBACK_WAIT {
        if session.has_token().await {
            return true;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    false
}
