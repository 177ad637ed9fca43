use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{
    error::Result,
    game::GameSessionRegistry,
    types::UserId,
    warning,
};

/// Whose session the callback completes.
#[derive(Clone)]
pub struct CallbackContext {
    pub registry: Arc<GameSessionRegistry>,
    pub user_id: UserId,
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(context): Extension<CallbackContext>,
) -> Html<&'static str> {
    let state = params.get("state").map(String::as_str).unwrap_or_default();
    let code = params.get("code").map(String::as_str).unwrap_or_default();

    match complete_authorization(&context, state, code).await {
        Ok(()) => Html("<h2>Authentication successful.</h2><p>Close browser window.</p>"),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}

async fn complete_authorization(context: &CallbackContext, state: &str, code: &str) -> Result<()> {
    let session = context.registry.get_game(&context.user_id).await?;
    session.exchange_token(state, code).await?;
    session.persist_token().await
}
