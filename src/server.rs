use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tracing::info;

use crate::{
    Res,
    api::{self, CallbackContext},
    game::GameSessionRegistry,
    types::UserId,
};

/// Serves the OAuth callback and the health check on `address`.
///
/// Callbacks complete the authorization of `user_id`'s session.
pub async fn start_api_server(
    address: String,
    registry: Arc<GameSessionRegistry>,
    user_id: UserId,
) -> Res<()> {
    let context = CallbackContext { registry, user_id };
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(context)));

    let addr = SocketAddr::from_str(&address)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "callback server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
