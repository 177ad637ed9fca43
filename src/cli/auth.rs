use std::sync::Arc;

use crate::{cli::AppContext, error, spotify};

pub async fn auth(ctx: &AppContext) {
    if let Err(e) = spotify::auth::auth(
        &ctx.config,
        Arc::clone(&ctx.registry),
        Arc::clone(&ctx.session),
    )
    .await
    {
        error!("{}", e);
    }
}
