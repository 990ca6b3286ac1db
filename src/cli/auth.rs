use super::context::Context;
use crate::{config, error, spotify, success};

/// Obtains the first credential through the browser and the local callback server.
pub async fn auth() {
    let ctx = match Context::load().await {
        Ok(ctx) => ctx,
        Err(e) => error!("Cannot load configuration. Err: {}", e),
    };

    match spotify::auth::authorize(&ctx.tokens, &ctx.settings, &config::server_addr()).await {
        Ok(credential) => success!(
            "Authorization stored, access token valid for {} seconds",
            credential.expires_in
        ),
        Err(e) => error!("Authorization failed. Err: {}", e),
    }
}
