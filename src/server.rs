use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::sync::Mutex;

use crate::{api, error::Result, info, types::PendingAuthorization};

/// Routes of the local authorization server.
pub fn router(state: Arc<Mutex<PendingAuthorization>>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

/// Serves the authorization callback on `addr` until the task is aborted.
pub async fn start_api_server(
    addr: SocketAddr,
    state: Arc<Mutex<PendingAuthorization>>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Waiting for the Spotify redirect on http://{}/callback", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
