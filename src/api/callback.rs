use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{types::PendingAuthorization, warning};

/// Receives Spotify's redirect and hands the authorization code to the waiting flow.
///
/// The code is only accepted when `state` matches the value the flow generated.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<PendingAuthorization>>>,
) -> Html<&'static str> {
    if let Some(reason) = params.get("error") {
        warning!("Spotify denied the authorization: {}", reason);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut pending = shared_state.lock().await;
    if params.get("state") != Some(&pending.state) {
        warning!("Ignoring authorization callback with an unexpected state");
        return Html("<h4>State mismatch.</h4>");
    }

    pending.code = Some(code.clone());
    Html("<h2>Authorization received.</h2><p>You can close this browser window.</p>")
}
