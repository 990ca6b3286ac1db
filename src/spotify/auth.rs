use std::{net::SocketAddr, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Url, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    config::SpotifySettings,
    error::{Error, Result},
    management::TokenManager,
    server::start_api_server,
    types::{Credential, PendingAuthorization, TokenResponse},
    utils, warning,
};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Exchanges a one-time authorization code (authorization-code grant).
pub async fn exchange_code(
    client: &Client,
    settings: &SpotifySettings,
    code: &str,
) -> Result<TokenResponse> {
    request_token(
        client,
        settings,
        "exchange_code",
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.redirect_uri.as_str()),
        ],
    )
    .await
}

/// Exchanges a refresh token for a new access token (refresh-token grant).
pub async fn refresh_token(
    client: &Client,
    settings: &SpotifySettings,
    refresh_token: &str,
) -> Result<TokenResponse> {
    request_token(
        client,
        settings,
        "refresh_token",
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ],
    )
    .await
}

/// Posts a form-encoded grant with client credentials in a Basic header.
///
/// Every failure is an [`Error::Auth`]: without a token nothing else can work.
async fn request_token(
    client: &Client,
    settings: &SpotifySettings,
    operation: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = client
        .post(&settings.token_url)
        .header(
            AUTHORIZATION,
            utils::basic_credentials(&settings.client_id, &settings.client_secret),
        )
        .form(form)
        .send()
        .await
        .map_err(|e| Error::Auth(format!("{operation} request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Auth(format!("{operation} cannot read response: {e}")))?;

    if !status.is_success() {
        return Err(Error::Auth(format!(
            "{operation} request failed. Response: {status} | {body}"
        )));
    }

    serde_json::from_str(&body).map_err(|e| {
        Error::Auth(format!(
            "{operation} failed deserializing response: {e}: {body}"
        ))
    })
}

/// Spotify authorize URL the operator opens to grant access.
pub fn authorize_url(settings: &SpotifySettings, state: &str) -> Result<Url> {
    Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("scope", settings.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorization url {}: {}", settings.auth_url, e)))
}

/// Interactive bootstrap: obtains an authorization code through the browser
/// and the local callback server, then runs the token manager's bootstrap grant.
///
/// 1. Generates a random `state` and starts the callback server on `server_addr`
/// 2. Opens the authorize URL (or prints it when no browser is available)
/// 3. Waits up to two minutes for `/callback` to deliver the code
/// 4. Exchanges and persists the credential; the refresh token is surfaced
pub async fn authorize(
    tokens: &TokenManager,
    settings: &SpotifySettings,
    server_addr: &str,
) -> Result<Credential> {
    let addr: SocketAddr = server_addr
        .parse()
        .map_err(|e| Error::Config(format!("invalid server address {server_addr}: {e}")))?;

    let state = utils::generate_state();
    let shared = Arc::new(Mutex::new(PendingAuthorization {
        state: state.clone(),
        code: None,
    }));

    let server_state = Arc::clone(&shared);
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(addr, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let url = authorize_url(settings, &state)?;
    if webbrowser::open(url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        );
    }

    let code = wait_for_code(shared).await;
    server.abort();

    let code = code.ok_or_else(|| {
        Error::Auth("authorization failed or timed out waiting for the callback".to_string())
    })?;
    tokens.bootstrap(&code).await
}

/// Polls the shared state once per second until the callback delivered a code.
async fn wait_for_code(shared: Arc<Mutex<PendingAuthorization>>) -> Option<String> {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for Spotify authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let start = std::time::Instant::now();
    while start.elapsed() < CALLBACK_TIMEOUT {
        if let Some(code) = shared.lock().await.code.clone() {
            pb.finish_and_clear();
            return Some(code);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    pb.finish_and_clear();
    None
}
