use chrono::Utc;
use reqwest::Client;

use crate::{
    config::{AuthorizationMode, SpotifySettings},
    critical,
    error::{Error, Result},
    info,
    spotify::auth,
    storage::CredentialStore,
    types::Credential,
    warning,
};

/// Seconds before expiry at which a token is no longer handed out.
pub const SAFETY_MARGIN_SECS: i64 = 10;

/// Where the stored credential stands for a token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Valid(Credential),
    NeedsRefresh { refresh_token: String },
    NeedsBootstrap,
}

/// Keeps the Spotify access token valid across calls and restarts.
///
/// The credential lives in the [`CredentialStore`]; the manager itself holds
/// no token state, so every request reads the current record first.
pub struct TokenManager {
    settings: SpotifySettings,
    mode: AuthorizationMode,
    store: CredentialStore,
    client: Client,
}

impl TokenManager {
    /// Fails with [`Error::Config`] when the authorization mode is unknown.
    pub fn new(settings: SpotifySettings, store: CredentialStore, client: Client) -> Result<Self> {
        let mode = settings.authorization_mode.parse()?;
        Ok(TokenManager {
            settings,
            mode,
            store,
            client,
        })
    }

    pub fn classify(&self, stored: Option<&Credential>, now: i64) -> TokenState {
        if let Some(credential) = stored.filter(|c| c.is_valid_at(now, SAFETY_MARGIN_SECS)) {
            return TokenState::Valid(credential.clone());
        }

        let known_refresh = stored
            .map(|c| c.refresh_token.clone())
            .filter(|token| !token.is_empty())
            .or_else(|| self.settings.refresh_token.clone());

        match known_refresh {
            Some(refresh_token) => TokenState::NeedsRefresh { refresh_token },
            None => TokenState::NeedsBootstrap,
        }
    }

    /// Returns `"<token_type> <access_token>"` for the `Authorization` header.
    ///
    /// A valid stored credential is returned without any network call. Otherwise
    /// the token is refreshed or bootstrapped and persisted first; any failure
    /// there is an [`Error::Auth`]. A rejected stored refresh token is retried
    /// once with `SPOTIFY_REFRESH_TOKEN` when that one differs.
    pub async fn access_token(&self) -> Result<String> {
        let stored = self.store.load().await?;
        let now = Utc::now().timestamp();

        let credential = match self.classify(stored.as_ref(), now) {
            TokenState::Valid(credential) => return Ok(credential.authorization()),
            TokenState::NeedsRefresh { refresh_token } => {
                match self.refresh(&refresh_token).await {
                    Ok(credential) => credential,
                    Err(e @ Error::Auth(_)) => match self
                        .settings
                        .refresh_token
                        .as_deref()
                        .filter(|configured| *configured != refresh_token)
                    {
                        Some(configured) => {
                            warning!(
                                "Stored refresh token was rejected, retrying with SPOTIFY_REFRESH_TOKEN: {}",
                                e
                            );
                            self.refresh(configured).await?
                        }
                        None => return Err(e),
                    },
                    Err(e) => return Err(e),
                }
            }
            TokenState::NeedsBootstrap => match self.mode {
                AuthorizationMode::InitialConfiguration => {
                    let code = self.settings.authorization_code.clone().ok_or_else(|| {
                        Error::Auth(
                            "SPOTIFY_AUTHORIZATION_CODE must be set in InitialConfiguration mode"
                                .to_string(),
                        )
                    })?;
                    self.bootstrap(&code).await?
                }
                AuthorizationMode::RefreshToken => {
                    return Err(Error::Auth(
                        "no refresh token stored or configured, run `radiosync auth` or set SPOTIFY_REFRESH_TOKEN"
                            .to_string(),
                    ));
                }
            },
        };

        Ok(credential.authorization())
    }

    /// Exchanges a one-time authorization code and stores the first credential.
    ///
    /// The refresh token has to end up in the configuration for later runs, so
    /// it is surfaced as a critical message.
    pub async fn bootstrap(&self, code: &str) -> Result<Credential> {
        let response = auth::exchange_code(&self.client, &self.settings, code).await?;
        let credential = Credential::from_response(response, "", Utc::now().timestamp());
        self.store.save(&credential).await?;

        if credential.refresh_token.is_empty() {
            warning!("Authorization code grant returned no refresh token");
        } else {
            critical!(
                "Write the following refresh token to SPOTIFY_REFRESH_TOKEN and switch SPOTIFY_AUTHORIZATION_MODE to RefreshToken: {}",
                credential.refresh_token
            );
        }
        Ok(credential)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential> {
        let response = auth::refresh_token(&self.client, &self.settings, refresh_token).await?;
        let credential = Credential::from_response(response, refresh_token, Utc::now().timestamp());
        self.store.save(&credential).await?;

        info!(
            "Spotify access token refreshed, valid for {} seconds",
            credential.expires_in
        );
        Ok(credential)
    }

    pub async fn current(&self) -> Result<Option<Credential>> {
        self.store.load().await
    }
}
