//! # Spotify Integration Module
//!
//! Authorized access to the Spotify Web API and the accounts token endpoint.
//!
//! ```text
//! Reconciliation loop / caches
//!          ↓
//!     Catalog (trait)
//!          ↓
//!     SpotifyClient ── TokenManager (bearer token per call)
//!          ↓
//!     reqwest ── Spotify Web API
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - token endpoint grants and the interactive bootstrap flow
//! - [`search`] - market-scoped track search with popularity selection
//! - [`playlist`] - playlist listing, creation and track insertion
//!
//! ## Error Handling
//!
//! Catalog calls are allowed to fail: failures are reported and surface as
//! "nothing found" (`None`/`false`), except for playlist listing, which returns
//! [`Error::Catalog`] so callers can tell an empty account from a failed call.
//! A failure to obtain a token is never absorbed here; it propagates as
//! [`Error::Auth`].
//!
//! Every request is retried when Spotify answers `502 Bad Gateway` (after ten
//! seconds) or `429 Too Many Requests` (after `Retry-After`, up to two
//! minutes), at most three attempts in total.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{AUTHORIZATION, RETRY_AFTER},
};
use tokio::time::sleep;

use crate::{
    config::SpotifySettings,
    error::{Error, Result},
    management::TokenManager,
    types::{Playlist, SongQuery, Track},
    warning,
};

pub mod auth;
pub mod playlist;
pub mod search;

pub use search::most_popular;

const MAX_ATTEMPTS: u32 = 3;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Remote music catalog operations the reconciliation engine relies on.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Most popular track matching `query`, or `None` when nothing matched
    /// or the search failed.
    async fn search_track(&self, query: &SongQuery) -> Result<Option<Track>>;

    /// All playlists of `owner`. A failed call is [`Error::Catalog`].
    async fn list_playlists(&self, owner: &str) -> Result<Vec<Playlist>>;

    /// Playlist of `owner` whose name is exactly `name`.
    async fn find_playlist(&self, name: &str, owner: &str) -> Result<Option<Playlist>> {
        Ok(self
            .list_playlists(owner)
            .await?
            .into_iter()
            .find(|playlist| playlist.name == name))
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        owner: &str,
    ) -> Result<Option<Playlist>>;

    /// Inserts `track` at the top of `playlist`; `true` once Spotify confirmed it.
    async fn add_track(&self, playlist: &Playlist, track: &Track, owner: &str) -> Result<bool>;
}

/// [`Catalog`] backed by the Spotify Web API.
pub struct SpotifyClient {
    client: Client,
    api_url: String,
    market: String,
    tokens: Arc<TokenManager>,
}

impl SpotifyClient {
    pub fn new(client: Client, settings: &SpotifySettings, tokens: Arc<TokenManager>) -> Self {
        Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            market: settings.market.clone(),
            tokens,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Sends an authorized request and returns the body of a 2xx response.
    ///
    /// Transport errors and non-2xx answers are reported and yield `Ok(None)`;
    /// only token failures are errors. Only requests with `retry` set go
    /// through [`send_with_retry`]; writes are sent once.
    async fn fetch<F>(&self, operation: &str, retry: bool, build: F) -> Result<Option<String>>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let token = self.tokens.access_token().await?;
        let request = || build(&self.client).header(AUTHORIZATION, token.as_str());
        let sent = if retry {
            send_with_retry(request).await
        } else {
            request().send().await
        };
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                warning!("{}: request failed: {}", operation, e);
                return Ok(None);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warning!("{}: cannot read response: {}", operation, e);
                return Ok(None);
            }
        };

        if !status.is_success() {
            warning!("{} Response: {} | {}", operation, status, body);
            return Ok(None);
        }
        Ok(Some(body))
    }
}

/// Sends the request built by `build`, retrying on 502 and 429 answers.
pub async fn send_with_retry<F>(build: F) -> reqwest::Result<Response>
where
    F: Fn() -> RequestBuilder + Send + Sync,
{
    let mut attempt = 1;
    loop {
        let response = build().send().await?;
        let status = response.status();

        if attempt < MAX_ATTEMPTS {
            if status == StatusCode::BAD_GATEWAY {
                sleep(BAD_GATEWAY_DELAY).await;
                attempt += 1;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse::<u64>().ok())
                    .unwrap_or(1);
                if retry_after <= MAX_RETRY_AFTER_SECS {
                    sleep(Duration::from_secs(retry_after)).await;
                    attempt += 1;
                    continue;
                }
                warning!(
                    "Retry after has reached an abnormal high of {} seconds, giving up on this call.",
                    retry_after
                );
            }
        }

        return Ok(response);
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_track(&self, query: &SongQuery) -> Result<Option<Track>> {
        self.search(query).await
    }

    async fn list_playlists(&self, owner: &str) -> Result<Vec<Playlist>> {
        self.user_playlists(owner).await
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
        owner: &str,
    ) -> Result<Option<Playlist>> {
        self.create(name, public, owner).await
    }

    async fn add_track(&self, playlist: &Playlist, track: &Track, owner: &str) -> Result<bool> {
        self.insert_track(playlist, track, owner).await
    }
}

pub(crate) fn catalog_error(operation: &str, detail: impl std::fmt::Display) -> Error {
    Error::Catalog(format!("{operation}: {detail}"))
}
