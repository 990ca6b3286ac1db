//! Configuration management for radiosync.
//!
//! Configuration values come from environment variables. At startup they are
//! loaded from a `.env` file in the local data directory, so the worker can run
//! unattended without a shell profile:
//!
//! - Linux: `~/.local/share/radiosync/.env`
//! - macOS: `~/Library/Application Support/radiosync/.env`
//! - Windows: `%LOCALAPPDATA%/radiosync/.env`
//!
//! Variables already present in the process environment take priority over the
//! file. Each component receives a typed settings struct instead of reading the
//! environment itself.

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::{
    error::{Error, Result},
    sources::Station,
};

const APP_DIR: &str = "radiosync";

/// Loads environment variables from `radiosync/.env` in the local data directory.
///
/// Creates the directory when missing. A missing `.env` file is not an error:
/// the values may just as well be provided by the service manager.
pub async fn load_env() -> Result<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Platform-specific directory holding the `.env` file and the database.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{name} must be set"))),
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn or_default(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T> {
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{name} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}

/// How the token manager obtains a credential when none is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationMode {
    /// First run: exchange a one-time authorization code.
    InitialConfiguration,
    /// Regular operation: exchange a refresh token.
    RefreshToken,
}

impl FromStr for AuthorizationMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "InitialConfiguration" => Ok(AuthorizationMode::InitialConfiguration),
            "RefreshToken" => Ok(AuthorizationMode::RefreshToken),
            other => Err(Error::Config(format!(
                "invalid authorization mode '{other}', expected InitialConfiguration or RefreshToken"
            ))),
        }
    }
}

/// Everything needed to talk to the Spotify accounts and Web API servers.
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    /// Web API base, e.g. `https://api.spotify.com/v1`.
    pub api_url: String,
    /// Token endpoint, e.g. `https://accounts.spotify.com/api/token`.
    pub token_url: String,
    /// Authorization endpoint used by `radiosync auth`.
    pub auth_url: String,
    pub redirect_uri: String,
    pub scope: String,
    /// Raw mode value; validated when the token manager is built.
    pub authorization_mode: String,
    pub refresh_token: Option<String>,
    pub authorization_code: Option<String>,
    /// Spotify user that owns the monthly playlists.
    pub user_id: String,
    pub market: String,
}

impl SpotifySettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            api_url: or_default("SPOTIFY_API_URL", "https://api.spotify.com/v1"),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", "https://accounts.spotify.com/api/token"),
            auth_url: or_default("SPOTIFY_API_AUTH_URL", "https://accounts.spotify.com/authorize"),
            redirect_uri: or_default("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
            scope: or_default(
                "SPOTIFY_API_AUTH_SCOPE",
                "playlist-read-private playlist-modify-public playlist-modify-private",
            ),
            authorization_mode: or_default("SPOTIFY_AUTHORIZATION_MODE", "RefreshToken"),
            refresh_token: optional("SPOTIFY_REFRESH_TOKEN"),
            authorization_code: optional("SPOTIFY_AUTHORIZATION_CODE"),
            user_id: required("SPOTIFY_USER_ID")?,
            market: or_default("SPOTIFY_MARKET", "TR"),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database: PathBuf,
}

impl StorageSettings {
    pub fn from_env() -> Result<Self> {
        let database = optional("RADIOSYNC_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir().join("radiosync.db"));
        Ok(Self { database })
    }
}

/// Sleep policy between reconciliation passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub short_sleep: Duration,
    pub long_sleep: Duration,
    /// UTC hour after which stations are assumed to be in overnight rotation.
    pub quiet_after_hour: u32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            short_sleep: Duration::from_secs(240),
            long_sleep: Duration::from_secs(8 * 60 * 60),
            quiet_after_hour: 22,
        }
    }
}

impl ScheduleSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let quiet_after_hour = parsed("RADIOSYNC_QUIET_AFTER_HOUR", defaults.quiet_after_hour)?;
        if quiet_after_hour > 23 {
            return Err(Error::Config(format!(
                "RADIOSYNC_QUIET_AFTER_HOUR must be between 0 and 23, got {quiet_after_hour}"
            )));
        }
        Ok(Self {
            short_sleep: Duration::from_secs(parsed(
                "RADIOSYNC_SHORT_SLEEP_SECS",
                defaults.short_sleep.as_secs(),
            )?),
            long_sleep: Duration::from_secs(parsed(
                "RADIOSYNC_LONG_SLEEP_SECS",
                defaults.long_sleep.as_secs(),
            )?),
            quiet_after_hour,
        })
    }
}

/// Where a station publishes its now-playing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub request_path: String,
    /// Sent as `x-api-key` when present.
    pub api_key: Option<String>,
}

impl Endpoint {
    pub fn url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            if self.request_path.is_empty() || self.request_path.starts_with('/') {
                self.request_path.clone()
            } else {
                format!("/{}", self.request_path)
            }
        )
    }
}

/// Reads `SOURCE_<KEY>_BASE_URL`, `SOURCE_<KEY>_REQUEST_PATH` and
/// `SOURCE_<KEY>_API_KEY`. Stations without a base URL are not configured.
pub fn station_endpoint(station: Station) -> Option<Endpoint> {
    let key = station.env_key();
    let base_url = optional(&format!("SOURCE_{key}_BASE_URL"))?;
    Some(Endpoint {
        base_url,
        request_path: or_default(&format!("SOURCE_{key}_REQUEST_PATH"), ""),
        api_key: optional(&format!("SOURCE_{key}_API_KEY")),
    })
}

/// Stations with an endpoint configured, in polling order.
#[derive(Debug, Clone, Default)]
pub struct SourceSettings {
    pub stations: Vec<(Station, Endpoint)>,
}

impl SourceSettings {
    pub fn from_env() -> Result<Self> {
        let stations = Station::ALL
            .iter()
            .filter_map(|&station| station_endpoint(station).map(|endpoint| (station, endpoint)))
            .collect();
        Ok(Self { stations })
    }
}

/// Address the local callback server binds to during `radiosync auth`.
pub fn server_addr() -> String {
    or_default("SERVER_ADDRESS", "127.0.0.1:8888")
}
