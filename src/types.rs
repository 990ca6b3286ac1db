use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// The single OAuth credential record kept for the Spotify account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub scope: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    /// Unix timestamp (seconds) at which the token endpoint issued the token.
    pub issued_at: i64,
}

impl Credential {
    /// Builds the stored record from a token endpoint response.
    ///
    /// Spotify usually omits `refresh_token` on refresh grants, in which case the
    /// previously known refresh token is carried over.
    pub fn from_response(response: TokenResponse, previous_refresh: &str, issued_at: i64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|token| !token.is_empty())
                .unwrap_or_else(|| previous_refresh.to_string()),
            token_type: response.token_type,
            scope: response.scope,
            expires_in: response.expires_in,
            issued_at,
        }
    }

    pub fn is_valid_at(&self, now: i64, margin: i64) -> bool {
        !self.access_token.is_empty() && self.issued_at + self.expires_in - margin > now
    }

    /// Value for the `Authorization` header, e.g. `Bearer BQC...`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: i64,
}

/// Normalized `"<title>+<artist>"` search term and dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongQuery(String);

impl SongQuery {
    /// Normalizes a title/artist pair.
    ///
    /// Both fields are trimmed and every run of whitespace becomes a single `+`.
    /// The two parts are always joined with `+`, so an empty artist leaves a
    /// trailing separator. Returns `None` when both fields are blank.
    pub fn from_parts(title: &str, artist: &str) -> Option<Self> {
        let title = collapse(title);
        let artist = collapse(artist);
        if title.is_empty() && artist.is_empty() {
            return None;
        }
        Some(Self(format!("{title}+{artist}")))
    }

    /// Wraps an already normalized query, e.g. one read back from storage.
    pub fn from_normalized(query: impl Into<String>) -> Self {
        Self(query.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The query with separators turned back into spaces, as sent to the search endpoint.
    pub fn search_terms(&self) -> String {
        self.0.replace('+', " ").trim().to_string()
    }
}

fn collapse(field: &str) -> String {
    field.split_whitespace().collect::<Vec<_>>().join("+")
}

impl fmt::Display for SongQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub uri: String,
}

/// A catalog track as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

impl Track {
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub public: bool,
    pub tracks_href: String,
    pub tracks_total: u32,
}

/// Outcome of a catalog search for one dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(Track),
    /// Negative sentinel: the search ran and matched nothing.
    NotFound,
}

/// One resolution attempt, keyed by `(playlist_id, song)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub playlist_id: String,
    pub song: SongQuery,
    pub resolution: Resolution,
    pub recorded_at: i64,
}

impl TrackRecord {
    pub fn is_negative(&self) -> bool {
        matches!(self.resolution, Resolution::NotFound)
    }
}

/// State shared between the bootstrap flow and the local callback handler.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub state: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistPage {
    pub items: Vec<PlaylistObject>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracksRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksRef {
    pub href: String,
    pub total: u32,
}

impl From<PlaylistObject> for Playlist {
    fn from(object: PlaylistObject) -> Self {
        let (tracks_href, tracks_total) = object
            .tracks
            .map(|t| (t.href, t.total))
            .unwrap_or_default();
        Playlist {
            id: object.id,
            name: object.name,
            public: object.public.unwrap_or(false),
            tracks_href,
            tracks_total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub id: String,
    pub public: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub song: String,
    pub track: String,
    pub artists: String,
    pub popularity: String,
}

#[derive(Tabled)]
pub struct OutcomeTableRow {
    pub station: String,
    pub song: String,
    pub outcome: String,
}
