//! "Now playing" song sources, one variant per radio station.
//!
//! Every station exposes a small JSON document describing the current song.
//! [`StationSource`] fetches it, lets the [`Station`] variant pick out the title
//! and artist, and normalizes them into a [`SongQuery`]. Any failure along the
//! way is reported and turns into "no song" for this pass; a source never fails
//! the caller.

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::{Endpoint, SourceSettings},
    types::SongQuery,
    warning,
};

mod stations;

pub use stations::NowPlaying;

/// Capability to report the song a station is currently playing.
#[async_trait]
pub trait SongSource: Send + Sync {
    /// Human-readable station name, used to derive playlist names.
    fn label(&self) -> &str;

    async fn fetch_current_song(&self) -> Option<SongQuery>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Station {
    Eksen,
    JoyFm,
    JoyTurkRock,
    RedFm,
    Veronica,
    VeronicaRock,
}

impl Station {
    pub const ALL: [Station; 6] = [
        Station::Eksen,
        Station::JoyFm,
        Station::JoyTurkRock,
        Station::RedFm,
        Station::Veronica,
        Station::VeronicaRock,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Station::Eksen => "Eksen",
            Station::JoyFm => "Joy",
            Station::JoyTurkRock => "Joy Turk Rock",
            Station::RedFm => "Red",
            Station::Veronica => "Veronica",
            Station::VeronicaRock => "Veronica Rock",
        }
    }

    /// Infix of the `SOURCE_<KEY>_*` configuration variables.
    pub fn env_key(&self) -> &'static str {
        match self {
            Station::Eksen => "EKSEN",
            Station::JoyFm => "JOY_FM",
            Station::JoyTurkRock => "JOY_TURK_ROCK",
            Station::RedFm => "RED_FM",
            Station::Veronica => "VERONICA",
            Station::VeronicaRock => "VERONICA_ROCK",
        }
    }
}

/// HTTP-backed source for one [`Station`].
pub struct StationSource {
    station: Station,
    endpoint: Endpoint,
    client: Client,
}

impl StationSource {
    pub fn new(station: Station, endpoint: Endpoint, client: Client) -> Self {
        Self {
            station,
            endpoint,
            client,
        }
    }
}

#[async_trait]
impl SongSource for StationSource {
    fn label(&self) -> &str {
        self.station.label()
    }

    async fn fetch_current_song(&self) -> Option<SongQuery> {
        let mut request = self.client.get(self.endpoint.url());
        if let Some(key) = &self.endpoint.api_key {
            request = request.header("x-api-key", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warning!("{}: request failed: {}", self.label(), e);
                return None;
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warning!("{}: cannot read response: {}", self.label(), e);
                return None;
            }
        };

        if !status.is_success() {
            warning!("{}: Response: {} | {}", self.label(), status, body);
            return None;
        }

        match self.station.now_playing(&body) {
            Ok(now_playing) => {
                let query = now_playing.query();
                if query.is_none() {
                    warning!("{}: blank title and artist. Response: {}", self.label(), body);
                }
                query
            }
            Err(e) => {
                warning!("{}: {} Response: {}", self.label(), e, body);
                None
            }
        }
    }
}

/// Builds a source for every configured station.
pub fn configured_sources(settings: &SourceSettings, client: &Client) -> Vec<Box<dyn SongSource>> {
    settings
        .stations
        .iter()
        .map(|(station, endpoint)| {
            Box::new(StationSource::new(*station, endpoint.clone(), client.clone()))
                as Box<dyn SongSource>
        })
        .collect()
}
