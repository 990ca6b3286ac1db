use serde::Deserialize;

use super::Station;
use crate::{
    error::{Error, Result},
    types::SongQuery,
};

/// Title and artist as published by a station, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
}

impl NowPlaying {
    pub fn query(&self) -> Option<SongQuery> {
        SongQuery::from_parts(&self.title, &self.artist)
    }
}

#[derive(Deserialize)]
struct EksenPayload {
    #[serde(rename = "NowPlayingArtist")]
    artist: String,
    #[serde(rename = "NowPlayingTrack")]
    track: String,
}

#[derive(Deserialize)]
struct JoyPayload {
    data: JoyData,
}

#[derive(Deserialize)]
struct JoyData {
    current_song: ArtistTitle,
}

#[derive(Deserialize)]
struct ArtistTitle {
    artist: String,
    title: String,
}

#[derive(Deserialize)]
struct RedFmPayload {
    feed: RedFmFeed,
}

#[derive(Deserialize)]
struct RedFmFeed {
    items: Vec<RedFmItem>,
}

/// Feed entry; for songs `title` carries the artist and `desc` the track.
#[derive(Deserialize)]
struct RedFmItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    desc: Option<String>,
}

#[derive(Deserialize)]
struct VeronicaPayload {
    data: VeronicaData,
}

#[derive(Deserialize)]
struct VeronicaData {
    #[serde(rename = "getStations")]
    stations: Vec<VeronicaStationList>,
}

#[derive(Deserialize)]
struct VeronicaStationList {
    items: Vec<VeronicaStation>,
}

#[derive(Deserialize)]
struct VeronicaStation {
    slug: String,
    #[serde(default)]
    playouts: Vec<VeronicaPlayout>,
}

#[derive(Deserialize)]
struct VeronicaPlayout {
    track: VeronicaTrack,
}

#[derive(Deserialize)]
struct VeronicaTrack {
    #[serde(rename = "artistName")]
    artist_name: String,
    title: String,
}

#[derive(Deserialize)]
struct VeronicaRockPayload {
    playouts: Vec<VeronicaRockPlayout>,
}

#[derive(Deserialize)]
struct VeronicaRockPlayout {
    track: ArtistTitle,
}

const VERONICA_SLUG: &str = "radio-veronica";

fn missing(what: &str) -> Error {
    Error::Source(format!("missing {what}"))
}

impl Station {
    /// Extracts the current song from the station's response body.
    pub fn now_playing(&self, body: &str) -> Result<NowPlaying> {
        match self {
            Station::Eksen => {
                let payload: EksenPayload = serde_json::from_str(body)?;
                Ok(NowPlaying {
                    title: payload.track,
                    artist: payload.artist,
                })
            }
            Station::JoyFm | Station::JoyTurkRock => {
                let payload: JoyPayload = serde_json::from_str(body)?;
                let song = payload.data.current_song;
                Ok(NowPlaying {
                    title: song.title,
                    artist: song.artist,
                })
            }
            Station::RedFm => {
                let payload: RedFmPayload = serde_json::from_str(body)?;
                let item = payload
                    .feed
                    .items
                    .into_iter()
                    .find(|item| item.kind == "song")
                    .ok_or_else(|| missing("song item in feed"))?;
                Ok(NowPlaying {
                    title: item.desc.ok_or_else(|| missing("song desc"))?,
                    artist: item.title.ok_or_else(|| missing("song title"))?,
                })
            }
            Station::Veronica => {
                let payload: VeronicaPayload = serde_json::from_str(body)?;
                let track = payload
                    .data
                    .stations
                    .into_iter()
                    .next()
                    .ok_or_else(|| missing("station list"))?
                    .items
                    .into_iter()
                    .find(|station| station.slug == VERONICA_SLUG)
                    .ok_or_else(|| missing(VERONICA_SLUG))?
                    .playouts
                    .into_iter()
                    .next()
                    .ok_or_else(|| missing("playout"))?
                    .track;
                Ok(NowPlaying {
                    title: track.title,
                    artist: track.artist_name,
                })
            }
            Station::VeronicaRock => {
                let payload: VeronicaRockPayload = serde_json::from_str(body)?;
                let track = payload
                    .playouts
                    .into_iter()
                    .next()
                    .ok_or_else(|| missing("playout"))?
                    .track;
                Ok(NowPlaying {
                    title: track.title,
                    artist: track.artist,
                })
            }
        }
    }
}
