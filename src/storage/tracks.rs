use rusqlite::{OptionalExtension, Row, params};

use super::Database;
use crate::{
    error::Result,
    types::{Artist, Resolution, SongQuery, Track, TrackRecord},
};

/// Track table, unique on `(playlist_id, song)`.
#[derive(Debug, Clone)]
pub struct TrackStore {
    db: Database,
}

/// Row as stored; catalog columns are NULL for negative sentinels.
struct RawTrack {
    playlist_id: String,
    song: String,
    track_id: Option<String>,
    name: Option<String>,
    popularity: Option<u32>,
    uri: Option<String>,
    artists: Option<String>,
    recorded_at: i64,
}

const COLUMNS: &str =
    "playlist_id, song, track_id, name, popularity, uri, artists, recorded_at";

fn raw_from_row(row: &Row<'_>) -> rusqlite::Result<RawTrack> {
    Ok(RawTrack {
        playlist_id: row.get(0)?,
        song: row.get(1)?,
        track_id: row.get(2)?,
        name: row.get(3)?,
        popularity: row.get(4)?,
        uri: row.get(5)?,
        artists: row.get(6)?,
        recorded_at: row.get(7)?,
    })
}

impl RawTrack {
    fn into_record(self) -> Result<TrackRecord> {
        let resolution = match self.track_id {
            Some(id) => {
                let artists: Vec<Artist> = match self.artists.as_deref() {
                    Some(json) => serde_json::from_str(json)?,
                    None => Vec::new(),
                };
                Resolution::Found(Track {
                    id,
                    name: self.name.unwrap_or_default(),
                    popularity: self.popularity.unwrap_or_default(),
                    uri: self.uri.unwrap_or_default(),
                    artists,
                })
            }
            None => Resolution::NotFound,
        };
        Ok(TrackRecord {
            playlist_id: self.playlist_id,
            song: SongQuery::from_normalized(self.song),
            resolution,
            recorded_at: self.recorded_at,
        })
    }
}

impl TrackStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn exists(&self, playlist_id: &str, song: &SongQuery) -> Result<bool> {
        let (playlist_id, song) = (playlist_id.to_string(), song.as_str().to_string());
        self.db
            .with_connection(move |conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM tracks WHERE playlist_id = ?1 AND song = ?2)",
                    params![playlist_id, song],
                    |row| row.get(0),
                )
            })
            .await
    }

    pub async fn get(&self, playlist_id: &str, song: &SongQuery) -> Result<Option<TrackRecord>> {
        let (playlist_id, song) = (playlist_id.to_string(), song.as_str().to_string());
        let raw = self
            .db
            .with_connection(move |conn| {
                conn.query_row(
                    &format!("SELECT {COLUMNS} FROM tracks WHERE playlist_id = ?1 AND song = ?2"),
                    params![playlist_id, song],
                    raw_from_row,
                )
                .optional()
            })
            .await?;
        raw.map(RawTrack::into_record).transpose()
    }

    /// Upserts on the dedup key; a later match replaces a negative sentinel.
    pub async fn put(&self, record: &TrackRecord) -> Result<()> {
        let (track_id, name, popularity, uri, artists) = match &record.resolution {
            Resolution::Found(track) => (
                Some(track.id.clone()),
                Some(track.name.clone()),
                Some(track.popularity),
                Some(track.uri.clone()),
                Some(serde_json::to_string(&track.artists)?),
            ),
            Resolution::NotFound => (None, None, None, None, None),
        };
        let playlist_id = record.playlist_id.clone();
        let song = record.song.as_str().to_string();
        let recorded_at = record.recorded_at;

        self.db
            .with_connection(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO tracks ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                         ON CONFLICT(playlist_id, song) DO UPDATE SET
                            track_id = excluded.track_id,
                            name = excluded.name,
                            popularity = excluded.popularity,
                            uri = excluded.uri,
                            artists = excluded.artists,
                            recorded_at = excluded.recorded_at"
                    ),
                    params![playlist_id, song, track_id, name, popularity, uri, artists, recorded_at],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn for_playlist(&self, playlist_id: &str) -> Result<Vec<TrackRecord>> {
        let playlist_id = playlist_id.to_string();
        let raws = self
            .db
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM tracks WHERE playlist_id = ?1 ORDER BY recorded_at DESC"
                ))?;
                let rows = stmt.query_map(params![playlist_id], raw_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;
        raws.into_iter().map(RawTrack::into_record).collect()
    }
}
