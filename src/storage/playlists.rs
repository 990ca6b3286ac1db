use rusqlite::{OptionalExtension, Row, params};

use super::Database;
use crate::{error::Result, types::Playlist};

/// Name-indexed playlist table.
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    db: Database,
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        name: row.get(0)?,
        id: row.get(1)?,
        public: row.get(2)?,
        tracks_href: row.get(3)?,
        tracks_total: row.get(4)?,
    })
}

impl PlaylistStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get(&self, name: &str) -> Result<Option<Playlist>> {
        let name = name.to_string();
        self.db
            .with_connection(move |conn| {
                conn.query_row(
                    "SELECT name, playlist_id, public, tracks_href, tracks_total
                     FROM playlists WHERE name = ?1",
                    params![name],
                    from_row,
                )
                .optional()
            })
            .await
    }

    pub async fn put(&self, playlist: &Playlist) -> Result<()> {
        let p = playlist.clone();
        self.db
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO playlists (name, playlist_id, public, tracks_href, tracks_total)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(name) DO UPDATE SET
                        playlist_id = excluded.playlist_id,
                        public = excluded.public,
                        tracks_href = excluded.tracks_href,
                        tracks_total = excluded.tracks_total",
                    params![p.name, p.id, p.public, p.tracks_href, p.tracks_total],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn all(&self) -> Result<Vec<Playlist>> {
        self.db
            .with_connection(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name, playlist_id, public, tracks_href, tracks_total
                     FROM playlists ORDER BY name",
                )?;
                let rows = stmt.query_map([], from_row)?;
                rows.collect()
            })
            .await
    }
}
