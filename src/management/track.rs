use chrono::Utc;

use crate::{
    error::Result,
    storage::TrackStore,
    types::{Playlist, Resolution, SongQuery, Track, TrackRecord},
};

/// Dedup cache of resolution attempts, keyed by `(playlist, song query)`.
pub struct TrackCache {
    store: TrackStore,
}

impl TrackCache {
    pub fn new(store: TrackStore) -> Self {
        Self { store }
    }

    /// True for positive records and negative sentinels alike.
    pub async fn exists(&self, playlist: &Playlist, song: &SongQuery) -> Result<bool> {
        self.store.exists(&playlist.id, song).await
    }

    pub async fn get(&self, playlist: &Playlist, song: &SongQuery) -> Result<Option<TrackRecord>> {
        self.store.get(&playlist.id, song).await
    }

    pub async fn put(&self, record: &TrackRecord) -> Result<()> {
        self.store.put(record).await
    }

    pub async fn record_found(
        &self,
        playlist: &Playlist,
        song: &SongQuery,
        track: Track,
    ) -> Result<TrackRecord> {
        self.record(playlist, song, Resolution::Found(track)).await
    }

    /// Persists the negative sentinel so the query is not searched again.
    pub async fn record_not_found(&self, playlist: &Playlist, song: &SongQuery) -> Result<TrackRecord> {
        self.record(playlist, song, Resolution::NotFound).await
    }

    async fn record(
        &self,
        playlist: &Playlist,
        song: &SongQuery,
        resolution: Resolution,
    ) -> Result<TrackRecord> {
        let record = TrackRecord {
            playlist_id: playlist.id.clone(),
            song: song.clone(),
            resolution,
            recorded_at: Utc::now().timestamp(),
        };
        self.put(&record).await?;
        Ok(record)
    }

    pub async fn for_playlist(&self, playlist: &Playlist) -> Result<Vec<TrackRecord>> {
        self.store.for_playlist(&playlist.id).await
    }
}
