//! # Reconciliation Loop
//!
//! One pass ("tick") walks every configured song source in order:
//!
//! ```text
//! source ── fetch_current_song ──> SongQuery
//!                                     ↓
//!          monthly playlist name ──> PlaylistCache::resolve
//!                                     ↓
//!                   TrackCache::exists (positive or negative record)
//!                                     ↓
//!          Catalog::search_track ──> NotFound sentinel | add_track ──> Found record
//! ```
//!
//! Transient failures are absorbed below this layer and show up as an
//! [`Outcome`]. Anything that still reaches the loop as an error (token,
//! configuration or storage problems) aborts the tick for the remaining sources
//! and is handed back to the caller.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ScheduleSettings,
    error::Result,
    info,
    management::{PlaylistCache, TrackCache},
    sources::SongSource,
    spotify::Catalog,
    success,
    types::{SongQuery, Track},
    utils, warning,
};

/// What happened to one source during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The source had nothing usable to report.
    NoSong,
    /// The monthly playlist could not be found or created this time.
    NoPlaylist,
    /// A positive or negative record already exists for the song.
    AlreadyRecorded,
    /// The catalog had no match; a negative sentinel was stored.
    NotFound,
    Added(Track),
    /// The catalog matched but the insertion failed; retried next tick.
    NotAdded(Track),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoSong => f.write_str("no song"),
            Outcome::NoPlaylist => f.write_str("playlist unavailable"),
            Outcome::AlreadyRecorded => f.write_str("already recorded"),
            Outcome::NotFound => f.write_str("not found"),
            Outcome::Added(track) => write!(f, "added {} ({})", track.name, track.artist_names()),
            Outcome::NotAdded(track) => write!(f, "add failed for {}", track.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub label: String,
    pub song: Option<SongQuery>,
    pub outcome: Outcome,
}

pub struct Reconciler {
    sources: Vec<Box<dyn SongSource>>,
    catalog: Arc<dyn Catalog>,
    playlists: PlaylistCache,
    tracks: TrackCache,
    schedule: ScheduleSettings,
    owner: String,
}

impl Reconciler {
    pub fn new(
        sources: Vec<Box<dyn SongSource>>,
        catalog: Arc<dyn Catalog>,
        playlists: PlaylistCache,
        tracks: TrackCache,
        schedule: ScheduleSettings,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            sources,
            catalog,
            playlists,
            tracks,
            schedule,
            owner: owner.into(),
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Runs one pass over all sources, sequentially and fail-fast.
    ///
    /// `now` selects the monthly playlist.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<Vec<SourceOutcome>> {
        let mut outcomes = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let label = source.label().to_string();
            let Some(song) = source.fetch_current_song().await else {
                outcomes.push(SourceOutcome {
                    label,
                    song: None,
                    outcome: Outcome::NoSong,
                });
                continue;
            };

            let outcome = self.reconcile_song(&label, &song, now).await?;
            outcomes.push(SourceOutcome {
                label,
                song: Some(song),
                outcome,
            });
        }

        Ok(outcomes)
    }

    async fn reconcile_song(
        &self,
        label: &str,
        song: &SongQuery,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let name = utils::monthly_playlist_name(label, now);
        let Some(playlist) = self.playlists.resolve(&name).await? else {
            warning!("{}: playlist {} is not available, skipping {}", label, name, song);
            return Ok(Outcome::NoPlaylist);
        };

        if self.tracks.exists(&playlist, song).await? {
            return Ok(Outcome::AlreadyRecorded);
        }

        let Some(track) = self.catalog.search_track(song).await? else {
            self.tracks.record_not_found(&playlist, song).await?;
            info!("{}: no catalog match for {}, will not search again", label, song);
            return Ok(Outcome::NotFound);
        };

        if !self.catalog.add_track(&playlist, &track, &self.owner).await? {
            warning!("{}: could not add {} to {}", label, track.name, playlist.name);
            return Ok(Outcome::NotAdded(track));
        }

        self.tracks
            .record_found(&playlist, song, track.clone())
            .await?;
        success!(
            "{}: added {} by {} to {}",
            label,
            track.name,
            track.artist_names(),
            playlist.name
        );
        Ok(Outcome::Added(track))
    }

    /// Ticks until `cancel` fires, sleeping per the schedule between passes.
    ///
    /// Cancellation is observed between ticks and during the sleep. An error
    /// from a tick is logged and returned.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        info!(
            "Reconciling {} sources for {}",
            self.sources.len(),
            self.owner
        );

        while !cancel.is_cancelled() {
            let outcomes = match self.tick(Utc::now()).await {
                Ok(outcomes) => outcomes,
                Err(e) => {
                    warning!("Reconciliation pass aborted: {}", e);
                    return Err(e);
                }
            };

            let added = outcomes
                .iter()
                .filter(|o| matches!(o.outcome, Outcome::Added(_)))
                .count();
            let pause = utils::next_sleep(Utc::now(), &self.schedule);
            info!(
                "Pass finished, {} track(s) added, next pass in {}",
                added,
                utils::human_duration(pause)
            );

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(pause) => {}
            }
        }

        info!("Reconciliation stopped");
        Ok(())
    }
}
