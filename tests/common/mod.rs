#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use radiosync::{
    config::{ScheduleSettings, SpotifySettings},
    error::{Error, Result},
    management::{PlaylistCache, TrackCache},
    reconcile::Reconciler,
    sources::SongSource,
    spotify::Catalog,
    storage::Database,
    types::{Artist, Credential, Playlist, SongQuery, Track},
};
use tempfile::TempDir;

pub const OWNER: &str = "owner";

pub async fn temp_database() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(dir.path().join("radiosync.db")).await.unwrap();
    (dir, db)
}

pub fn march_2024() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

pub fn settings(server_url: &str) -> SpotifySettings {
    SpotifySettings {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        api_url: server_url.to_string(),
        token_url: format!("{server_url}/api/token"),
        auth_url: format!("{server_url}/authorize"),
        redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
        scope: "playlist-modify-public".to_string(),
        authorization_mode: "RefreshToken".to_string(),
        refresh_token: None,
        authorization_code: None,
        user_id: OWNER.to_string(),
        market: "TR".to_string(),
    }
}

pub fn credential(access_token: &str, refresh_token: &str, issued_at: i64) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        token_type: "Bearer".to_string(),
        scope: "playlist-modify-public".to_string(),
        expires_in: 3600,
        issued_at,
    }
}

pub fn track(id: &str, popularity: u32) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {id}"),
        popularity,
        uri: format!("spotify:track:{id}"),
        artists: vec![Artist {
            id: format!("artist-{id}"),
            name: "Simple Minds".to_string(),
            uri: format!("spotify:artist:{id}"),
        }],
    }
}

pub fn playlist(id: &str, name: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        public: true,
        tracks_href: format!("https://api.spotify.com/v1/playlists/{id}/tracks"),
        tracks_total: 0,
    }
}

/// In-memory catalog counting every call.
#[derive(Default)]
pub struct FakeCatalog {
    pub matches: Mutex<HashMap<String, Track>>,
    pub playlists: Mutex<Vec<Playlist>>,
    pub added: Mutex<Vec<(String, String)>>,
    pub fail_listing: AtomicBool,
    pub fail_auth: AtomicBool,
    pub reject_adds: AtomicBool,
    pub search_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_match(self, query: &str, track: Track) -> Self {
        self.matches.lock().unwrap().insert(query.to_string(), track);
        self
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn adds(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.searches() + self.lists() + self.creates() + self.adds()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_track(&self, query: &SongQuery) -> Result<Option<Track>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth.load(Ordering::SeqCst) {
            return Err(Error::Auth("token endpoint answered 400".to_string()));
        }
        Ok(self.matches.lock().unwrap().get(query.as_str()).cloned())
    }

    async fn list_playlists(&self, _owner: &str) -> Result<Vec<Playlist>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Error::Catalog("list_playlists: request failed".to_string()));
        }
        Ok(self.playlists.lock().unwrap().clone())
    }

    async fn create_playlist(
        &self,
        name: &str,
        _public: bool,
        _owner: &str,
    ) -> Result<Option<Playlist>> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
        let created = playlist(&format!("created-{n}"), name);
        self.playlists.lock().unwrap().push(created.clone());
        Ok(Some(created))
    }

    async fn add_track(&self, playlist: &Playlist, track: &Track, _owner: &str) -> Result<bool> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_adds.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.added
            .lock()
            .unwrap()
            .push((playlist.id.clone(), track.uri.clone()));
        Ok(true)
    }
}

/// Source reporting a fixed song.
pub struct FakeSource {
    pub label: String,
    pub song: Option<SongQuery>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(label: &str, title: &str, artist: &str) -> Self {
        Self {
            label: label.to_string(),
            song: SongQuery::from_parts(title, artist),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn silent(label: &str) -> Self {
        Self {
            label: label.to_string(),
            song: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn boxed(self) -> Box<dyn SongSource> {
        Box::new(self)
    }
}

#[async_trait]
impl SongSource for FakeSource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch_current_song(&self) -> Option<SongQuery> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.song.clone()
    }
}

pub fn reconciler(
    db: &Database,
    catalog: Arc<dyn Catalog>,
    sources: Vec<Box<dyn SongSource>>,
) -> Reconciler {
    Reconciler::new(
        sources,
        Arc::clone(&catalog),
        PlaylistCache::new(db.playlists(), catalog, OWNER),
        TrackCache::new(db.tracks()),
        ScheduleSettings::default(),
        OWNER,
    )
}
