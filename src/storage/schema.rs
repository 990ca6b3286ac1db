use rusqlite::Connection;

pub mod tables {
    pub const CREDENTIALS: &str = "credentials";
    pub const PLAYLISTS: &str = "playlists";
    pub const TRACKS: &str = "tracks";

    pub const ALL_TABLES: &[&str] = &[CREDENTIALS, PLAYLISTS, TRACKS];
}

/// Identity of the single credential row.
pub const CREDENTIAL_ID: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS credentials (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    token_type TEXT NOT NULL,
    scope TEXT NOT NULL,
    expires_in INTEGER NOT NULL,
    issued_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS playlists (
    name TEXT PRIMARY KEY,
    playlist_id TEXT NOT NULL,
    public INTEGER NOT NULL,
    tracks_href TEXT NOT NULL,
    tracks_total INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tracks (
    playlist_id TEXT NOT NULL,
    song TEXT NOT NULL,
    track_id TEXT,
    name TEXT,
    popularity INTEGER,
    uri TEXT,
    artists TEXT,
    recorded_at INTEGER NOT NULL,
    PRIMARY KEY (playlist_id, song)
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
