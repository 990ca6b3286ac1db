//! Embedded SQLite persistence for credentials, playlists and tracks.
//!
//! Every operation opens the database file, runs on tokio's blocking pool and
//! closes the connection again. No connection or transaction outlives a single
//! call, so an external writer only ever competes with us on one record.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::Result;

mod credentials;
mod playlists;
pub mod schema;
mod tracks;

pub use credentials::CredentialStore;
pub use playlists::PlaylistStore;
pub use tracks::TrackStore;

/// Handle on the database file. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Prepares the database at `path`, creating parent directories and the schema.
    pub async fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let db = Self { path: path.into() };
        if let Some(parent) = db.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await?;
        }
        db.with_connection(|_| Ok(())).await?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` against a freshly opened connection on the blocking pool.
    pub(crate) async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        let value = tokio::task::spawn_blocking(move || {
            let conn = open(&path)?;
            f(&conn)
        })
        .await??;
        Ok(value)
    }

    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(self.clone())
    }

    pub fn playlists(&self) -> PlaylistStore {
        PlaylistStore::new(self.clone())
    }

    pub fn tracks(&self) -> TrackStore {
        TrackStore::new(self.clone())
    }
}

fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    schema::init(&conn)?;
    Ok(conn)
}
